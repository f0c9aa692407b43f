//! Storefront persistence and services: products and stock, carts, coupons, the order
//! pipeline and review eligibility, backed by `PostgreSQL`.

pub mod context;
pub mod database;
pub mod domain;
pub mod gateways;


mod uuids;

pub use uuids::TypedUuid;
