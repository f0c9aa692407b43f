//! Storefront Domain Concerns

pub mod carts;
pub mod coupons;
pub mod identity;
pub mod orders;
pub mod products;
pub mod reviews;
