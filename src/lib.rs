//! Storefront
//!
//! Pure storefront domain logic: coupon evaluation, order pricing and the order status machine.
//! Nothing in this crate performs I/O; persistence and collaborators live in `storefront-app`.

pub mod coupons;
pub mod money;
pub mod orders;
pub mod pricing;
