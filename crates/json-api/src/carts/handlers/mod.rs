//! Cart Handlers
//!
//! Every cart route acts on the caller's own cart, created on first use.

pub(crate) mod add_item;
pub(crate) mod apply_coupon;
pub(crate) mod clear;
pub(crate) mod get;
pub(crate) mod merge;
pub(crate) mod remove_coupon;
pub(crate) mod remove_item;
pub(crate) mod set_item;
pub(crate) mod validate;
