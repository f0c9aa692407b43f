//! Coupon Data

use jiff::Timestamp;
use storefront::coupons::DiscountKind;

use crate::domain::coupons::records::CouponUuid;

/// New Coupon Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub uuid: CouponUuid,
    pub code: String,
    pub discount: DiscountKind,
    pub minimum_spend: Option<u64>,
    pub maximum_discount: Option<u64>,
    pub usage_limit: Option<u32>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub is_active: bool,
}

impl NewCoupon {
    /// An active, unbounded coupon with no spend rules.
    #[must_use]
    pub fn new(code: impl Into<String>, discount: DiscountKind) -> Self {
        Self {
            uuid: CouponUuid::new(),
            code: code.into(),
            discount,
            minimum_spend: None,
            maximum_discount: None,
            usage_limit: None,
            starts_at: None,
            ends_at: None,
            is_active: true,
        }
    }
}
