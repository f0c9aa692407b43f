//! Coupon Records

use jiff::Timestamp;
use storefront::coupons::Coupon;

use crate::uuids::TypedUuid;

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// Coupon Record
#[derive(Debug, Clone)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub coupon: Coupon,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
