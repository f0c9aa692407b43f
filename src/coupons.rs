//! Coupons
//!
//! Stateless coupon evaluation against a cart subtotal.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::{MoneyError, percent_of_minor};

/// How a coupon reduces the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DiscountKind {
    /// Percentage of the subtotal, in whole percent (`20` is 20%).
    Percentage(Decimal),

    /// Flat amount in minor units.
    Fixed(u64),
}

impl DiscountKind {
    /// Storage name of the discount kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage(_) => "percentage",
            Self::Fixed(_) => "fixed",
        }
    }
}

/// A coupon as read from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    /// Unique redemption code.
    pub code: String,

    /// Discount applied when the coupon is valid.
    pub discount: DiscountKind,

    /// Minimum subtotal (minor units) required to use the coupon.
    pub minimum_spend: Option<u64>,

    /// Upper bound on the absolute discount (minor units).
    pub maximum_discount: Option<u64>,

    /// Number of redemptions allowed; `None` is unlimited.
    pub usage_limit: Option<u32>,

    /// Number of completed redemptions.
    pub used_count: u32,

    /// First instant the coupon is valid, inclusive.
    pub starts_at: Option<Timestamp>,

    /// Last instant the coupon is valid, inclusive.
    pub ends_at: Option<Timestamp>,

    /// Whether the coupon has been switched on.
    pub is_active: bool,
}

impl Coupon {
    /// Whether the coupon still has redemptions left.
    #[must_use]
    pub fn has_remaining_uses(&self) -> bool {
        self.usage_limit.is_none_or(|limit| self.used_count < limit)
    }
}

/// Reasons a coupon cannot be applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CouponRejection {
    /// No coupon matches the given code.
    #[error("coupon code is not recognised")]
    UnknownCode,

    /// The coupon has been switched off.
    #[error("coupon is not active")]
    Inactive,

    /// The validity window has not opened yet.
    #[error("coupon is not valid yet")]
    NotYetValid,

    /// The validity window has closed.
    #[error("coupon has expired")]
    Expired,

    /// Every allowed redemption has been used.
    #[error("coupon usage limit reached")]
    UsageLimitReached,

    /// The subtotal is under the coupon's minimum spend.
    #[error("subtotal {subtotal} is below the minimum spend of {minimum_spend}")]
    BelowMinimumSpend {
        /// Required subtotal.
        minimum_spend: u64,

        /// Subtotal that was offered.
        subtotal: u64,
    },

    /// The discount could not be calculated.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// The outcome of a successful evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    /// Amount taken off the subtotal.
    pub discount: u64,

    /// Subtotal after the discount; never negative.
    pub payable: u64,
}

/// Evaluate `coupon` against `subtotal` at the instant `now`.
///
/// Rules are applied in order: availability (active, inside the inclusive window, uses left),
/// minimum spend, discount calculation, the maximum discount cap, and finally a clamp at the
/// subtotal so the payable amount is never negative. Evaluation has no side effects.
///
/// # Errors
///
/// Returns the first [`CouponRejection`] that applies.
pub fn evaluate(
    coupon: &Coupon,
    subtotal: u64,
    now: Timestamp,
) -> Result<AppliedDiscount, CouponRejection> {
    if !coupon.is_active {
        return Err(CouponRejection::Inactive);
    }

    if coupon.starts_at.is_some_and(|starts_at| now < starts_at) {
        return Err(CouponRejection::NotYetValid);
    }

    if coupon.ends_at.is_some_and(|ends_at| now > ends_at) {
        return Err(CouponRejection::Expired);
    }

    if !coupon.has_remaining_uses() {
        return Err(CouponRejection::UsageLimitReached);
    }

    if let Some(minimum_spend) = coupon.minimum_spend
        && subtotal < minimum_spend
    {
        return Err(CouponRejection::BelowMinimumSpend {
            minimum_spend,
            subtotal,
        });
    }

    let discount = match coupon.discount {
        DiscountKind::Percentage(percent) => percent_of_minor(percent, subtotal)?,
        DiscountKind::Fixed(amount) => amount,
    };

    let discount = coupon
        .maximum_discount
        .map_or(discount, |cap| discount.min(cap))
        .min(subtotal);

    Ok(AppliedDiscount {
        discount,
        payable: subtotal - discount,
    })
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use super::*;

    fn coupon(discount: DiscountKind) -> Coupon {
        Coupon {
            code: "SAVE".to_string(),
            discount,
            minimum_spend: None,
            maximum_discount: None,
            usage_limit: None,
            used_count: 0,
            starts_at: None,
            ends_at: None,
            is_active: true,
        }
    }

    #[test]
    fn fixed_discount_never_makes_payable_negative() -> TestResult {
        let applied = evaluate(
            &coupon(DiscountKind::Fixed(50_00)),
            10_00,
            Timestamp::now(),
        )?;

        assert_eq!(applied.discount, 10_00);
        assert_eq!(applied.payable, 0);

        Ok(())
    }

    #[test]
    fn percentage_discount_is_capped_by_maximum_discount() -> TestResult {
        let mut twenty_percent = coupon(DiscountKind::Percentage(Decimal::from(20)));
        twenty_percent.maximum_discount = Some(20_00);

        let applied = evaluate(&twenty_percent, 200_00, Timestamp::now())?;

        assert_eq!(applied.discount, 20_00);
        assert_eq!(applied.payable, 180_00);

        Ok(())
    }

    #[test]
    fn percentage_discount_without_cap() -> TestResult {
        let applied = evaluate(
            &coupon(DiscountKind::Percentage(Decimal::from(20))),
            200_00,
            Timestamp::now(),
        )?;

        assert_eq!(applied.discount, 40_00);

        Ok(())
    }

    #[test]
    fn inactive_coupon_is_rejected() {
        let mut inactive = coupon(DiscountKind::Fixed(5_00));
        inactive.is_active = false;

        assert_eq!(
            evaluate(&inactive, 100_00, Timestamp::now()),
            Err(CouponRejection::Inactive)
        );
    }

    #[test]
    fn window_bounds_are_inclusive() -> TestResult {
        let now = Timestamp::now();

        let mut bounded = coupon(DiscountKind::Fixed(5_00));
        bounded.starts_at = Some(now);
        bounded.ends_at = Some(now);

        assert_eq!(evaluate(&bounded, 100_00, now)?.discount, 5_00);

        assert_eq!(
            evaluate(&bounded, 100_00, now.checked_sub(1.second())?),
            Err(CouponRejection::NotYetValid)
        );

        assert_eq!(
            evaluate(&bounded, 100_00, now.checked_add(1.second())?),
            Err(CouponRejection::Expired)
        );

        Ok(())
    }

    #[test]
    fn exhausted_coupon_is_rejected() {
        let mut exhausted = coupon(DiscountKind::Fixed(5_00));
        exhausted.usage_limit = Some(3);
        exhausted.used_count = 3;

        assert_eq!(
            evaluate(&exhausted, 100_00, Timestamp::now()),
            Err(CouponRejection::UsageLimitReached)
        );
    }

    #[test]
    fn negative_percentage_is_rejected_as_money_error() {
        let rejection = evaluate(
            &coupon(DiscountKind::Percentage(Decimal::from(-10))),
            100_00,
            Timestamp::now(),
        );

        let expected = CouponRejection::Money(MoneyError::Overflow("percentage"));

        assert_eq!(rejection, Err(expected.clone()));
        assert_eq!(expected.to_string(), "percentage calculation overflowed or went negative");
    }

    #[test]
    fn minimum_spend_is_enforced() {
        let mut minimum = coupon(DiscountKind::Fixed(5_00));
        minimum.minimum_spend = Some(50_00);

        assert_eq!(
            evaluate(&minimum, 49_99, Timestamp::now()),
            Err(CouponRejection::BelowMinimumSpend {
                minimum_spend: 50_00,
                subtotal: 49_99,
            })
        );
    }
}
