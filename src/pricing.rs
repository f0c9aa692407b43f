//! Pricing
//!
//! Order totals: subtotal, discount, shipping and tax.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::{MoneyError, line_total, percent_of_minor};

/// Sales tax, in whole percent, applied to the discounted subtotal plus shipping.
pub const TAX_RATE_PERCENT: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Errors that can occur while pricing an order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A total did not fit in minor units.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Shipping options offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Standard Shipping, 3-5 days.
    Standard,

    /// Express Shipping, 1-2 days.
    Express,
}

impl ShippingMethod {
    /// Flat shipping rate in minor units.
    #[must_use]
    pub const fn rate(self) -> u64 {
        match self {
            Self::Standard => 5_99,
            Self::Express => 12_99,
        }
    }

    /// Customer facing name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Standard => "Standard Shipping",
            Self::Express => "Express Shipping",
        }
    }

    /// Delivery estimate in days.
    #[must_use]
    pub const fn delivery_days(self) -> &'static str {
        match self {
            Self::Standard => "3-5",
            Self::Express => "1-2",
        }
    }

    /// Storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown shipping method.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown shipping method: {0}")]
pub struct UnknownShippingMethod(pub String);

impl FromStr for ShippingMethod {
    type Err = UnknownShippingMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            other => Err(UnknownShippingMethod(other.to_string())),
        }
    }
}

/// A cart line priced at the current product price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    /// Unit price in minor units.
    pub unit_price: u64,

    /// Number of units.
    pub quantity: u32,
}

/// Sum the line totals of a cart.
///
/// # Errors
///
/// Returns [`PricingError::Money`] on overflow.
pub fn subtotal(lines: &[PricedLine]) -> Result<u64, PricingError> {
    lines.iter().try_fold(0_u64, |acc, line| {
        let total = line_total(line.unit_price, line.quantity)?;

        acc.checked_add(total)
            .ok_or(PricingError::Money(MoneyError::Overflow("subtotal")))
    })
}

/// The computed totals of an order, all in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Sum of line totals at current prices.
    pub subtotal: u64,

    /// Coupon discount, applied to the subtotal before tax.
    pub discount: u64,

    /// Shipping charge.
    pub shipping: u64,

    /// Tax on the discounted subtotal plus shipping.
    pub tax: u64,

    /// Amount to charge.
    pub total: u64,
}

impl OrderTotals {
    /// Compute order totals.
    ///
    /// The discount is clamped at the subtotal, then
    /// `tax = (subtotal - discount + shipping) * TAX_RATE_PERCENT` and
    /// `total = subtotal - discount + shipping + tax`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Money`] on overflow.
    pub fn compute(
        subtotal: u64,
        discount: u64,
        shipping: ShippingMethod,
    ) -> Result<Self, PricingError> {
        let discount = discount.min(subtotal);
        let shipping = shipping.rate();

        let taxable = (subtotal - discount)
            .checked_add(shipping)
            .ok_or(MoneyError::Overflow("taxable amount"))?;

        let tax = percent_of_minor(TAX_RATE_PERCENT, taxable)?;

        let total = taxable
            .checked_add(tax)
            .ok_or(MoneyError::Overflow("order total"))?;

        Ok(Self {
            subtotal,
            discount,
            shipping,
            tax,
            total,
        })
    }
}
