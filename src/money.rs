//! Money

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso};
use thiserror::Error;

/// Errors raised by minor-unit arithmetic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// The calculation could not be represented in minor units.
    #[error("{0} calculation overflowed or went negative")]
    Overflow(&'static str),
}

/// Calculate `percent`% of an amount in minor units.
///
/// `percent` is expressed in whole percent (`20` means 20%). The result is rounded to the
/// nearest minor unit, with midpoints rounded away from zero.
///
/// # Errors
///
/// Returns [`MoneyError::Overflow`] when the result cannot be represented as a non-negative
/// `u64`, which includes negative percentages.
pub fn percent_of_minor(percent: Decimal, minor: u64) -> Result<u64, MoneyError> {
    let Some(applied) = Decimal::from(minor)
        .checked_mul(percent)
        .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
    else {
        return Err(MoneyError::Overflow("percentage"));
    };

    applied
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(MoneyError::Overflow("percentage"))
}

/// Multiply a unit price by a quantity.
///
/// # Errors
///
/// Returns [`MoneyError::Overflow`] when the product does not fit in a `u64`.
pub fn line_total(unit_price: u64, quantity: u32) -> Result<u64, MoneyError> {
    unit_price
        .checked_mul(u64::from(quantity))
        .ok_or(MoneyError::Overflow("line total"))
}

/// Format an amount in store currency minor units for humans, e.g. `$12.99`.
pub fn display_minor(minor: u64) -> String {
    let minor = i64::try_from(minor).unwrap_or(i64::MAX);

    Money::from_minor(minor, iso::USD).to_string()
}
