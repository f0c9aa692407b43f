//! Carts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use storefront::{coupons::CouponRejection, pricing::PricingError};
use thiserror::Error;

use crate::{database::is_unavailable, domain::products::records::ProductUuid};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("cart not found")]
    NotFound,

    #[error("quantity must be at least one")]
    InvalidQuantity,

    #[error("product {0} is not available")]
    ProductUnavailable(ProductUuid),

    #[error("only {available} of product {product} in stock, {requested} requested")]
    OutOfStock {
        product: ProductUuid,
        requested: u32,
        available: u32,
    },

    #[error("a cart cannot be merged into itself")]
    InvalidMerge,

    #[error("invalid coupon")]
    InvalidCoupon(#[source] CouponRejection),

    #[error("could not price cart")]
    Pricing(#[from] PricingError),

    #[error("datastore unavailable")]
    Unavailable(#[source] Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if is_unavailable(&error) {
            return Self::Unavailable(error);
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound,
            Some(ErrorKind::CheckViolation) => Self::InvalidQuantity,
            _ => Self::Sql(error),
        }
    }
}
