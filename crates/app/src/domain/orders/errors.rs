//! Orders service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use storefront::{coupons::CouponRejection, orders::InvalidTransition, pricing::PricingError};
use thiserror::Error;

use crate::{
    database::is_unavailable,
    domain::{carts::records::StockViolation, products::records::ProductUuid},
    gateways::payments::PaymentError,
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("cart not found")]
    CartNotFound,

    #[error("cart is empty")]
    EmptyCart,

    #[error("cart has lines that cannot be fulfilled")]
    InvalidCart(Vec<StockViolation>),

    #[error("cart changed during checkout")]
    CartChanged,

    #[error("not enough stock of product {product} for {requested} units")]
    OutOfStock { product: ProductUuid, requested: u32 },

    #[error("invalid coupon")]
    InvalidCoupon(#[source] CouponRejection),

    #[error("payment failed")]
    PaymentFailed(#[source] PaymentError),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("permission denied")]
    PermissionDenied,

    #[error("could not price order")]
    Pricing(#[from] PricingError),

    #[error("invalid data")]
    InvalidData,

    #[error("datastore unavailable")]
    Unavailable(#[source] Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if is_unavailable(&error) {
            return Self::Unavailable(error);
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
