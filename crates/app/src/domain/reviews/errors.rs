//! Reviews service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    database::is_unavailable,
    domain::reviews::records::{EligibilityReason, ReviewStatus},
};

#[derive(Debug, Error)]
pub enum ReviewsServiceError {
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("{0}")]
    NotEligible(EligibilityReason),

    #[error("review already exists")]
    AlreadyReviewed,

    #[error("product not found")]
    ProductNotFound,

    #[error("review not found")]
    NotFound,

    #[error("review cannot move from {from} to {to}")]
    InvalidStatusChange { from: ReviewStatus, to: ReviewStatus },

    #[error("permission denied")]
    PermissionDenied,

    #[error("datastore unavailable")]
    Unavailable(#[source] Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ReviewsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if is_unavailable(&error) {
            return Self::Unavailable(error);
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyReviewed,
            Some(ErrorKind::ForeignKeyViolation) => Self::ProductNotFound,
            _ => Self::Sql(error),
        }
    }
}
