//! Review Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::reviews::ReviewsServiceError;

pub(crate) fn into_status_error(error: ReviewsServiceError) -> StatusError {
    match error {
        ReviewsServiceError::InvalidRating(_) => {
            StatusError::bad_request().brief("Rating must be between 1 and 5")
        }
        ReviewsServiceError::NotEligible(reason) => StatusError::forbidden().brief(reason.message()),
        ReviewsServiceError::AlreadyReviewed => {
            StatusError::conflict().brief("You have already reviewed this product")
        }
        ReviewsServiceError::ProductNotFound => StatusError::not_found().brief("Product not found"),
        ReviewsServiceError::NotFound => StatusError::not_found().brief("Review not found"),
        ReviewsServiceError::InvalidStatusChange { from, to } => StatusError::conflict()
            .brief(format!("Review cannot move from {from} to {to}")),
        ReviewsServiceError::PermissionDenied => {
            StatusError::forbidden().brief("Administrator access required")
        }
        ReviewsServiceError::Unavailable(source) => {
            error!("review datastore unavailable: {source}");

            StatusError::service_unavailable()
        }
        ReviewsServiceError::Sql(source) => {
            error!("review storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
