//! Moderate Review Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::reviews::records::ReviewStatus;

use crate::{
    extensions::*,
    reviews::{errors::into_status_error, responses::ReviewResponse},
    state::State,
};

/// Moderate Review Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ModerateReviewRequest {
    /// `approved` or `rejected`
    pub status: String,
}

/// Moderate Review Handler
///
/// Approves or rejects a pending review. Administrators only.
#[endpoint(
    tags("reviews"),
    summary = "Moderate Review",
    responses(
        (status_code = StatusCode::OK, description = "Review moderated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
        (status_code = StatusCode::FORBIDDEN, description = "Administrator access required"),
        (status_code = StatusCode::NOT_FOUND, description = "Review not found"),
        (status_code = StatusCode::CONFLICT, description = "Review already moderated"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "reviews.status.update",
    skip(review, json, depot),
    fields(review_uuid = tracing::field::Empty, status = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    review: PathParam<Uuid>,
    json: JsonBody<ModerateReviewRequest>,
    depot: &mut Depot,
) -> Result<Json<ReviewResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;
    let review = review.into_inner();

    let status = json
        .into_inner()
        .status
        .parse::<ReviewStatus>()
        .or_400("Unknown review status")?;

    let span = tracing::Span::current();

    span.record("review_uuid", tracing::field::display(review));
    span.record("status", status.as_str());

    let updated = state
        .app
        .reviews
        .update_status(caller, review.into(), status)
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}
