//! Create Review Handler

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

use storefront_app::domain::reviews::data::NewReview;

use crate::{
    extensions::*,
    reviews::{errors::into_status_error, responses::ReviewResponse},
    state::State,
};

/// Create Review Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateReviewRequest {
    /// Whole stars, 1 to 5
    pub rating: u8,

    #[serde(default)]
    pub comment: Option<String>,
}

/// Create Review Handler
///
/// Submits a review for moderation.
#[endpoint(
    tags("reviews"),
    summary = "Create Review",
    responses(
        (status_code = StatusCode::CREATED, description = "Review submitted"),
        (status_code = StatusCode::BAD_REQUEST, description = "Rating out of range"),
        (status_code = StatusCode::FORBIDDEN, description = "Not eligible to review"),
        (status_code = StatusCode::CONFLICT, description = "Already reviewed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "reviews.create",
    skip(product, json, depot, res),
    fields(product_uuid = tracing::field::Empty, rating = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<CreateReviewRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ReviewResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;
    let product = product.into_inner();
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(product));
    span.record("rating", request.rating);

    let review = state
        .app
        .reviews
        .create_review(
            caller.user,
            product.into(),
            NewReview {
                rating: request.rating,
                comment: request.comment,
            },
        )
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(review.into()))
}
