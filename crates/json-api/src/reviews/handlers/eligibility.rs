//! Review Eligibility Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    reviews::{errors::into_status_error, responses::EligibilityResponse},
    state::State,
};

/// Review Eligibility Handler
///
/// A customer may review a product once, after an order containing it has been delivered.
#[endpoint(
    tags("reviews"),
    summary = "Review Eligibility",
    responses(
        (status_code = StatusCode::OK, description = "Eligibility decision"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Sign in required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<EligibilityResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;

    let eligibility = state
        .app
        .reviews
        .can_review(caller.user, product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(eligibility.into()))
}
