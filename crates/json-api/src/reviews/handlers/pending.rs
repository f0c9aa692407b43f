//! Pending Reviews Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use storefront_app::domain::orders::data::PageRequest;

use crate::{
    extensions::*,
    reviews::{errors::into_status_error, responses::ReviewPageResponse},
    state::State,
};

const DEFAULT_PER_PAGE: u32 = 20;

/// Pending Reviews Handler
///
/// The moderation queue, newest first. Administrators only.
#[endpoint(
    tags("reviews"),
    summary = "List Pending Reviews",
    responses(
        (status_code = StatusCode::OK, description = "A page of reviews awaiting moderation"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing identity"),
        (status_code = StatusCode::FORBIDDEN, description = "Administrator access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    page: QueryParam<u32, false>,
    per_page: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<ReviewPageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;

    let page = PageRequest::new(
        page.into_inner().unwrap_or(1),
        per_page.into_inner().unwrap_or(DEFAULT_PER_PAGE),
    );

    let reviews = state
        .app
        .reviews
        .list_pending_reviews(caller, page)
        .await
        .map_err(into_status_error)?;

    Ok(Json(reviews.into()))
}
