//! Product Reviews Index Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{PathParam, QueryParam},
    prelude::*,
};
use uuid::Uuid;

use storefront_app::domain::orders::data::PageRequest;

use crate::{
    extensions::*,
    reviews::{errors::into_status_error, responses::ReviewPageResponse},
    state::State,
};

const DEFAULT_PER_PAGE: u32 = 10;

/// Product Reviews Index Handler
///
/// Pages through the approved reviews of a product, newest first.
#[endpoint(
    tags("reviews"),
    summary = "List Product Reviews",
    responses(
        (status_code = StatusCode::OK, description = "A page of approved reviews"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    page: QueryParam<u32, false>,
    per_page: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<ReviewPageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let page = PageRequest::new(
        page.into_inner().unwrap_or(1),
        per_page.into_inner().unwrap_or(DEFAULT_PER_PAGE),
    );

    let reviews = state
        .app
        .reviews
        .list_product_reviews(product.into_inner().into(), page)
        .await
        .map_err(into_status_error)?;

    Ok(Json(reviews.into()))
}
