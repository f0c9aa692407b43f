//! Remove Coupon Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{carts::errors::into_status_error, extensions::*, state::State};

/// Remove Coupon Handler
#[endpoint(
    tags("carts"),
    summary = "Remove Coupon",
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Coupon removed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.cart_identity_or_401()?;

    let cart = state
        .app
        .carts
        .resolve_cart(identity)
        .await
        .map_err(into_status_error)?;

    state
        .app
        .carts
        .remove_coupon(cart.uuid)
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}
