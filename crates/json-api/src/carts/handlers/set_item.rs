//! Set Cart Item Quantity Handler

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

use crate::{
    carts::{errors::into_status_error, responses::CartItemResponse},
    extensions::*,
    state::State,
};

/// Set Quantity Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SetQuantityRequest {
    /// New quantity; zero removes the line
    pub quantity: u32,
}

/// Set Cart Item Quantity Handler
///
/// Overwrites the quantity of a line. A quantity of zero removes it and responds with no
/// content.
#[endpoint(
    tags("carts"),
    summary = "Set Cart Item Quantity",
    responses(
        (status_code = StatusCode::OK, description = "Cart line updated"),
        (status_code = StatusCode::NO_CONTENT, description = "Cart line removed"),
        (status_code = StatusCode::CONFLICT, description = "Not enough stock"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "carts.items.set",
    skip(product, json, depot, res),
    fields(product_uuid = tracing::field::Empty, quantity = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<SetQuantityRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.cart_identity_or_401()?;
    let product = product.into_inner();
    let quantity = json.into_inner().quantity;

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(product));
    span.record("quantity", quantity);

    let cart = state
        .app
        .carts
        .resolve_cart(identity)
        .await
        .map_err(into_status_error)?;

    let item = state
        .app
        .carts
        .set_quantity(cart.uuid, product.into(), quantity)
        .await
        .map_err(into_status_error)?;

    let Some(item) = item else {
        tracing::info!("removed item from cart");

        return Ok(StatusCode::NO_CONTENT);
    };

    res.render(Json(
        CartItemResponse::try_from(item).or_500("failed to price cart line")?,
    ));

    Ok(StatusCode::OK)
}
