//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, responses::CartItemResponse},
    extensions::*,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddItemRequest {
    /// The product to add
    pub product_uuid: Uuid,

    /// Units to add on top of any already in the cart
    pub quantity: u32,
}

/// Add Cart Item Handler
///
/// Adds units of a product to the caller's cart, merging into an existing line.
#[endpoint(
    tags("carts"),
    summary = "Add Item to Cart",
    responses(
        (status_code = StatusCode::CREATED, description = "Cart line updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::CONFLICT, description = "Not enough stock"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Product not available"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "carts.items.add",
    skip(json, depot, res),
    fields(
        cart_uuid = tracing::field::Empty,
        product_uuid = tracing::field::Empty,
        quantity = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<AddItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartItemResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.cart_identity_or_401()?;
    let request = json.into_inner();

    let cart = state
        .app
        .carts
        .resolve_cart(identity)
        .await
        .map_err(into_status_error)?;

    let span = tracing::Span::current();

    span.record("cart_uuid", tracing::field::display(cart.uuid));
    span.record("product_uuid", tracing::field::display(request.product_uuid));
    span.record("quantity", request.quantity);

    let item = state
        .app
        .carts
        .add_item(cart.uuid, request.product_uuid.into(), request.quantity)
        .await
        .map_err(into_status_error)?;

    res.add_header(
        LOCATION,
        format!("/cart/items/{}", request.product_uuid),
        true,
    )
    .or_500("failed to set location header")?
    .status_code(StatusCode::CREATED);

    tracing::info!(quantity = item.quantity, "added item to cart");

    Ok(Json(
        CartItemResponse::try_from(item).or_500("failed to price cart line")?,
    ))
}
