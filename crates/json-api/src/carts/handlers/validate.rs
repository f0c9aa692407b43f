//! Validate Cart Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    carts::{errors::into_status_error, responses::StockViolationResponse},
    extensions::*,
    state::State,
};

/// Cart Validation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ValidationResponse {
    /// Whether every line can be fulfilled
    pub valid: bool,

    /// Lines that exceed live stock
    pub violations: Vec<StockViolationResponse>,
}

/// Validate Cart Handler
///
/// Checks every line of the caller's cart against live stock. Nothing is changed.
#[endpoint(
    tags("carts"),
    summary = "Validate Cart",
    responses(
        (status_code = StatusCode::OK, description = "Validation result"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<ValidationResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.cart_identity_or_401()?;

    let cart = state
        .app
        .carts
        .resolve_cart(identity)
        .await
        .map_err(into_status_error)?;

    let validation = state
        .app
        .carts
        .validate(cart.uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Json(ValidationResponse {
        valid: validation.valid,
        violations: validation.violations.into_iter().map(Into::into).collect(),
    }))
}
