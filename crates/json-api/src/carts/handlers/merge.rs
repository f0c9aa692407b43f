//! Merge Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use storefront_app::domain::identity::CartIdentity;

use crate::{
    carts::{errors::into_status_error, responses::MergeResponse},
    extensions::*,
    identity::RequestIdentity,
    state::State,
};

/// Merge Cart Handler
///
/// Moves the anonymous session cart into the signed in user's cart after login. Lines are
/// capped at remaining stock; lines with nothing left to add are reported as skipped. The
/// anonymous cart is deleted.
#[endpoint(
    tags("carts"),
    summary = "Merge Anonymous Cart",
    responses(
        (status_code = StatusCode::OK, description = "Carts merged"),
        (status_code = StatusCode::BAD_REQUEST, description = "Session token missing"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Sign in required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "carts.merge",
    skip(depot),
    fields(
        user_uuid = tracing::field::Empty,
        source_cart_uuid = tracing::field::Empty,
        target_cart_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<MergeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;

    let session = depot
        .obtain_or_500::<RequestIdentity>()?
        .session
        .clone()
        .ok_or_else(|| StatusError::bad_request().brief("x-session-token header required"))?;

    let source = state
        .app
        .carts
        .resolve_cart(CartIdentity::Anonymous(session))
        .await
        .map_err(into_status_error)?;

    let target = state
        .app
        .carts
        .resolve_cart(CartIdentity::User(caller.user))
        .await
        .map_err(into_status_error)?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(caller.user));
    span.record("source_cart_uuid", tracing::field::display(source.uuid));
    span.record("target_cart_uuid", tracing::field::display(target.uuid));

    let outcome = state
        .app
        .carts
        .merge_into(source.uuid, target.uuid)
        .await
        .map_err(into_status_error)?;

    tracing::info!(
        merged = outcome.merged.len(),
        skipped = outcome.skipped.len(),
        "merged anonymous cart"
    );

    Ok(Json(
        MergeResponse::try_from(outcome).or_500("failed to price merged cart")?,
    ))
}
