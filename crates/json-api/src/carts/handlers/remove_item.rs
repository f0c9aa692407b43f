//! Remove Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{carts::errors::into_status_error, extensions::*, state::State};

/// Remove Cart Item Handler
///
/// Removing a product that is not in the cart succeeds.
#[endpoint(
    tags("carts"),
    summary = "Remove Item from Cart",
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Cart line removed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "carts.items.remove",
    skip(product, depot),
    fields(product_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.cart_identity_or_401()?;
    let product = product.into_inner();

    tracing::Span::current().record("product_uuid", tracing::field::display(product));

    let cart = state
        .app
        .carts
        .resolve_cart(identity)
        .await
        .map_err(into_status_error)?;

    state
        .app
        .carts
        .remove_item(cart.uuid, product.into())
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;

    use storefront_app::domain::{
        carts::MockCartsService,
        identity::{CartIdentity, SessionToken},
        products::records::ProductUuid,
    };

    use crate::{
        identity::SESSION_HEADER,
        test_helpers::{Mocks, TEST_SESSION, make_cart, service},
    };

    use super::*;

    #[tokio::test]
    async fn test_remove_item_returns_204() -> TestResult {
        let product = ProductUuid::new();
        let cart = make_cart(
            CartIdentity::Anonymous(SessionToken::new(TEST_SESSION)),
            &[(product, 1, 1_00)],
        );
        let uuid = cart.uuid;

        let mut carts = MockCartsService::new();

        carts
            .expect_resolve_cart()
            .once()
            .return_once(move |_| Ok(cart));

        carts
            .expect_remove_item()
            .once()
            .withf(move |c, p| *c == uuid && *p == product)
            .return_once(|_, _| Ok(()));

        let res = TestClient::delete(format!("http://example.com/cart/items/{product}"))
            .add_header(SESSION_HEADER, TEST_SESSION, true)
            .send(&service(
                Mocks {
                    carts,
                    ..Mocks::default()
                },
                Router::with_path("cart/items/{product}").delete(handler),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }
}
