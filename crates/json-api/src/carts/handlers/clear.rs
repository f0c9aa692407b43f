//! Clear Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{carts::errors::into_status_error, extensions::*, state::State};

/// Clear Cart Handler
///
/// Removes every line from the caller's cart.
#[endpoint(
    tags("carts"),
    summary = "Clear Cart",
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Cart emptied"),
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
        .clear(cart.uuid)
        .await
        .map_err(into_status_error)?;

    tracing::info!(cart_uuid = %cart.uuid, "cleared cart");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;

    use storefront_app::domain::{
        carts::{CartsServiceError, MockCartsService},
        identity::CartIdentity,
    };

    use crate::{
        identity::USER_HEADER,
        test_helpers::{Mocks, TEST_USER, make_cart, service},
    };

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        service(
            Mocks {
                carts,
                ..Mocks::default()
            },
            Router::with_path("cart/items").delete(handler),
        )
    }

    #[tokio::test]
    async fn test_clear_returns_204() -> TestResult {
        let cart = make_cart(CartIdentity::User(TEST_USER), &[]);
        let uuid = cart.uuid;

        let mut carts = MockCartsService::new();

        carts
            .expect_resolve_cart()
            .once()
            .return_once(move |_| Ok(cart));

        carts
            .expect_clear()
            .once()
            .withf(move |c| *c == uuid)
            .return_once(|_| Ok(()));

        let res = TestClient::delete("http://example.com/cart/items")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }

    #[tokio::test]
    async fn test_clear_storage_error_returns_500() -> TestResult {
        let cart = make_cart(CartIdentity::User(TEST_USER), &[]);

        let mut carts = MockCartsService::new();

        carts
            .expect_resolve_cart()
            .once()
            .return_once(move |_| Ok(cart));

        carts
            .expect_clear()
            .once()
            .return_once(|_| Err(CartsServiceError::Sql(sqlx::Error::WorkerCrashed)));

        let res = TestClient::delete("http://example.com/cart/items")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }
}
