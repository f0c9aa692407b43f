//! Get Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{errors::into_status_error, responses::CartResponse},
    extensions::*,
    state::State,
};

/// Get Cart Handler
///
/// Returns the caller's cart priced at current product prices.
#[endpoint(
    tags("carts"),
    summary = "Get Cart",
    responses(
        (status_code = StatusCode::OK, description = "Cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing caller identity"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.cart_identity_or_401()?;

    let cart = state
        .app
        .carts
        .resolve_cart(identity)
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        CartResponse::try_from(cart).or_500("failed to price cart")?,
    ))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::domain::{
        carts::{CartsServiceError, MockCartsService},
        identity::{CartIdentity, SessionToken},
        products::records::ProductUuid,
    };

    use crate::{
        identity::{SESSION_HEADER, USER_HEADER},
        test_helpers::{Mocks, TEST_SESSION, TEST_USER, make_cart, service},
    };

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        service(
            Mocks {
                carts,
                ..Mocks::default()
            },
            Router::with_path("cart").get(handler),
        )
    }

    #[tokio::test]
    async fn test_get_user_cart_returns_priced_lines() -> TestResult {
        let product = ProductUuid::new();
        let cart = make_cart(CartIdentity::User(TEST_USER), &[(product, 3, 2_50)]);
        let uuid = cart.uuid;

        let mut carts = MockCartsService::new();

        carts
            .expect_resolve_cart()
            .once()
            .withf(|identity| *identity == CartIdentity::User(TEST_USER))
            .return_once(move |_| Ok(cart));

        let mut res = TestClient::get("http://example.com/cart")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .send(&make_service(carts))
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.item_count, 3);
        assert_eq!(body.subtotal, 7_50);
        assert_eq!(body.items[0].line_total, 7_50);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_anonymous_cart_uses_session_token() -> TestResult {
        let identity = CartIdentity::Anonymous(SessionToken::new(TEST_SESSION));
        let cart = make_cart(identity.clone(), &[]);

        let mut carts = MockCartsService::new();

        carts
            .expect_resolve_cart()
            .once()
            .withf(move |requested| *requested == identity)
            .return_once(move |_| Ok(cart));

        let res = TestClient::get("http://example.com/cart")
            .add_header(SESSION_HEADER, TEST_SESSION, true)
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_without_identity_returns_401() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_resolve_cart().never();

        let res = TestClient::get("http://example.com/cart")
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_datastore_down_returns_503() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_resolve_cart()
            .once()
            .return_once(|_| Err(CartsServiceError::Unavailable(sqlx::Error::PoolTimedOut)));

        let res = TestClient::get("http://example.com/cart")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));

        Ok(())
    }
}
