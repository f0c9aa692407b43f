//! Apply Coupon Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    carts::{errors::into_status_error, responses::CouponResponse},
    extensions::*,
    state::State,
};

/// Apply Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyCouponRequest {
    pub code: String,
}

/// Apply Coupon Handler
///
/// Evaluates a coupon against the cart subtotal and attaches it to the cart.
#[endpoint(
    tags("carts"),
    summary = "Apply Coupon",
    responses(
        (status_code = StatusCode::OK, description = "Coupon applied"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Coupon rejected"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "carts.coupon.apply",
    skip(json, depot),
    fields(code = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<ApplyCouponRequest>,
    depot: &mut Depot,
) -> Result<Json<CouponResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.cart_identity_or_401()?;
    let code = json.into_inner().code.trim().to_string();

    tracing::Span::current().record("code", code.as_str());

    let cart = state
        .app
        .carts
        .resolve_cart(identity)
        .await
        .map_err(into_status_error)?;

    let application = state
        .app
        .carts
        .apply_coupon(cart.uuid, code)
        .await
        .map_err(into_status_error)?;

    Ok(Json(application.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront::coupons::CouponRejection;
    use storefront_app::domain::{
        carts::{CartsServiceError, MockCartsService, records::CouponApplication},
        identity::CartIdentity,
    };

    use crate::{
        identity::USER_HEADER,
        test_helpers::{Mocks, TEST_USER, make_cart, service},
    };

    use super::*;

    fn make_service(mut carts: MockCartsService) -> Service {
        let cart = make_cart(CartIdentity::User(TEST_USER), &[]);

        carts
            .expect_resolve_cart()
            .once()
            .return_once(move |_| Ok(cart));

        service(
            Mocks {
                carts,
                ..Mocks::default()
            },
            Router::with_path("cart/coupon").post(handler),
        )
    }

    #[tokio::test]
    async fn test_apply_coupon_returns_discount() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_apply_coupon()
            .once()
            .withf(|_, code| code == "FIFTY")
            .return_once(|_, code| {
                Ok(CouponApplication {
                    code,
                    subtotal: 10_00,
                    discount: 10_00,
                    payable: 0,
                })
            });

        let mut res = TestClient::post("http://example.com/cart/coupon")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .json(&json!({ "code": " FIFTY " }))
            .send(&make_service(carts))
            .await;

        let body: CouponResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.discount, 10_00);
        assert_eq!(body.payable, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_apply_rejected_coupon_returns_422() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_apply_coupon()
            .once()
            .return_once(|_, _| Err(CartsServiceError::InvalidCoupon(CouponRejection::Expired)));

        let res = TestClient::post("http://example.com/cart/coupon")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .json(&json!({ "code": "OLD" }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }
}
