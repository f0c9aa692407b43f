//! Checkout Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use storefront::{orders::PaymentMethod, pricing::ShippingMethod};
use storefront_app::domain::{
    identity::CartIdentity,
    orders::{OrdersServiceError, data::CheckoutDetails},
};

use crate::{
    carts::errors::into_status_error as into_cart_status_error,
    extensions::*,
    orders::{
        errors::into_status_error,
        responses::{InvalidCartResponse, OrderResponse},
    },
    state::State,
};

/// Checkout Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutRequest {
    /// One of `stripe`, `paypal` or `razorpay`
    pub payment_method: String,

    /// One of `standard` or `express`
    pub shipping_method: String,

    pub shipping_address: String,

    /// Defaults to the shipping address
    #[serde(default)]
    pub billing_address: Option<String>,

    pub contact_email: String,

    #[serde(default)]
    pub notes: Option<String>,
}

impl TryFrom<CheckoutRequest> for CheckoutDetails {
    type Error = StatusError;

    fn try_from(request: CheckoutRequest) -> Result<Self, Self::Error> {
        let payment_method = request
            .payment_method
            .parse::<PaymentMethod>()
            .or_400("Unsupported payment method")?;

        let shipping_method = request
            .shipping_method
            .parse::<ShippingMethod>()
            .or_400("Unsupported shipping method")?;

        if request.shipping_address.trim().is_empty() || request.contact_email.trim().is_empty() {
            return Err(
                StatusError::bad_request().brief("Shipping address and contact email are required")
            );
        }

        let billing_address = request
            .billing_address
            .filter(|address| !address.trim().is_empty())
            .unwrap_or_else(|| request.shipping_address.clone());

        Ok(Self {
            payment_method,
            shipping_method,
            shipping_address: request.shipping_address,
            billing_address,
            contact_email: request.contact_email,
            notes: request.notes,
        })
    }
}

/// Checkout Handler
///
/// Converts the signed in user's cart into a paid order. The cart is emptied on success and
/// left untouched on any failure. Lines that exceed live stock are listed in the `409` body.
#[endpoint(
    tags("orders"),
    summary = "Checkout",
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Sign in required"),
        (status_code = StatusCode::PAYMENT_REQUIRED, description = "Payment failed"),
        (status_code = StatusCode::CONFLICT, description = "Cart cannot be fulfilled", body = InvalidCartResponse),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Empty cart or invalid coupon"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.checkout",
    skip(json, depot, res),
    fields(
        user_uuid = tracing::field::Empty,
        cart_uuid = tracing::field::Empty,
        order_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CheckoutRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;
    let details = CheckoutDetails::try_from(json.into_inner())?;

    let cart = state
        .app
        .carts
        .resolve_cart(CartIdentity::User(caller.user))
        .await
        .map_err(into_cart_status_error)?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(caller.user));
    span.record("cart_uuid", tracing::field::display(cart.uuid));

    let order = match state.app.orders.checkout(caller, cart.uuid, details).await {
        Ok(order) => order,
        Err(OrdersServiceError::InvalidCart(violations)) => {
            tracing::info!(violations = violations.len(), "cart exceeds available stock");

            res.render(Json(InvalidCartResponse::from(violations)));

            return Ok(StatusCode::CONFLICT);
        }
        Err(error) => return Err(into_status_error(error)),
    };

    span.record("order_uuid", tracing::field::display(order.uuid));

    res.add_header(LOCATION, format!("/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?;

    res.render(Json(OrderResponse::from(order)));

    Ok(StatusCode::CREATED)
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront::orders::OrderStatus;
    use storefront_app::{
        domain::{
            carts::{MockCartsService, records::StockViolation},
            orders::MockOrdersService,
            products::records::ProductUuid,
        },
        gateways::payments::PaymentError,
    };

    use crate::{
        identity::{SESSION_HEADER, USER_HEADER},
        test_helpers::{Mocks, TEST_SESSION, TEST_USER, make_cart, make_order, service},
    };

    use super::*;

    fn make_service(carts: MockCartsService, orders: MockOrdersService) -> Service {
        service(
            Mocks {
                carts,
                orders,
                ..Mocks::default()
            },
            Router::with_path("orders").post(handler),
        )
    }

    fn user_cart() -> MockCartsService {
        let cart = make_cart(CartIdentity::User(TEST_USER), &[]);

        let mut carts = MockCartsService::new();

        carts
            .expect_resolve_cart()
            .once()
            .withf(|identity| *identity == CartIdentity::User(TEST_USER))
            .return_once(move |_| Ok(cart));

        carts
    }

    fn body() -> serde_json::Value {
        json!({
            "payment_method": "stripe",
            "shipping_method": "express",
            "shipping_address": "1 Test Street",
            "contact_email": "customer@example.com",
        })
    }

    #[tokio::test]
    async fn test_checkout_returns_201_with_location() -> TestResult {
        let order = make_order(TEST_USER, OrderStatus::Pending);
        let uuid = order.uuid;

        let mut orders = MockOrdersService::new();

        orders
            .expect_checkout()
            .once()
            .withf(|caller, _, details| {
                caller.user == TEST_USER
                    && details.payment_method == PaymentMethod::Stripe
                    && details.shipping_method == ShippingMethod::Express
                    && details.billing_address == "1 Test Street"
            })
            .return_once(move |_, _, _| Ok(order));

        let mut res = TestClient::post("http://example.com/orders")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .json(&body())
            .send(&make_service(user_cart(), orders))
            .await;

        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/orders/{uuid}")));
        assert_eq!(body.total_amount, 28_07);
        assert_eq!(body.total_display, "$28.07");
        assert_eq!(body.status, "pending");

        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_rejects_unknown_payment_method() -> TestResult {
        let mut carts = MockCartsService::new();
        carts.expect_resolve_cart().never();

        let mut orders = MockOrdersService::new();
        orders.expect_checkout().never();

        let mut request = body();
        request["payment_method"] = json!("cash");

        let res = TestClient::post("http://example.com/orders")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .json(&request)
            .send(&make_service(carts, orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_anonymous_checkout_returns_401() -> TestResult {
        let mut carts = MockCartsService::new();
        carts.expect_resolve_cart().never();

        let mut orders = MockOrdersService::new();
        orders.expect_checkout().never();

        let res = TestClient::post("http://example.com/orders")
            .add_header(SESSION_HEADER, TEST_SESSION, true)
            .json(&body())
            .send(&make_service(carts, orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_declined_payment_returns_402() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_checkout().once().return_once(|_, _, _| {
            Err(OrdersServiceError::PaymentFailed(PaymentError::Declined(
                "card declined".to_string(),
            )))
        });

        let res = TestClient::post("http://example.com/orders")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .json(&body())
            .send(&make_service(user_cart(), orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::PAYMENT_REQUIRED));

        Ok(())
    }

    #[tokio::test]
    async fn test_cart_over_stock_returns_409_with_invalid_items() -> TestResult {
        let product = ProductUuid::new();

        let mut orders = MockOrdersService::new();

        orders.expect_checkout().once().return_once(move |_, _, _| {
            Err(OrdersServiceError::InvalidCart(vec![StockViolation {
                product_uuid: product,
                requested: 3,
                available: 1,
            }]))
        });

        let mut res = TestClient::post("http://example.com/orders")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .json(&body())
            .send(&make_service(user_cart(), orders))
            .await;

        let body: InvalidCartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
        assert_eq!(body.invalid_items.len(), 1);
        assert_eq!(body.invalid_items[0].product_uuid, product.into_uuid());
        assert_eq!(body.invalid_items[0].requested, 3);
        assert_eq!(body.invalid_items[0].available, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_cart_returns_422() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_checkout()
            .once()
            .return_once(|_, _, _| Err(OrdersServiceError::EmptyCart));

        let res = TestClient::post("http://example.com/orders")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .json(&body())
            .send(&make_service(user_cart(), orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }
}
