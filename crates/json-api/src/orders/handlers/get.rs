//! Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderResponse},
    state::State,
};

/// Get Order Handler
///
/// Visible to the customer who placed the order and to administrators.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    responses(
        (status_code = StatusCode::OK, description = "Order"),
        (status_code = StatusCode::FORBIDDEN, description = "Not your order"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;

    let order = state
        .app
        .orders
        .get_order(caller, order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront::orders::OrderStatus;
    use storefront_app::domain::orders::{MockOrdersService, OrdersServiceError};

    use crate::{
        identity::USER_HEADER,
        test_helpers::{Mocks, TEST_USER, make_order, service},
    };

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        service(
            Mocks {
                orders,
                ..Mocks::default()
            },
            Router::with_path("orders/{order}").get(handler),
        )
    }

    #[tokio::test]
    async fn test_get_order_returns_items() -> TestResult {
        let order = make_order(TEST_USER, OrderStatus::Processing);
        let uuid = order.uuid;

        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .withf(move |caller, o| caller.user == TEST_USER && *o == uuid)
            .return_once(move |_, _| Ok(order));

        let mut res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .send(&make_service(orders))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.items.len(), 1);
        assert_eq!(body.items[0].price, 10_00);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_someone_elses_order_returns_403() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::PermissionDenied));

        let res = TestClient::get(format!("http://example.com/orders/{}", Uuid::now_v7()))
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_order_returns_404() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/orders/{}", Uuid::now_v7()))
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
