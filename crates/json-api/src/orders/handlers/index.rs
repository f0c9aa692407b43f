//! Order Index Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use storefront::orders::OrderStatus;
use storefront_app::domain::orders::data::PageRequest;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderPageResponse},
    state::State,
};

const DEFAULT_PER_PAGE: u32 = 10;

/// Order Index Handler
///
/// Pages through orders, newest first. Administrators only.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    responses(
        (status_code = StatusCode::OK, description = "A page of orders"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
        (status_code = StatusCode::FORBIDDEN, description = "Administrator access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    page: QueryParam<u32, false>,
    per_page: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<OrderPageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;

    let status = status
        .into_inner()
        .map(|value| value.parse::<OrderStatus>())
        .transpose()
        .or_400("could not parse \"status\" query parameter")?;

    let page = PageRequest::new(
        page.into_inner().unwrap_or(1),
        per_page.into_inner().unwrap_or(DEFAULT_PER_PAGE),
    );

    let orders = state
        .app
        .orders
        .list_orders_by_status(caller, status, page)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::domain::orders::{MockOrdersService, OrdersServiceError, records::Page};

    use crate::{
        identity::{ROLE_HEADER, USER_HEADER},
        test_helpers::{Mocks, TEST_USER, make_order, service},
    };

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        service(
            Mocks {
                orders,
                ..Mocks::default()
            },
            Router::with_path("orders").get(handler),
        )
    }

    #[tokio::test]
    async fn test_index_filters_and_pages() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders_by_status()
            .once()
            .withf(|caller, status, page| {
                caller.is_admin()
                    && *status == Some(OrderStatus::Shipped)
                    && *page == PageRequest::new(2, 5)
            })
            .return_once(|_, _, _| {
                Ok(Page {
                    data: vec![make_order(TEST_USER, OrderStatus::Shipped)],
                    total: 6,
                    per_page: 5,
                    current_page: 2,
                    last_page: 2,
                })
            });

        let mut res = TestClient::get("http://example.com/orders?status=shipped&page=2&per_page=5")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .add_header(ROLE_HEADER, "admin", true)
            .send(&make_service(orders))
            .await;

        let body: OrderPageResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.total, 6);
        assert_eq!(body.last_page, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_index_rejects_unknown_status() -> TestResult {
        let mut orders = MockOrdersService::new();
        orders.expect_list_orders_by_status().never();

        let res = TestClient::get("http://example.com/orders?status=lost")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .add_header(ROLE_HEADER, "admin", true)
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_for_customer_returns_403() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders_by_status()
            .once()
            .return_once(|_, _, _| Err(OrdersServiceError::PermissionDenied));

        let res = TestClient::get("http://example.com/orders")
            .add_header(USER_HEADER, TEST_USER.to_string(), true)
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
