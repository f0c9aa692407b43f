//! Sales Stats Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use storefront_app::domain::orders::data::SalesPeriod;

use crate::{extensions::*, orders::responses::StatsResponse, state::State};

const DEFAULT_POPULAR_LIMIT: u32 = 10;
const MAX_POPULAR_LIMIT: u32 = 100;

/// Sales Stats Handler
///
/// Headline sales figures for an inclusive window plus the best selling products. Figures
/// that cannot be read are reported as zero. Administrators only.
#[endpoint(
    tags("orders"),
    summary = "Sales Stats",
    responses(
        (status_code = StatusCode::OK, description = "Sales figures"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed timestamp"),
        (status_code = StatusCode::FORBIDDEN, description = "Administrator access required"),
    ),
)]
pub(crate) async fn handler(
    from: QueryParam<String, false>,
    to: QueryParam<String, false>,
    limit: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<StatsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.admin_or_403()?;

    let period = SalesPeriod {
        from: from.into_timestamp("from")?,
        to: to.into_timestamp("to")?,
    };

    let limit = limit
        .into_inner()
        .unwrap_or(DEFAULT_POPULAR_LIMIT)
        .clamp(1, MAX_POPULAR_LIMIT);

    let stats = state.app.orders.get_sales_stats(period).await;
    let popular = state.app.orders.get_popular_products(limit).await;

    Ok(Json(StatsResponse::new(stats, popular)))
}
