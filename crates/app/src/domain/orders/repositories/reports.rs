//! Order Reports Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::try_get_amount,
    domain::{
        orders::{
            data::SalesPeriod,
            records::{PopularProduct, SalesStats},
        },
        products::records::ProductUuid,
    },
};

const SALES_STATS_SQL: &str = include_str!("../sql/sales_stats.sql");
const POPULAR_PRODUCTS_SQL: &str = include_str!("../sql/popular_products.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderReportsRepository;

impl PgOrderReportsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn sales_stats(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        period: SalesPeriod,
    ) -> Result<SalesStats, sqlx::Error> {
        query_as::<Postgres, SalesStats>(SALES_STATS_SQL)
            .bind(period.from.map(SqlxTimestamp::from))
            .bind(period.to.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn popular_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        limit: u32,
    ) -> Result<Vec<PopularProduct>, sqlx::Error> {
        query_as::<Postgres, PopularProduct>(POPULAR_PRODUCTS_SQL)
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for SalesStats {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            total_orders: try_get_amount(row, "total_orders")?,
            total_sales: try_get_amount(row, "total_sales")?,
            average_order_value: try_get_amount(row, "average_order_value")?,
            unique_customers: try_get_amount(row, "unique_customers")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for PopularProduct {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            order_count: try_get_amount(row, "order_count")?,
            total_quantity: try_get_amount(row, "total_quantity")?,
        })
    }
}
