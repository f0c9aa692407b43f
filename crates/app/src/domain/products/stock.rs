//! Stock Ledger
//!
//! Reads and adjusts product stock inside a caller-owned transaction. Decrements are
//! conditional on sufficient stock at the moment of the write, never read-then-write.

use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{quantity_param, try_get_amount, try_get_quantity},
    domain::products::records::{ProductUuid, StockLevel},
};

const STOCK_LEVELS_SQL: &str = include_str!("sql/stock_levels.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");
const RESTORE_STOCK_SQL: &str = include_str!("sql/restore_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgStockLedger;

impl PgStockLedger {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Live levels for the given products. Unknown products are absent from the map.
    pub(crate) async fn stock_levels(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<FxHashMap<ProductUuid, StockLevel>, sqlx::Error> {
        let uuids: Vec<Uuid> = products.iter().map(|product| product.into_uuid()).collect();

        let levels = query_as::<Postgres, StockLevel>(STOCK_LEVELS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        Ok(levels
            .into_iter()
            .map(|level| (level.product_uuid, level))
            .collect())
    }

    /// Live level for a single product, if it exists.
    pub(crate) async fn stock_level(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<StockLevel>, sqlx::Error> {
        let mut levels = self.stock_levels(tx, &[product]).await?;

        Ok(levels.remove(&product))
    }

    /// Take `quantity` units out of stock. Returns `false` when there is not enough stock.
    pub(crate) async fn decrement(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(DECREMENT_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(quantity_param(quantity)?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    /// Put `quantity` units back into stock.
    pub(crate) async fn restore(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<(), sqlx::Error> {
        query(RESTORE_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(quantity_param(quantity)?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for StockLevel {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            price: try_get_amount(row, "price")?,
            stock_quantity: try_get_quantity(row, "stock_quantity")?,
            is_active: row.try_get("is_active")?,
        })
    }
}
