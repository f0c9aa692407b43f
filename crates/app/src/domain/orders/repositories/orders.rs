//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use storefront::orders::{OrderStatus, PaymentStatus};

use crate::{
    database::{amount_param, try_get_amount},
    domain::{
        identity::UserUuid,
        orders::{
            data::{NewOrder, PageRequest},
            records::{OrderRecord, OrderUuid},
        },
    },
};

const INSERT_ORDER_SQL: &str = include_str!("../sql/insert_order.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const LOCK_ORDER_SQL: &str = include_str!("../sql/lock_order.sql");
const UPDATE_STATUS_SQL: &str = include_str!("../sql/update_status.sql");
const CANCEL_ORDER_SQL: &str = include_str!("../sql/cancel_order.sql");
const SET_PAYMENT_STATUS_SQL: &str = include_str!("../sql/set_payment_status.sql");
const LIST_ORDERS_SQL: &str = include_str!("../sql/list_orders.sql");
const COUNT_ORDERS_SQL: &str = include_str!("../sql/count_orders.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder<'_>,
    ) -> Result<OrderRecord, sqlx::Error> {
        let totals = order.totals;

        query_as::<Postgres, OrderRecord>(INSERT_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.user_uuid.into_uuid())
            .bind(order.details.payment_method.as_str())
            .bind(order.transaction_id)
            .bind(amount_param(totals.subtotal)?)
            .bind(amount_param(totals.discount)?)
            .bind(amount_param(totals.shipping)?)
            .bind(amount_param(totals.tax)?)
            .bind(amount_param(totals.total)?)
            .bind(order.coupon_code)
            .bind(order.details.shipping_method.as_str())
            .bind(&order.details.shipping_address)
            .bind(&order.details.billing_address)
            .bind(&order.details.contact_email)
            .bind(order.details.notes.as_deref())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch an order and hold its row lock until the transaction ends.
    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(tracking_number)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn cancel_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        note: &str,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CANCEL_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(note)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_payment_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_PAYMENT_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(status.map(OrderStatus::as_str))
            .bind(i64::from(page.per_page))
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        status: Option<OrderStatus>,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_ORDERS_SQL)
            .bind(status.map(OrderStatus::as_str))
            .fetch_one(&mut **tx)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn try_get_parsed<T>(row: &PgRow, col: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value: String = row.try_get(col)?;

    value.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            status: try_get_parsed(row, "status")?,
            payment_status: try_get_parsed(row, "payment_status")?,
            payment_method: try_get_parsed(row, "payment_method")?,
            payment_transaction_id: row.try_get("payment_transaction_id")?,
            subtotal: try_get_amount(row, "subtotal")?,
            discount: try_get_amount(row, "discount")?,
            shipping_cost: try_get_amount(row, "shipping_cost")?,
            tax: try_get_amount(row, "tax")?,
            total_amount: try_get_amount(row, "total_amount")?,
            coupon_code: row.try_get("coupon_code")?,
            shipping_method: try_get_parsed(row, "shipping_method")?,
            shipping_address: row.try_get("shipping_address")?,
            billing_address: row.try_get("billing_address")?,
            contact_email: row.try_get("contact_email")?,
            tracking_number: row.try_get("tracking_number")?,
            notes: row.try_get("notes")?,
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
