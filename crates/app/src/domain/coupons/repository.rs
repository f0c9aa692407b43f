//! Coupons Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use storefront::coupons::{Coupon, DiscountKind};

use crate::{
    database::{
        amount_param, quantity_param, try_get_amount, try_get_optional_amount, try_get_quantity,
    },
    domain::coupons::{
        data::NewCoupon,
        records::{CouponRecord, CouponUuid},
    },
};

const GET_COUPON_SQL: &str = include_str!("sql/get_coupon.sql");
const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const REDEEM_COUPON_SQL: &str = include_str!("sql/redeem_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(GET_COUPON_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: &NewCoupon,
    ) -> Result<CouponRecord, sqlx::Error> {
        let (percentage, amount) = match coupon.discount {
            DiscountKind::Percentage(percent) => (Some(percent), None),
            DiscountKind::Fixed(amount) => (None, Some(amount_param(amount)?)),
        };

        query_as::<Postgres, CouponRecord>(CREATE_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(&coupon.code)
            .bind(coupon.discount.as_str())
            .bind(percentage)
            .bind(amount)
            .bind(coupon.minimum_spend.map(amount_param).transpose()?)
            .bind(coupon.maximum_discount.map(amount_param).transpose()?)
            .bind(coupon.usage_limit.map(quantity_param).transpose()?)
            .bind(coupon.starts_at.map(SqlxTimestamp::from))
            .bind(coupon.ends_at.map(SqlxTimestamp::from))
            .bind(coupon.is_active)
            .fetch_one(&mut **tx)
            .await
    }

    /// Count one redemption. Returns `false` once the usage limit has been reached.
    pub(crate) async fn redeem(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(REDEEM_COUPON_SQL)
            .bind(code)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount_type: String = row.try_get("discount_type")?;

        let discount = match discount_type.as_str() {
            "percentage" => {
                DiscountKind::Percentage(row.try_get::<Decimal, _>("discount_percentage")?)
            }
            "fixed" => DiscountKind::Fixed(try_get_amount(row, "discount_amount")?),
            other => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "discount_type".to_string(),
                    source: format!("unknown discount type: {other}").into(),
                });
            }
        };

        let usage_limit = row
            .try_get::<Option<i32>, _>("usage_limit")?
            .map(u32::try_from)
            .transpose()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "usage_limit".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            coupon: Coupon {
                code: row.try_get("code")?,
                discount,
                minimum_spend: try_get_optional_amount(row, "minimum_spend")?,
                maximum_discount: try_get_optional_amount(row, "maximum_discount")?,
                usage_limit,
                used_count: try_get_quantity(row, "used_count")?,
                starts_at: row
                    .try_get::<Option<SqlxTimestamp>, _>("starts_at")?
                    .map(SqlxTimestamp::to_jiff),
                ends_at: row
                    .try_get::<Option<SqlxTimestamp>, _>("ends_at")?
                    .map(SqlxTimestamp::to_jiff),
                is_active: row.try_get("is_active")?,
            },
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
