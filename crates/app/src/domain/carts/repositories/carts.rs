//! Carts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    carts::records::{CartRecord, CartUuid},
    identity::{CartIdentity, SessionToken, UserUuid},
};

const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const FIND_CART_SQL: &str = include_str!("../sql/find_cart.sql");
const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const LOCK_CART_SQL: &str = include_str!("../sql/lock_cart.sql");
const DELETE_CART_SQL: &str = include_str!("../sql/delete_cart.sql");
const SET_COUPON_SQL: &str = include_str!("../sql/set_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a cart for `identity` unless one already exists.
    pub(crate) async fn create_cart_if_absent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        identity: &CartIdentity,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CREATE_CART_SQL)
            .bind(cart.into_uuid())
            .bind(identity.user_uuid().map(UserUuid::into_uuid))
            .bind(identity.session_token())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn find_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        identity: &CartIdentity,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(FIND_CART_SQL)
            .bind(identity.user_uuid().map(UserUuid::into_uuid))
            .bind(identity.session_token())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(GET_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch a cart and hold its row lock until the transaction ends.
    pub(crate) async fn lock_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(LOCK_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        code: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_COUPON_SQL)
            .bind(cart.into_uuid())
            .bind(code)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let user_uuid: Option<Uuid> = row.try_get("user_uuid")?;
        let session_token: Option<String> = row.try_get("session_token")?;

        let identity = match (user_uuid, session_token) {
            (Some(user), None) => CartIdentity::User(UserUuid::from_uuid(user)),
            (None, Some(token)) => CartIdentity::Anonymous(SessionToken::new(token)),
            _ => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "user_uuid".to_string(),
                    source: "cart must have exactly one owner".into(),
                });
            }
        };

        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            identity,
            coupon_code: row.try_get("coupon_code")?,
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
