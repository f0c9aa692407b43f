//! Reviews Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::domain::{
    identity::UserUuid,
    orders::data::PageRequest,
    products::records::ProductUuid,
    reviews::{
        data::NewReview,
        records::{ReviewRecord, ReviewStatus, ReviewUuid},
    },
};

const HAS_DELIVERED_PURCHASE_SQL: &str = include_str!("sql/has_delivered_purchase.sql");
const HAS_REVIEWED_SQL: &str = include_str!("sql/has_reviewed.sql");
const INSERT_REVIEW_SQL: &str = include_str!("sql/insert_review.sql");
const LIST_REVIEWS_SQL: &str = include_str!("sql/list_reviews.sql");
const COUNT_REVIEWS_SQL: &str = include_str!("sql/count_reviews.sql");
const LOCK_REVIEW_SQL: &str = include_str!("sql/lock_review.sql");
const UPDATE_REVIEW_STATUS_SQL: &str = include_str!("sql/update_review_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgReviewsRepository;

impl PgReviewsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn has_delivered_purchase(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(HAS_DELIVERED_PURCHASE_SQL)
            .bind(user.into_uuid())
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn has_reviewed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(HAS_REVIEWED_SQL)
            .bind(user.into_uuid())
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn insert_review(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        product: ProductUuid,
        review: &NewReview,
    ) -> Result<ReviewRecord, sqlx::Error> {
        query_as::<Postgres, ReviewRecord>(INSERT_REVIEW_SQL)
            .bind(ReviewUuid::new().into_uuid())
            .bind(product.into_uuid())
            .bind(user.into_uuid())
            .bind(i16::from(review.rating))
            .bind(review.comment.as_deref())
            .fetch_one(&mut **tx)
            .await
    }

    /// Reviews in `status`, newest first. `None` covers every product.
    pub(crate) async fn list_reviews(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: Option<ProductUuid>,
        status: ReviewStatus,
        page: PageRequest,
    ) -> Result<Vec<ReviewRecord>, sqlx::Error> {
        query_as::<Postgres, ReviewRecord>(LIST_REVIEWS_SQL)
            .bind(product.map(ProductUuid::into_uuid))
            .bind(status.as_str())
            .bind(i64::from(page.per_page))
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_reviews(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: Option<ProductUuid>,
        status: ReviewStatus,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_REVIEWS_SQL)
            .bind(product.map(ProductUuid::into_uuid))
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    pub(crate) async fn lock_review(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        review: ReviewUuid,
    ) -> Result<ReviewRecord, sqlx::Error> {
        query_as::<Postgres, ReviewRecord>(LOCK_REVIEW_SQL)
            .bind(review.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        review: ReviewUuid,
        status: ReviewStatus,
    ) -> Result<ReviewRecord, sqlx::Error> {
        query_as::<Postgres, ReviewRecord>(UPDATE_REVIEW_STATUS_SQL)
            .bind(review.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ReviewRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let rating: i16 = row.try_get("rating")?;
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: ReviewUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            rating: u8::try_from(rating).map_err(|e| sqlx::Error::ColumnDecode {
                index: "rating".to_string(),
                source: Box::new(e),
            })?,
            comment: row.try_get("comment")?,
            status: status
                .parse::<ReviewStatus>()
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: "status".to_string(),
                    source: Box::new(e),
                })?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
