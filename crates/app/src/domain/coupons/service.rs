//! Coupons service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::coupons::{
        data::NewCoupon, errors::CouponsServiceError, records::CouponRecord,
        repository::PgCouponsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    #[tracing::instrument(
        name = "coupons.service.create_coupon",
        skip(self, coupon),
        fields(coupon_code = %coupon.code, discount_type = coupon.discount.as_str()),
        err
    )]
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self.repository.create_coupon(&mut tx, &coupon).await?;

        tx.commit().await?;

        info!(coupon_uuid = %created.uuid, "created coupon");

        Ok(created)
    }

    async fn get_coupon(&self, code: &str) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let coupon = self.repository.find_coupon(&mut tx, code).await?;

        tx.commit().await?;

        coupon.ok_or(CouponsServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Creates a new coupon.
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError>;

    /// Retrieve a coupon by its redemption code.
    async fn get_coupon(&self, code: &str) -> Result<CouponRecord, CouponsServiceError>;
}
