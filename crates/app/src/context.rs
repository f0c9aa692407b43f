//! App Context

use std::{sync::Arc, time::Duration};

use sqlx::PgPool;
use thiserror::Error;

use crate::{
    database::{self, Db, PoolSettings},
    domain::{
        carts::{CartsService, PgCartsService},
        coupons::{CouponsService, PgCouponsService},
        orders::{OrdersService, PgOrdersService},
        products::{PgProductsService, ProductsService},
        reviews::{PgReviewsService, ReviewsService},
    },
    gateways::{
        notifications::{LogNotifier, Notifier},
        payments::{PaymentGateway, SimulatedPaymentGateway},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub carts: Arc<dyn CartsService>,
    pub coupons: Arc<dyn CouponsService>,
    pub orders: Arc<dyn OrdersService>,
    pub reviews: Arc<dyn ReviewsService>,
}

impl AppContext {
    /// Build application context from a database URL, with the simulated payment gateway and
    /// log notifier as collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        pool: PoolSettings,
        payment_timeout: Duration,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url, pool)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_pool(
            pool,
            Arc::new(SimulatedPaymentGateway),
            Arc::new(LogNotifier),
            payment_timeout,
        ))
    }

    #[must_use]
    pub fn from_pool(
        pool: PgPool,
        payments: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        payment_timeout: Duration,
    ) -> Self {
        let db = Db::new(pool);

        Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            coupons: Arc::new(PgCouponsService::new(db.clone())),
            orders: Arc::new(
                PgOrdersService::new(db.clone(), payments, notifier)
                    .with_payment_timeout(payment_timeout),
            ),
            reviews: Arc::new(PgReviewsService::new(db)),
        }
    }
}
