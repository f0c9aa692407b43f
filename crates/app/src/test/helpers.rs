//! Test Helpers

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::PgPool;
use storefront::{orders::PaymentMethod, pricing::ShippingMethod};

use crate::{
    domain::{
        carts::records::CartUuid, orders::data::CheckoutDetails, products::records::ProductUuid,
    },
    gateways::{
        notifications::{Notification, NotificationError, Notifier},
        payments::{Authorization, PaymentError, PaymentGateway},
    },
};

pub(crate) fn checkout_details() -> CheckoutDetails {
    CheckoutDetails {
        payment_method: PaymentMethod::Stripe,
        shipping_method: ShippingMethod::Standard,
        shipping_address: "1 Test Street, Testville".to_string(),
        billing_address: "1 Test Street, Testville".to_string(),
        contact_email: "customer@example.com".to_string(),
        notes: None,
    }
}

/// Keeps every notification so tests can assert on them.
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub(crate) fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier lock poisoned").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .expect("notifier lock poisoned")
            .push(notification);

        Ok(())
    }
}

/// Approves payment, but empties a product's stock while doing so, so the order write
/// that follows cannot decrement it.
#[derive(Debug, Clone)]
pub(crate) struct StockDrainingGateway {
    pool: PgPool,
    product: ProductUuid,
    refunds: Arc<Mutex<Vec<String>>>,
}

impl StockDrainingGateway {
    pub(crate) fn new(pool: PgPool, product: ProductUuid) -> Self {
        Self {
            pool,
            product,
            refunds: Arc::default(),
        }
    }

    pub(crate) fn refunds(&self) -> Vec<String> {
        self.refunds.lock().expect("refund lock poisoned").clone()
    }
}

#[async_trait]
impl PaymentGateway for StockDrainingGateway {
    async fn authorize(
        &self,
        _amount: u64,
        _method: PaymentMethod,
    ) -> Result<Authorization, PaymentError> {
        sqlx::query("UPDATE products SET stock_quantity = 0 WHERE uuid = $1")
            .bind(self.product.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| PaymentError::Unavailable(error.to_string()))?;

        Ok(Authorization {
            transaction_id: "trx_drained".to_string(),
        })
    }

    async fn refund(&self, transaction_id: &str) -> Result<(), PaymentError> {
        self.refunds
            .lock()
            .expect("refund lock poisoned")
            .push(transaction_id.to_string());

        Ok(())
    }
}

/// Approves payment, but deletes the cart being checked out while doing so, as a concurrent
/// merge would.
#[derive(Debug, Clone)]
pub(crate) struct CartDeletingGateway {
    pool: PgPool,
    cart: CartUuid,
    refunds: Arc<Mutex<Vec<String>>>,
}

impl CartDeletingGateway {
    pub(crate) fn new(pool: PgPool, cart: CartUuid) -> Self {
        Self {
            pool,
            cart,
            refunds: Arc::default(),
        }
    }

    pub(crate) fn refunds(&self) -> Vec<String> {
        self.refunds.lock().expect("refund lock poisoned").clone()
    }
}

#[async_trait]
impl PaymentGateway for CartDeletingGateway {
    async fn authorize(
        &self,
        _amount: u64,
        _method: PaymentMethod,
    ) -> Result<Authorization, PaymentError> {
        sqlx::query("DELETE FROM carts WHERE uuid = $1")
            .bind(self.cart.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| PaymentError::Unavailable(error.to_string()))?;

        Ok(Authorization {
            transaction_id: "trx_orphaned".to_string(),
        })
    }

    async fn refund(&self, transaction_id: &str) -> Result<(), PaymentError> {
        self.refunds
            .lock()
            .expect("refund lock poisoned")
            .push(transaction_id.to_string());

        Ok(())
    }
}
