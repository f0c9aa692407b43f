//! Payment Gateway

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use storefront::orders::PaymentMethod;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// A successful charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authorization {
    pub transaction_id: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("payment provider did not respond in time")]
    TimedOut,

    #[error("payment provider unavailable: {0}")]
    Unavailable(String),
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` minor units using `method`.
    async fn authorize(
        &self,
        amount: u64,
        method: PaymentMethod,
    ) -> Result<Authorization, PaymentError>;

    /// Reverse a previous charge in full.
    async fn refund(&self, transaction_id: &str) -> Result<(), PaymentError>;
}

/// Gateway that approves every supported method without contacting a provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedPaymentGateway;

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
    async fn authorize(
        &self,
        amount: u64,
        method: PaymentMethod,
    ) -> Result<Authorization, PaymentError> {
        let transaction_id = format!("trx_{}", Uuid::now_v7().simple());

        info!(%method, amount, %transaction_id, "simulated payment authorized");

        Ok(Authorization { transaction_id })
    }

    async fn refund(&self, transaction_id: &str) -> Result<(), PaymentError> {
        info!(%transaction_id, "simulated payment refunded");

        Ok(())
    }
}
