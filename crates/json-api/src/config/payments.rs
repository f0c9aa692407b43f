//! Payments Config

use std::time::Duration;

use clap::Args;

/// Payment provider settings.
#[derive(Debug, Args)]
pub struct PaymentsConfig {
    /// Seconds to wait for the payment provider on each call
    #[arg(long, env = "PAYMENT_TIMEOUT_SECONDS", default_value_t = 5_u64)]
    pub payment_timeout_seconds: u64,
}

impl PaymentsConfig {
    #[must_use]
    pub fn payment_timeout(&self) -> Duration {
        Duration::from_secs(self.payment_timeout_seconds)
    }
}
