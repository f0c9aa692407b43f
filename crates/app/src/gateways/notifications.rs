//! Customer Notifications

use async_trait::async_trait;
use mockall::automock;
use storefront::money::display_minor;
use thiserror::Error;
use tracing::info;

use crate::domain::orders::records::OrderRecord;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("notification not delivered: {0}")]
pub struct NotificationError(pub String);

/// A message addressed to a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    #[must_use]
    pub fn order_confirmation(order: &OrderRecord) -> Self {
        Self {
            to: order.contact_email.clone(),
            subject: format!("Order {} confirmed", order.uuid),
            body: format!(
                "Thank you for your order. {} item(s), total {}, shipping {} ({} days).",
                order.items.len(),
                display_minor(order.total_amount),
                order.shipping_method.display_name(),
                order.shipping_method.delivery_days(),
            ),
        }
    }

    #[must_use]
    pub fn order_cancelled(order: &OrderRecord) -> Self {
        Self {
            to: order.contact_email.clone(),
            subject: format!("Order {} cancelled", order.uuid),
            body: format!(
                "Your order has been cancelled. Payment status: {}.",
                order.payment_status
            ),
        }
    }

    #[must_use]
    pub fn status_changed(order: &OrderRecord) -> Self {
        let tracking = order
            .tracking_number
            .as_deref()
            .map(|tracking| format!(" Tracking number: {tracking}."))
            .unwrap_or_default();

        Self {
            to: order.contact_email.clone(),
            subject: format!("Order {} is {}", order.uuid, order.status),
            body: format!("Your order status is now {}.{tracking}", order.status),
        }
    }
}

#[automock]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        info!(
            to = %notification.to,
            subject = %notification.subject,
            body = %notification.body,
            "notification"
        );

        Ok(())
    }
}
