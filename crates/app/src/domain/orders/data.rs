//! Order Data

use jiff::Timestamp;
use serde::Deserialize;
use storefront::{
    orders::{OrderStatus, PaymentMethod},
    pricing::{OrderTotals, ShippingMethod},
};

use crate::domain::{identity::UserUuid, orders::records::OrderUuid};

/// Customer choices made at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutDetails {
    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
    pub shipping_address: String,
    pub billing_address: String,
    pub contact_email: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// An administrative status change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,

    /// Recorded when moving to `shipped`, ignored otherwise.
    #[serde(default)]
    pub tracking_number: Option<String>,
}

/// Page selection for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub const MAX_PER_PAGE: u32 = 100;

    /// Clamp to page >= 1 and 1 <= per_page <= [`Self::MAX_PER_PAGE`].
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub(crate) fn offset(self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// Inclusive reporting window. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalesPeriod {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

/// Order row written by checkout.
#[derive(Debug, Clone)]
pub(crate) struct NewOrder<'a> {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub details: &'a CheckoutDetails,
    pub totals: OrderTotals,
    pub coupon_code: Option<&'a str>,
    pub transaction_id: &'a str,
}
