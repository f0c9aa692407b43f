//! Order Records

use jiff::Timestamp;
use serde::Serialize;
use storefront::{
    orders::{OrderStatus, PaymentMethod, PaymentStatus},
    pricing::ShippingMethod,
};

use crate::{
    domain::{identity::UserUuid, products::records::ProductUuid},
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
///
/// Amounts are fixed when the order is placed and never recomputed.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_transaction_id: Option<String>,
    pub subtotal: u64,
    pub discount: u64,
    pub shipping_cost: u64,
    pub tax: u64,
    pub total_amount: u64,
    pub coupon_code: Option<String>,
    pub shipping_method: ShippingMethod,
    pub shipping_address: String,
    pub billing_address: String,
    pub contact_email: String,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OrderItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// Order Item Record, priced at the moment of checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub price: u64,
    pub created_at: Timestamp,
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
    pub last_page: u32,
}

impl<T> Page<T> {
    pub(crate) fn new(data: Vec<T>, total: u64, per_page: u32, current_page: u32) -> Self {
        let last_page = total.div_ceil(u64::from(per_page.max(1))).max(1);

        Self {
            data,
            total,
            per_page,
            current_page,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
        }
    }
}

/// Headline sales figures. All zero when the figures could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SalesStats {
    pub total_orders: u64,
    pub total_sales: u64,
    pub average_order_value: u64,
    pub unique_customers: u64,
}

/// A product ranked by units sold in orders that were not cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopularProduct {
    pub product_uuid: ProductUuid,
    pub order_count: u64,
    pub total_quantity: u64,
}
