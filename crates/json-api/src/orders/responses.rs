//! Order Responses

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront::money::display_minor;
use storefront_app::domain::{
    carts::records::StockViolation,
    orders::records::{OrderItemRecord, OrderRecord, Page, PopularProduct, SalesStats},
};

use crate::carts::responses::StockViolationResponse;

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    /// The unique identifier of the order
    pub uuid: Uuid,

    /// The customer who placed the order
    pub user_uuid: Uuid,

    /// Fulfilment status
    pub status: String,

    /// Payment status
    pub payment_status: String,

    pub payment_method: String,

    /// Provider transaction reference
    pub payment_transaction_id: Option<String>,

    /// Amounts in minor units, fixed at checkout
    pub subtotal: u64,
    pub discount: u64,
    pub shipping_cost: u64,
    pub tax: u64,
    pub total_amount: u64,

    /// Order total formatted for display
    pub total_display: String,

    pub coupon_code: Option<String>,
    pub shipping_method: String,
    pub shipping_address: String,
    pub billing_address: String,
    pub contact_email: String,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,

    /// The lines of the order
    pub items: Vec<OrderItemResponse>,

    /// The date and time the order was placed
    pub created_at: String,

    /// The date and time the order was last updated
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            uuid: order.uuid.into(),
            user_uuid: order.user_uuid.into(),
            status: order.status.to_string(),
            payment_status: order.payment_status.to_string(),
            payment_method: order.payment_method.to_string(),
            payment_transaction_id: order.payment_transaction_id,
            subtotal: order.subtotal,
            discount: order.discount,
            shipping_cost: order.shipping_cost,
            tax: order.tax,
            total_amount: order.total_amount,
            total_display: display_minor(order.total_amount),
            coupon_code: order.coupon_code,
            shipping_method: order.shipping_method.to_string(),
            shipping_address: order.shipping_address,
            billing_address: order.billing_address,
            contact_email: order.contact_email,
            tracking_number: order.tracking_number,
            notes: order.notes,
            items: order.items.into_iter().map(Into::into).collect(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Invalid Cart Response
///
/// Returned with `409 Conflict` when checkout finds lines that exceed live stock.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct InvalidCartResponse {
    pub message: String,

    /// The lines to fix before checking out again
    pub invalid_items: Vec<StockViolationResponse>,
}

impl From<Vec<StockViolation>> for InvalidCartResponse {
    fn from(violations: Vec<StockViolation>) -> Self {
        Self {
            message: "Some items in your cart are no longer available in the requested quantity"
                .to_string(),
            invalid_items: violations.into_iter().map(Into::into).collect(),
        }
    }
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    pub uuid: Uuid,
    pub product_uuid: Uuid,
    pub quantity: u32,

    /// Unit price paid, in minor units
    pub price: u64,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        Self {
            uuid: item.uuid.into(),
            product_uuid: item.product_uuid.into(),
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// Order Page Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderPageResponse {
    pub data: Vec<OrderResponse>,
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
    pub last_page: u32,
}

impl From<Page<OrderRecord>> for OrderPageResponse {
    fn from(page: Page<OrderRecord>) -> Self {
        Self {
            data: page.data.into_iter().map(Into::into).collect(),
            total: page.total,
            per_page: page.per_page,
            current_page: page.current_page,
            last_page: page.last_page,
        }
    }
}

/// Sales Stats Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StatsResponse {
    pub total_orders: u64,

    /// Sum of order totals in minor units
    pub total_sales: u64,

    pub average_order_value: u64,
    pub unique_customers: u64,

    /// Best selling products by units
    pub popular_products: Vec<PopularProductResponse>,
}

impl StatsResponse {
    pub(crate) fn new(stats: SalesStats, popular: Vec<PopularProduct>) -> Self {
        Self {
            total_orders: stats.total_orders,
            total_sales: stats.total_sales,
            average_order_value: stats.average_order_value,
            unique_customers: stats.unique_customers,
            popular_products: popular.into_iter().map(Into::into).collect(),
        }
    }
}

/// Popular Product Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PopularProductResponse {
    pub product_uuid: Uuid,

    /// Number of orders containing the product
    pub order_count: u64,

    /// Units sold
    pub total_quantity: u64,
}

impl From<PopularProduct> for PopularProductResponse {
    fn from(product: PopularProduct) -> Self {
        Self {
            product_uuid: product.product_uuid.into(),
            order_count: product.order_count,
            total_quantity: product.total_quantity,
        }
    }
}
