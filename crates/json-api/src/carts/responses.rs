//! Cart Responses

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront::{money::line_total, pricing::PricingError};
use storefront_app::domain::carts::records::{
    CartItemRecord, CartRecord, CouponApplication, MergeOutcome, MergedLine, StockViolation,
};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub uuid: Uuid,

    /// The lines in the cart, priced at current product prices
    pub items: Vec<CartItemResponse>,

    /// Total number of units in the cart
    pub item_count: u64,

    /// Sum of line totals in minor units
    pub subtotal: u64,

    /// The coupon attached to the cart
    pub coupon_code: Option<String>,

    /// The date and time the cart was created
    pub created_at: String,

    /// The date and time the cart was last updated
    pub updated_at: String,
}

impl TryFrom<CartRecord> for CartResponse {
    type Error = PricingError;

    fn try_from(cart: CartRecord) -> Result<Self, Self::Error> {
        let subtotal = cart.subtotal()?;
        let item_count = cart.items.iter().map(|item| u64::from(item.quantity)).sum();

        let items = cart
            .items
            .into_iter()
            .map(CartItemResponse::try_from)
            .collect::<Result<_, _>>()?;

        Ok(Self {
            uuid: cart.uuid.into(),
            items,
            item_count,
            subtotal,
            coupon_code: cart.coupon_code,
            created_at: cart.created_at.to_string(),
            updated_at: cart.updated_at.to_string(),
        })
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    /// The unique identifier of the cart line
    pub uuid: Uuid,

    /// The product on this line
    pub product_uuid: Uuid,

    /// Number of units
    pub quantity: u32,

    /// Current unit price in minor units
    pub unit_price: u64,

    /// `unit_price * quantity`
    pub line_total: u64,
}

impl TryFrom<CartItemRecord> for CartItemResponse {
    type Error = PricingError;

    fn try_from(item: CartItemRecord) -> Result<Self, Self::Error> {
        let line_total = line_total(item.unit_price, item.quantity)?;

        Ok(Self {
            uuid: item.uuid.into(),
            product_uuid: item.product_uuid.into(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total,
        })
    }
}

/// A line that cannot be fulfilled from current stock.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StockViolationResponse {
    pub product_uuid: Uuid,
    pub requested: u32,
    pub available: u32,
}

impl From<StockViolation> for StockViolationResponse {
    fn from(violation: StockViolation) -> Self {
        Self {
            product_uuid: violation.product_uuid.into(),
            requested: violation.requested,
            available: violation.available,
        }
    }
}

/// Merged Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MergedLineResponse {
    pub product_uuid: Uuid,

    /// Units held by the anonymous cart
    pub requested: u32,

    /// Units added to the user's cart
    pub merged: u32,
}

impl From<MergedLine> for MergedLineResponse {
    fn from(line: MergedLine) -> Self {
        Self {
            product_uuid: line.product_uuid.into(),
            requested: line.requested,
            merged: line.merged,
        }
    }
}

/// Merge Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MergeResponse {
    /// The user's cart after the merge
    pub cart: CartResponse,

    /// Lines moved into the cart
    pub merged: Vec<MergedLineResponse>,

    /// Lines left behind because no stock remained
    pub skipped: Vec<StockViolationResponse>,
}

impl TryFrom<MergeOutcome> for MergeResponse {
    type Error = PricingError;

    fn try_from(outcome: MergeOutcome) -> Result<Self, Self::Error> {
        Ok(Self {
            cart: outcome.cart.try_into()?,
            merged: outcome.merged.into_iter().map(Into::into).collect(),
            skipped: outcome.skipped.into_iter().map(Into::into).collect(),
        })
    }
}

/// Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponResponse {
    pub code: String,
    pub subtotal: u64,
    pub discount: u64,

    /// Subtotal after the discount
    pub payable: u64,
}

impl From<CouponApplication> for CouponResponse {
    fn from(application: CouponApplication) -> Self {
        Self {
            code: application.code,
            subtotal: application.subtotal,
            discount: application.discount,
            payable: application.payable,
        }
    }
}
