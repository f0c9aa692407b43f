//! Cart Records

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::Serialize;
use storefront::pricing::{self, PricedLine, PricingError};

use crate::{
    domain::{
        identity::CartIdentity,
        products::records::{ProductUuid, StockLevel},
    },
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
#[derive(Debug, Clone, Serialize)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub identity: CartIdentity,
    pub coupon_code: Option<String>,
    pub items: Vec<CartItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartRecord {
    /// Lines priced at the current product price.
    #[must_use]
    pub fn priced_lines(&self) -> Vec<PricedLine> {
        self.items.iter().map(CartItemRecord::priced_line).collect()
    }

    /// Sum of the line totals at current prices.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError`] when the subtotal overflows.
    pub fn subtotal(&self) -> Result<u64, PricingError> {
        pricing::subtotal(&self.priced_lines())
    }

    /// Quantity of `product` in the cart, zero if absent.
    #[must_use]
    pub fn quantity_of(&self, product: ProductUuid) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_uuid == product)
            .map_or(0, |item| item.quantity)
    }
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// A cart line, priced at the product's current price.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub unit_price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartItemRecord {
    #[must_use]
    pub fn priced_line(&self) -> PricedLine {
        PricedLine {
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }
}

/// A cart line that cannot be fulfilled from current stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockViolation {
    pub product_uuid: ProductUuid,
    pub requested: u32,
    pub available: u32,
}

/// Result of checking a cart against live stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartValidation {
    pub valid: bool,
    pub violations: Vec<StockViolation>,
}

impl CartValidation {
    /// Check every line against `levels`. Missing or inactive products have nothing available.
    pub(crate) fn check(
        items: &[CartItemRecord],
        levels: &FxHashMap<ProductUuid, StockLevel>,
    ) -> Self {
        let violations: Vec<StockViolation> = items
            .iter()
            .filter_map(|item| {
                let available = levels
                    .get(&item.product_uuid)
                    .map_or(0, StockLevel::available);

                (item.quantity > available).then_some(StockViolation {
                    product_uuid: item.product_uuid,
                    requested: item.quantity,
                    available,
                })
            })
            .collect();

        Self {
            valid: violations.is_empty(),
            violations,
        }
    }
}

/// A source line moved during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergedLine {
    pub product_uuid: ProductUuid,

    /// Quantity held by the source cart.
    pub requested: u32,

    /// Quantity added to the target cart after capping at remaining stock.
    pub merged: u32,
}

/// Outcome of merging one cart into another.
#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    pub cart: CartRecord,
    pub merged: Vec<MergedLine>,

    /// Lines with no remaining stock capacity in the target cart.
    pub skipped: Vec<StockViolation>,
}

/// A coupon accepted for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponApplication {
    pub code: String,
    pub subtotal: u64,
    pub discount: u64,
    pub payable: u64,
}
