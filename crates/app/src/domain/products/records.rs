//! Product Records

use jiff::Timestamp;
use serde::Serialize;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub price: u64,
    pub stock_quantity: u32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Live price, stock and availability of a product, read inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevel {
    pub product_uuid: ProductUuid,
    pub price: u64,
    pub stock_quantity: u32,
    pub is_active: bool,
}

impl StockLevel {
    /// Units a customer may buy right now; inactive products have none.
    #[must_use]
    pub fn available(&self) -> u32 {
        if self.is_active { self.stock_quantity } else { 0 }
    }
}
