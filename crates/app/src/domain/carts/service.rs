//! Carts service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashMap;
use sqlx::{Postgres, Transaction};
use storefront::coupons::{self, CouponRejection};
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            records::{
                CartItemRecord, CartRecord, CartUuid, CartValidation, CouponApplication,
                MergeOutcome, MergedLine, StockViolation,
            },
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        coupons::repository::PgCouponsRepository,
        identity::CartIdentity,
        products::{
            records::{ProductUuid, StockLevel},
            stock::PgStockLedger,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts: PgCartsRepository,
    items: PgCartItemsRepository,
    stock: PgStockLedger,
    coupons: PgCouponsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts: PgCartsRepository::new(),
            items: PgCartItemsRepository::new(),
            stock: PgStockLedger::new(),
            coupons: PgCouponsRepository::new(),
        }
    }

    async fn load_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut cart: CartRecord,
    ) -> Result<CartRecord, CartsServiceError> {
        cart.items = self.items.list_items(tx, cart.uuid).await?;

        Ok(cart)
    }

    async fn available_level(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<StockLevel, CartsServiceError> {
        self.stock
            .stock_level(tx, product)
            .await?
            .filter(|level| level.is_active)
            .ok_or(CartsServiceError::ProductUnavailable(product))
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    #[tracing::instrument(
        name = "carts.service.resolve_cart",
        skip(self, identity),
        fields(cart_uuid = tracing::field::Empty, created = tracing::field::Empty),
        err
    )]
    async fn resolve_cart(&self, identity: CartIdentity) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .carts
            .create_cart_if_absent(&mut tx, CartUuid::new(), &identity)
            .await?;

        let cart = self.carts.find_cart(&mut tx, &identity).await?;
        let cart = self.load_items(&mut tx, cart).await?;

        tx.commit().await?;

        let span = Span::current();

        span.record("cart_uuid", tracing::field::display(cart.uuid));
        span.record("created", created == 1);

        Ok(cart)
    }

    async fn get_cart(&self, cart: CartUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.carts.get_cart(&mut tx, cart).await?;
        let record = self.load_items(&mut tx, record).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self),
        fields(cart_uuid = %cart, product_uuid = %product),
        err
    )]
    async fn add_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartItemRecord, CartsServiceError> {
        if quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin_transaction().await?;

        let record = self.carts.lock_cart(&mut tx, cart).await?;
        let record = self.load_items(&mut tx, record).await?;

        let level = self.available_level(&mut tx, product).await?;

        let requested = record
            .quantity_of(product)
            .checked_add(quantity)
            .ok_or(CartsServiceError::InvalidQuantity)?;

        if requested > level.stock_quantity {
            return Err(CartsServiceError::OutOfStock {
                product,
                requested,
                available: level.stock_quantity,
            });
        }

        let item = self
            .items
            .add_quantity(&mut tx, cart, product, quantity)
            .await?;

        tx.commit().await?;

        Ok(item)
    }

    #[tracing::instrument(
        name = "carts.service.set_quantity",
        skip(self),
        fields(cart_uuid = %cart, product_uuid = %product),
        err
    )]
    async fn set_quantity(
        &self,
        cart: CartUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Option<CartItemRecord>, CartsServiceError> {
        if quantity == 0 {
            self.remove_item(cart, product).await?;

            return Ok(None);
        }

        let mut tx = self.db.begin_transaction().await?;

        self.carts.lock_cart(&mut tx, cart).await?;

        let level = self.available_level(&mut tx, product).await?;

        if quantity > level.stock_quantity {
            return Err(CartsServiceError::OutOfStock {
                product,
                requested: quantity,
                available: level.stock_quantity,
            });
        }

        let item = self
            .items
            .set_quantity(&mut tx, cart, product, quantity)
            .await?;

        tx.commit().await?;

        Ok(Some(item))
    }

    async fn remove_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.items.remove_item(&mut tx, cart, product).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn clear(&self, cart: CartUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.items.clear_items(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn validate(&self, cart: CartUuid) -> Result<CartValidation, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.carts.get_cart(&mut tx, cart).await?;
        let record = self.load_items(&mut tx, record).await?;

        let products: Vec<ProductUuid> = record.items.iter().map(|item| item.product_uuid).collect();
        let levels = self.stock.stock_levels(&mut tx, &products).await?;

        tx.commit().await?;

        Ok(CartValidation::check(&record.items, &levels))
    }

    #[tracing::instrument(
        name = "carts.service.merge_into",
        skip(self),
        fields(
            source_cart_uuid = %source,
            target_cart_uuid = %target,
            merged_count = tracing::field::Empty,
            skipped_count = tracing::field::Empty
        ),
        err
    )]
    async fn merge_into(
        &self,
        source: CartUuid,
        target: CartUuid,
    ) -> Result<MergeOutcome, CartsServiceError> {
        if source == target {
            return Err(CartsServiceError::InvalidMerge);
        }

        let mut tx = self.db.begin_transaction().await?;

        // Lock in a stable order so opposing merges cannot deadlock.
        let (first, second) = if source < target {
            (source, target)
        } else {
            (target, source)
        };

        self.carts.lock_cart(&mut tx, first).await?;
        self.carts.lock_cart(&mut tx, second).await?;

        let source_items = self.items.list_items(&mut tx, source).await?;
        let target_items = self.items.list_items(&mut tx, target).await?;

        let in_target: FxHashMap<ProductUuid, u32> = target_items
            .iter()
            .map(|item| (item.product_uuid, item.quantity))
            .collect();

        let products: Vec<ProductUuid> = source_items.iter().map(|item| item.product_uuid).collect();
        let levels = self.stock.stock_levels(&mut tx, &products).await?;

        let mut merged = Vec::new();
        let mut skipped = Vec::new();

        for item in source_items {
            let product = item.product_uuid;
            let available = levels.get(&product).map_or(0, StockLevel::available);
            let existing = in_target.get(&product).copied().unwrap_or_default();
            let capacity = available.saturating_sub(existing);
            let moved = item.quantity.min(capacity);

            if moved == 0 {
                skipped.push(StockViolation {
                    product_uuid: product,
                    requested: existing.saturating_add(item.quantity),
                    available,
                });

                continue;
            }

            self.items
                .add_quantity(&mut tx, target, product, moved)
                .await?;

            merged.push(MergedLine {
                product_uuid: product,
                requested: item.quantity,
                merged: moved,
            });
        }

        self.carts.delete_cart(&mut tx, source).await?;

        let cart = self.carts.get_cart(&mut tx, target).await?;
        let cart = self.load_items(&mut tx, cart).await?;

        tx.commit().await?;

        let span = Span::current();

        span.record("merged_count", merged.len());
        span.record("skipped_count", skipped.len());

        info!(cart_uuid = %target, "merged carts");

        Ok(MergeOutcome {
            cart,
            merged,
            skipped,
        })
    }

    #[tracing::instrument(
        name = "carts.service.apply_coupon",
        skip(self),
        fields(cart_uuid = %cart),
        err
    )]
    async fn apply_coupon(
        &self,
        cart: CartUuid,
        code: String,
    ) -> Result<CouponApplication, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.carts.lock_cart(&mut tx, cart).await?;
        let record = self.load_items(&mut tx, record).await?;

        let subtotal = record.subtotal()?;

        let coupon = self
            .coupons
            .find_coupon(&mut tx, &code)
            .await?
            .ok_or(CartsServiceError::InvalidCoupon(CouponRejection::UnknownCode))?;

        let applied = coupons::evaluate(&coupon.coupon, subtotal, Timestamp::now())
            .map_err(CartsServiceError::InvalidCoupon)?;

        self.carts.set_coupon(&mut tx, cart, Some(&code)).await?;

        tx.commit().await?;

        Ok(CouponApplication {
            code,
            subtotal,
            discount: applied.discount,
            payable: applied.payable,
        })
    }

    async fn remove_coupon(&self, cart: CartUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self.carts.set_coupon(&mut tx, cart, None).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Find the cart for `identity`, creating it on first use.
    async fn resolve_cart(&self, identity: CartIdentity) -> Result<CartRecord, CartsServiceError>;

    /// Retrieve a single cart with its lines.
    async fn get_cart(&self, cart: CartUuid) -> Result<CartRecord, CartsServiceError>;

    /// Add `quantity` units of a product, merging into an existing line.
    async fn add_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Overwrite the quantity of a line. Zero removes the line and returns `None`.
    async fn set_quantity(
        &self,
        cart: CartUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Option<CartItemRecord>, CartsServiceError>;

    /// Remove a line. Removing an absent line succeeds.
    async fn remove_item(&self, cart: CartUuid, product: ProductUuid)
    -> Result<(), CartsServiceError>;

    /// Remove every line.
    async fn clear(&self, cart: CartUuid) -> Result<(), CartsServiceError>;

    /// Check every line against live stock without changing anything.
    async fn validate(&self, cart: CartUuid) -> Result<CartValidation, CartsServiceError>;

    /// Move the lines of `source` into `target`, capped at remaining stock, then delete
    /// `source`.
    async fn merge_into(
        &self,
        source: CartUuid,
        target: CartUuid,
    ) -> Result<MergeOutcome, CartsServiceError>;

    /// Evaluate a coupon against the cart subtotal and attach it to the cart.
    async fn apply_coupon(
        &self,
        cart: CartUuid,
        code: String,
    ) -> Result<CouponApplication, CartsServiceError>;

    /// Detach any coupon from the cart.
    async fn remove_coupon(&self, cart: CartUuid) -> Result<(), CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use storefront::coupons::DiscountKind;
    use testresult::TestResult;

    use crate::{
        domain::{
            coupons::{CouponsService, data::NewCoupon},
            identity::{SessionToken, UserUuid},
            products::ProductsService,
        },
        test::TestContext,
    };

    use super::*;

    fn user() -> CartIdentity {
        CartIdentity::User(UserUuid::new())
    }

    fn anonymous() -> CartIdentity {
        CartIdentity::Anonymous(SessionToken::new(uuid::Uuid::now_v7().to_string()))
    }

    #[tokio::test]
    async fn resolve_cart_is_stable_per_identity() -> TestResult {
        let ctx = TestContext::new().await;
        let identity = user();

        let first = ctx.carts.resolve_cart(identity.clone()).await?;
        let second = ctx.carts.resolve_cart(identity.clone()).await?;
        let other = ctx.carts.resolve_cart(anonymous()).await?;

        assert_eq!(first.uuid, second.uuid);
        assert_eq!(first.identity, identity);
        assert_ne!(first.uuid, other.uuid);
        assert!(first.items.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn add_item_accumulates_into_one_line() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(2_50, 10).await?;
        let cart = ctx.carts.resolve_cart(user()).await?;

        ctx.carts.add_item(cart.uuid, product, 2).await?;
        let item = ctx.carts.add_item(cart.uuid, product, 3).await?;

        assert_eq!(item.quantity, 5);

        let cart = ctx.carts.get_cart(cart.uuid).await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.quantity_of(product), 5);
        assert_eq!(cart.subtotal()?, 12_50);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_beyond_stock_returns_out_of_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 4).await?;
        let cart = ctx.carts.resolve_cart(user()).await?;

        ctx.carts.add_item(cart.uuid, product, 3).await?;

        let result = ctx.carts.add_item(cart.uuid, product, 2).await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::OutOfStock {
                    requested: 5,
                    available: 4,
                    ..
                })
            ),
            "expected OutOfStock, got {result:?}"
        );

        assert_eq!(ctx.carts.get_cart(cart.uuid).await?.quantity_of(product), 3);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_zero_quantity_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 4).await?;
        let cart = ctx.carts.resolve_cart(user()).await?;

        let result = ctx.carts.add_item(cart.uuid, product, 0).await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_inactive_product_is_unavailable() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 4).await?;
        ctx.products.set_active(product, false).await?;
        let cart = ctx.carts.resolve_cart(user()).await?;

        let result = ctx.carts.add_item(cart.uuid, product, 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::ProductUnavailable(p)) if p == product),
            "expected ProductUnavailable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_unknown_cart_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 4).await?;

        let result = ctx.carts.add_item(CartUuid::new(), product, 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn set_quantity_zero_matches_remove_item() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 10).await?;
        let kept = ctx.create_product(2_00, 10).await?;

        let by_zero = ctx.carts.resolve_cart(user()).await?;
        let by_remove = ctx.carts.resolve_cart(user()).await?;

        for cart in [by_zero.uuid, by_remove.uuid] {
            ctx.carts.add_item(cart, product, 2).await?;
            ctx.carts.add_item(cart, kept, 1).await?;
        }

        let removed = ctx.carts.set_quantity(by_zero.uuid, product, 0).await?;
        ctx.carts.remove_item(by_remove.uuid, product).await?;

        assert!(removed.is_none());

        let by_zero = ctx.carts.get_cart(by_zero.uuid).await?;
        let by_remove = ctx.carts.get_cart(by_remove.uuid).await?;

        let lines = |cart: &CartRecord| -> Vec<(ProductUuid, u32)> {
            cart.items
                .iter()
                .map(|item| (item.product_uuid, item.quantity))
                .collect()
        };

        assert_eq!(lines(&by_zero), lines(&by_remove));
        assert_eq!(lines(&by_zero), vec![(kept, 1)]);

        Ok(())
    }

    #[tokio::test]
    async fn set_quantity_overwrites_and_checks_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 5).await?;
        let cart = ctx.carts.resolve_cart(user()).await?;

        ctx.carts.add_item(cart.uuid, product, 4).await?;

        let item = ctx.carts.set_quantity(cart.uuid, product, 2).await?;

        assert_eq!(item.map(|item| item.quantity), Some(2));

        let result = ctx.carts.set_quantity(cart.uuid, product, 6).await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::OutOfStock {
                    requested: 6,
                    available: 5,
                    ..
                })
            ),
            "expected OutOfStock, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_item_and_clear_are_idempotent() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 5).await?;
        let cart = ctx.carts.resolve_cart(user()).await?;

        ctx.carts.add_item(cart.uuid, product, 1).await?;

        ctx.carts.remove_item(cart.uuid, product).await?;
        ctx.carts.remove_item(cart.uuid, product).await?;

        ctx.carts.add_item(cart.uuid, product, 1).await?;

        ctx.carts.clear(cart.uuid).await?;
        ctx.carts.clear(cart.uuid).await?;

        assert!(ctx.carts.get_cart(cart.uuid).await?.items.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn validate_is_read_only_and_repeatable() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 5).await?;
        let cart = ctx.carts.resolve_cart(user()).await?;

        ctx.carts.add_item(cart.uuid, product, 3).await?;
        ctx.products.update_stock(product, 1).await?;

        let first = ctx.carts.validate(cart.uuid).await?;
        let second = ctx.carts.validate(cart.uuid).await?;

        assert_eq!(first, second);
        assert!(!first.valid);
        assert_eq!(
            first.violations,
            vec![StockViolation {
                product_uuid: product,
                requested: 3,
                available: 1,
            }]
        );

        assert_eq!(ctx.carts.get_cart(cart.uuid).await?.quantity_of(product), 3);
        assert_eq!(ctx.products.get_product(product).await?.stock_quantity, 1);

        Ok(())
    }

    #[tokio::test]
    async fn merge_adds_anonymous_lines_and_deletes_source() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 5).await?;

        let anonymous = ctx.carts.resolve_cart(anonymous()).await?;
        let target = ctx.carts.resolve_cart(user()).await?;

        ctx.carts.add_item(anonymous.uuid, product, 2).await?;
        ctx.carts.add_item(target.uuid, product, 1).await?;

        let outcome = ctx.carts.merge_into(anonymous.uuid, target.uuid).await?;

        assert_eq!(outcome.cart.quantity_of(product), 3);
        assert!(outcome.skipped.is_empty());
        assert_eq!(
            outcome.merged,
            vec![MergedLine {
                product_uuid: product,
                requested: 2,
                merged: 2,
            }]
        );

        let source = ctx.carts.get_cart(anonymous.uuid).await;

        assert!(
            matches!(source, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {source:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn merge_caps_at_remaining_stock_and_reports_skips() -> TestResult {
        let ctx = TestContext::new().await;
        let capped = ctx.create_product(1_00, 4).await?;
        let full = ctx.create_product(1_00, 2).await?;

        let source = ctx.carts.resolve_cart(anonymous()).await?;
        let target = ctx.carts.resolve_cart(user()).await?;

        ctx.carts.add_item(source.uuid, capped, 3).await?;
        ctx.carts.add_item(source.uuid, full, 1).await?;
        ctx.carts.add_item(target.uuid, capped, 2).await?;
        ctx.carts.add_item(target.uuid, full, 2).await?;

        let outcome = ctx.carts.merge_into(source.uuid, target.uuid).await?;

        assert_eq!(outcome.cart.quantity_of(capped), 4);
        assert_eq!(outcome.cart.quantity_of(full), 2);
        assert_eq!(
            outcome.skipped,
            vec![StockViolation {
                product_uuid: full,
                requested: 3,
                available: 2,
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn merge_into_itself_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.carts.resolve_cart(user()).await?;

        let result = ctx.carts.merge_into(cart.uuid, cart.uuid).await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidMerge)),
            "expected InvalidMerge, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn apply_coupon_clamps_fixed_discount_to_subtotal() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(10_00, 5).await?;
        let cart = ctx.carts.resolve_cart(user()).await?;

        ctx.carts.add_item(cart.uuid, product, 1).await?;
        ctx.coupons
            .create_coupon(NewCoupon::new("FIFTY", DiscountKind::Fixed(50_00)))
            .await?;

        let applied = ctx
            .carts
            .apply_coupon(cart.uuid, "FIFTY".to_string())
            .await?;

        assert_eq!(applied.subtotal, 10_00);
        assert_eq!(applied.discount, 10_00);
        assert_eq!(applied.payable, 0);

        let cart = ctx.carts.get_cart(cart.uuid).await?;

        assert_eq!(cart.coupon_code.as_deref(), Some("FIFTY"));

        ctx.carts.remove_coupon(cart.uuid).await?;

        assert!(ctx.carts.get_cart(cart.uuid).await?.coupon_code.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn apply_coupon_unknown_code_is_invalid() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.carts.resolve_cart(user()).await?;

        let result = ctx
            .carts
            .apply_coupon(cart.uuid, "MISSING".to_string())
            .await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::InvalidCoupon(CouponRejection::UnknownCode))
            ),
            "expected InvalidCoupon, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn apply_coupon_below_minimum_spend_is_invalid() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(10_00, 5).await?;
        let cart = ctx.carts.resolve_cart(user()).await?;

        ctx.carts.add_item(cart.uuid, product, 1).await?;

        let mut coupon = NewCoupon::new("BIGSPEND", DiscountKind::Fixed(5_00));
        coupon.minimum_spend = Some(50_00);

        ctx.coupons.create_coupon(coupon).await?;

        let result = ctx
            .carts
            .apply_coupon(cart.uuid, "BIGSPEND".to_string())
            .await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::InvalidCoupon(
                    CouponRejection::BelowMinimumSpend { .. }
                ))
            ),
            "expected InvalidCoupon, got {result:?}"
        );

        assert!(ctx.carts.get_cart(cart.uuid).await?.coupon_code.is_none());

        Ok(())
    }
}
