//! Orders service.
//!
//! Checkout runs in three phases: a read-only quote (validation and pricing), payment
//! authorization outside any transaction, and a single write transaction that persists the
//! order, decrements stock, redeems the coupon and empties the cart. When the write phase
//! fails the authorization is refunded.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use storefront::{
    coupons::{self, CouponRejection},
    orders::{OrderStatus, PaymentStatus},
    pricing::{self, OrderTotals},
};
use tracing::{Span, error, info, warn};

use crate::{
    database::Db,
    domain::{
        carts::{
            records::{CartItemRecord, CartUuid, CartValidation},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        coupons::repository::PgCouponsRepository,
        identity::{CartIdentity, Caller},
        orders::{
            data::{CheckoutDetails, NewOrder, PageRequest, SalesPeriod, StatusUpdate},
            errors::OrdersServiceError,
            records::{OrderRecord, OrderUuid, Page, PopularProduct, SalesStats},
            repositories::{PgOrderItemsRepository, PgOrderReportsRepository, PgOrdersRepository},
        },
        products::{records::ProductUuid, stock::PgStockLedger},
    },
    gateways::{
        notifications::{Notification, Notifier},
        payments::{Authorization, PaymentError, PaymentGateway},
    },
};

/// Default bound on a single payment provider call.
pub const DEFAULT_PAYMENT_TIMEOUT: Duration = Duration::from_secs(5);

const CANCELLED_BY_CUSTOMER: &str = "Order cancelled by user";
const CANCELLED_BY_ADMIN: &str = "Order cancelled by administrator";

/// A validated, priced cart ready to be charged.
#[derive(Debug)]
struct Quote {
    lines: Vec<CartItemRecord>,
    totals: OrderTotals,
    coupon_code: Option<String>,
}

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    orders: PgOrdersRepository,
    items: PgOrderItemsRepository,
    reports: PgOrderReportsRepository,
    carts: PgCartsRepository,
    cart_items: PgCartItemsRepository,
    stock: PgStockLedger,
    coupons: PgCouponsRepository,
    payments: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    payment_timeout: Duration,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, payments: Arc<dyn PaymentGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            items: PgOrderItemsRepository::new(),
            reports: PgOrderReportsRepository::new(),
            carts: PgCartsRepository::new(),
            cart_items: PgCartItemsRepository::new(),
            stock: PgStockLedger::new(),
            coupons: PgCouponsRepository::new(),
            payments,
            notifier,
            payment_timeout: DEFAULT_PAYMENT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_payment_timeout(mut self, payment_timeout: Duration) -> Self {
        self.payment_timeout = payment_timeout;
        self
    }

    /// Validate and price the cart without changing anything.
    async fn quote(
        &self,
        caller: Caller,
        cart: CartUuid,
        details: &CheckoutDetails,
    ) -> Result<Quote, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = match self.carts.get_cart(&mut tx, cart).await {
            Ok(record) => record,
            Err(sqlx::Error::RowNotFound) => return Err(OrdersServiceError::CartNotFound),
            Err(error) => return Err(error.into()),
        };

        if record.identity != CartIdentity::User(caller.user) {
            return Err(OrdersServiceError::PermissionDenied);
        }

        let lines = self.cart_items.list_items(&mut tx, cart).await?;

        if lines.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        let products: Vec<ProductUuid> = lines.iter().map(|line| line.product_uuid).collect();
        let levels = self.stock.stock_levels(&mut tx, &products).await?;

        let validation = CartValidation::check(&lines, &levels);

        if !validation.valid {
            return Err(OrdersServiceError::InvalidCart(validation.violations));
        }

        let priced: Vec<_> = lines.iter().map(CartItemRecord::priced_line).collect();
        let subtotal = pricing::subtotal(&priced)?;

        let discount = match record.coupon_code.as_deref() {
            Some(code) => {
                let coupon = self
                    .coupons
                    .find_coupon(&mut tx, code)
                    .await?
                    .ok_or(OrdersServiceError::InvalidCoupon(CouponRejection::UnknownCode))?;

                coupons::evaluate(&coupon.coupon, subtotal, Timestamp::now())
                    .map_err(OrdersServiceError::InvalidCoupon)?
                    .discount
            }
            None => 0,
        };

        let totals = OrderTotals::compute(subtotal, discount, details.shipping_method)?;

        tx.commit().await?;

        Ok(Quote {
            lines,
            totals,
            coupon_code: record.coupon_code,
        })
    }

    async fn authorize(
        &self,
        quote: &Quote,
        details: &CheckoutDetails,
    ) -> Result<Authorization, OrdersServiceError> {
        let charge = self
            .payments
            .authorize(quote.totals.total, details.payment_method);

        match tokio::time::timeout(self.payment_timeout, charge).await {
            Ok(Ok(authorization)) => Ok(authorization),
            Ok(Err(error)) => Err(OrdersServiceError::PaymentFailed(error)),
            Err(_elapsed) => {
                warn!(timeout = ?self.payment_timeout, "payment authorization timed out");

                Err(OrdersServiceError::PaymentFailed(PaymentError::TimedOut))
            }
        }
    }

    /// Persist the order. Every write happens in one transaction; an error rolls all of it back.
    async fn place_order(
        &self,
        caller: Caller,
        cart: CartUuid,
        details: &CheckoutDetails,
        quote: &Quote,
        authorization: &Authorization,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let locked = match self.carts.lock_cart(&mut tx, cart).await {
            Ok(locked) => locked,
            Err(sqlx::Error::RowNotFound) => return Err(OrdersServiceError::CartNotFound),
            Err(error) => return Err(error.into()),
        };
        let current = self.cart_items.list_items(&mut tx, cart).await?;

        if locked.coupon_code != quote.coupon_code || !same_lines(&current, &quote.lines) {
            return Err(OrdersServiceError::CartChanged);
        }

        let mut order = self
            .orders
            .insert_order(
                &mut tx,
                &NewOrder {
                    uuid: OrderUuid::new(),
                    user_uuid: caller.user,
                    details,
                    totals: quote.totals,
                    coupon_code: quote.coupon_code.as_deref(),
                    transaction_id: &authorization.transaction_id,
                },
            )
            .await?;

        for line in &quote.lines {
            if !self
                .stock
                .decrement(&mut tx, line.product_uuid, line.quantity)
                .await?
            {
                return Err(OrdersServiceError::OutOfStock {
                    product: line.product_uuid,
                    requested: line.quantity,
                });
            }

            let item = self.items.insert_item(&mut tx, order.uuid, line).await?;

            order.items.push(item);
        }

        if let Some(code) = quote.coupon_code.as_deref()
            && !self.coupons.redeem(&mut tx, code).await?
        {
            return Err(OrdersServiceError::InvalidCoupon(
                CouponRejection::UsageLimitReached,
            ));
        }

        self.cart_items.clear_items(&mut tx, cart).await?;
        self.carts.set_coupon(&mut tx, cart, None).await?;

        tx.commit().await?;

        Ok(order)
    }

    /// Refund a charge whose order could not be stored.
    async fn compensate(&self, authorization: &Authorization, cause: &OrdersServiceError) {
        let transaction_id = authorization.transaction_id.as_str();

        match self.refund(transaction_id).await {
            Ok(()) => warn!(%transaction_id, %cause, "checkout rolled back, payment refunded"),
            Err(refund_error) => error!(
                %transaction_id,
                %cause,
                %refund_error,
                "checkout rolled back, compensating refund failed"
            ),
        }
    }

    async fn refund(&self, transaction_id: &str) -> Result<(), PaymentError> {
        tokio::time::timeout(self.payment_timeout, self.payments.refund(transaction_id))
            .await
            .unwrap_or(Err(PaymentError::TimedOut))
    }

    async fn notify(&self, notification: Notification) {
        if let Err(error) = self.notifier.send(notification).await {
            warn!(%error, "failed to send notification");
        }
    }

    async fn load_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut order: OrderRecord,
    ) -> Result<OrderRecord, OrdersServiceError> {
        order.items = self.items.list_items(tx, order.uuid).await?;

        Ok(order)
    }

    async fn cancel_order(
        &self,
        caller: Caller,
        order: OrderUuid,
        note: &str,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.orders.lock_order(&mut tx, order).await?;

        if !caller.can_access(record.user_uuid) {
            return Err(OrdersServiceError::PermissionDenied);
        }

        record.status.transition_to(OrderStatus::Cancelled)?;

        let items = self.items.list_items(&mut tx, order).await?;

        for item in &items {
            self.stock
                .restore(&mut tx, item.product_uuid, item.quantity)
                .await?;
        }

        let mut cancelled = self.orders.cancel_order(&mut tx, order, note).await?;

        tx.commit().await?;

        cancelled.items = items;

        info!(order_uuid = %order, "cancelled order");

        if cancelled.payment_status == PaymentStatus::Paid
            && let Some(transaction_id) = cancelled.payment_transaction_id.clone()
        {
            match self.refund(&transaction_id).await {
                Ok(()) => match self.mark_refunded(order).await {
                    Ok(()) => cancelled.payment_status = PaymentStatus::Refunded,
                    Err(error) => error!(
                        order_uuid = %order,
                        %error,
                        "refund issued but payment status not updated"
                    ),
                },
                Err(error) => error!(
                    order_uuid = %order,
                    %transaction_id,
                    %error,
                    "refund for cancelled order failed"
                ),
            }
        }

        self.notify(Notification::order_cancelled(&cancelled)).await;

        Ok(cancelled)
    }

    async fn mark_refunded(&self, order: OrderUuid) -> Result<(), OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.orders
            .set_payment_status(&mut tx, order, PaymentStatus::Refunded)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn read_sales_stats(&self, period: SalesPeriod) -> Result<SalesStats, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let stats = self.reports.sales_stats(&mut tx, period).await?;

        tx.commit().await?;

        Ok(stats)
    }

    async fn read_popular_products(
        &self,
        limit: u32,
    ) -> Result<Vec<PopularProduct>, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let products = self.reports.popular_products(&mut tx, limit).await?;

        tx.commit().await?;

        Ok(products)
    }
}

fn same_lines(current: &[CartItemRecord], quoted: &[CartItemRecord]) -> bool {
    current.len() == quoted.len()
        && current.iter().zip(quoted).all(|(current, quoted)| {
            current.product_uuid == quoted.product_uuid
                && current.quantity == quoted.quantity
                && current.unit_price == quoted.unit_price
        })
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.checkout",
        skip(self, caller, details),
        fields(
            user_uuid = %caller.user,
            cart_uuid = %cart,
            payment_method = %details.payment_method,
            shipping_method = %details.shipping_method,
            order_uuid = tracing::field::Empty,
            total_amount = tracing::field::Empty
        ),
        err
    )]
    async fn checkout(
        &self,
        caller: Caller,
        cart: CartUuid,
        details: CheckoutDetails,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let quote = self.quote(caller, cart, &details).await?;

        let span = Span::current();

        span.record("total_amount", quote.totals.total);

        let authorization = self.authorize(&quote, &details).await?;

        let order = match self
            .place_order(caller, cart, &details, &quote, &authorization)
            .await
        {
            Ok(order) => order,
            Err(error) => {
                self.compensate(&authorization, &error).await;

                return Err(error);
            }
        };

        span.record("order_uuid", tracing::field::display(order.uuid));

        info!(order_uuid = %order.uuid, "order placed");

        self.notify(Notification::order_confirmation(&order)).await;

        Ok(order)
    }

    #[tracing::instrument(
        name = "orders.service.cancel",
        skip(self, caller),
        fields(user_uuid = %caller.user, order_uuid = %order),
        err
    )]
    async fn cancel(
        &self,
        caller: Caller,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        self.cancel_order(caller, order, CANCELLED_BY_CUSTOMER).await
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip(self, caller, update),
        fields(user_uuid = %caller.user, order_uuid = %order, status = %update.status),
        err
    )]
    async fn update_status(
        &self,
        caller: Caller,
        order: OrderUuid,
        update: StatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError> {
        if !caller.is_admin() {
            return Err(OrdersServiceError::PermissionDenied);
        }

        if update.status == OrderStatus::Cancelled {
            return self.cancel_order(caller, order, CANCELLED_BY_ADMIN).await;
        }

        let mut tx = self.db.begin_transaction().await?;

        let record = self.orders.lock_order(&mut tx, order).await?;

        let status = record.status.transition_to(update.status)?;

        let tracking_number = match status {
            OrderStatus::Shipped => update.tracking_number.as_deref(),
            _ => None,
        };

        let updated = self
            .orders
            .update_status(&mut tx, order, status, tracking_number)
            .await?;

        let updated = self.load_order(&mut tx, updated).await?;

        tx.commit().await?;

        info!(order_uuid = %order, %status, "updated order status");

        self.notify(Notification::status_changed(&updated)).await;

        Ok(updated)
    }

    async fn get_order(
        &self,
        caller: Caller,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.orders.get_order(&mut tx, order).await?;

        if !caller.can_access(record.user_uuid) {
            return Err(OrdersServiceError::PermissionDenied);
        }

        let record = self.load_order(&mut tx, record).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_orders_by_status(
        &self,
        caller: Caller,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<OrderRecord>, OrdersServiceError> {
        if !caller.is_admin() {
            return Err(OrdersServiceError::PermissionDenied);
        }

        let mut tx = self.db.begin_transaction().await?;

        let total = self.orders.count_orders(&mut tx, status).await?;
        let mut orders = self.orders.list_orders(&mut tx, status, page).await?;

        let uuids: Vec<OrderUuid> = orders.iter().map(|order| order.uuid).collect();
        let mut items = self.items.list_items_by_order(&mut tx, &uuids).await?;

        tx.commit().await?;

        for order in &mut orders {
            order.items = items.remove(&order.uuid).unwrap_or_default();
        }

        Ok(Page::new(orders, total, page.per_page, page.page))
    }

    async fn get_sales_stats(&self, period: SalesPeriod) -> SalesStats {
        self.read_sales_stats(period).await.unwrap_or_else(|error| {
            error!(%error, "sales statistics unavailable");

            SalesStats::default()
        })
    }

    async fn get_popular_products(&self, limit: u32) -> Vec<PopularProduct> {
        self.read_popular_products(limit)
            .await
            .unwrap_or_else(|error| {
                error!(%error, "popular products unavailable");

                Vec::new()
            })
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Convert the caller's cart into a paid order.
    async fn checkout(
        &self,
        caller: Caller,
        cart: CartUuid,
        details: CheckoutDetails,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Cancel a pending or processing order, restoring stock and refunding payment.
    async fn cancel(&self, caller: Caller, order: OrderUuid)
    -> Result<OrderRecord, OrdersServiceError>;

    /// Move an order along its lifecycle. Administrators only.
    async fn update_status(
        &self,
        caller: Caller,
        order: OrderUuid,
        update: StatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve a single order with its items.
    async fn get_order(
        &self,
        caller: Caller,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Page through orders, newest first, optionally filtered by status. Administrators only.
    async fn list_orders_by_status(
        &self,
        caller: Caller,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<OrderRecord>, OrdersServiceError>;

    /// Headline sales figures; zeroes when they cannot be read.
    async fn get_sales_stats(&self, period: SalesPeriod) -> SalesStats;

    /// Best selling products; empty when they cannot be read.
    async fn get_popular_products(&self, limit: u32) -> Vec<PopularProduct>;
}
