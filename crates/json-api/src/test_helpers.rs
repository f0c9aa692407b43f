//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use storefront::{
    orders::{OrderStatus, PaymentMethod, PaymentStatus},
    pricing::ShippingMethod,
};
use storefront_app::{
    context::AppContext,
    domain::{
        carts::{
            MockCartsService,
            records::{CartItemRecord, CartItemUuid, CartRecord, CartUuid},
        },
        coupons::MockCouponsService,
        identity::{CartIdentity, UserUuid},
        orders::{
            MockOrdersService,
            records::{OrderItemRecord, OrderItemUuid, OrderRecord, OrderUuid},
        },
        products::{MockProductsService, records::ProductUuid},
        reviews::{
            MockReviewsService,
            records::{ReviewRecord, ReviewStatus, ReviewUuid},
        },
    },
};

use crate::{identity, state::State};

pub(crate) const TEST_USER: UserUuid = UserUuid::from_uuid(Uuid::from_u128(1));
pub(crate) const TEST_SESSION: &str = "test-session";

/// Service doubles. Any call without a matching expectation fails the test.
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) products: MockProductsService,
    pub(crate) carts: MockCartsService,
    pub(crate) coupons: MockCouponsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) reviews: MockReviewsService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            products: Arc::new(self.products),
            carts: Arc::new(self.carts),
            coupons: Arc::new(self.coupons),
            orders: Arc::new(self.orders),
            reviews: Arc::new(self.reviews),
        })
    }
}

/// Serve `route` with the mocked state and identity middleware in front of it.
pub(crate) fn service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(identity::handler)
            .push(route),
    )
}

pub(crate) fn make_cart(identity: CartIdentity, lines: &[(ProductUuid, u32, u64)]) -> CartRecord {
    let uuid = CartUuid::new();

    CartRecord {
        uuid,
        identity,
        coupon_code: None,
        items: lines
            .iter()
            .map(|&(product_uuid, quantity, unit_price)| CartItemRecord {
                uuid: CartItemUuid::new(),
                cart_uuid: uuid,
                product_uuid,
                quantity,
                unit_price,
                created_at: Timestamp::UNIX_EPOCH,
                updated_at: Timestamp::UNIX_EPOCH,
            })
            .collect(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_order(user: UserUuid, status: OrderStatus) -> OrderRecord {
    let uuid = OrderUuid::new();

    OrderRecord {
        uuid,
        user_uuid: user,
        status,
        payment_status: PaymentStatus::Paid,
        payment_method: PaymentMethod::Stripe,
        payment_transaction_id: Some("trx_test".to_string()),
        subtotal: 20_00,
        discount: 0,
        shipping_cost: 5_99,
        tax: 2_08,
        total_amount: 28_07,
        coupon_code: None,
        shipping_method: ShippingMethod::Standard,
        shipping_address: "1 Test Street".to_string(),
        billing_address: "1 Test Street".to_string(),
        contact_email: "customer@example.com".to_string(),
        tracking_number: None,
        notes: None,
        items: vec![OrderItemRecord {
            uuid: OrderItemUuid::new(),
            order_uuid: uuid,
            product_uuid: ProductUuid::new(),
            quantity: 2,
            price: 10_00,
            created_at: Timestamp::UNIX_EPOCH,
        }],
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_review(product: ProductUuid, status: ReviewStatus) -> ReviewRecord {
    ReviewRecord {
        uuid: ReviewUuid::new(),
        product_uuid: product,
        user_uuid: TEST_USER,
        rating: 4,
        comment: Some("Sturdy".to_string()),
        status,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
