//! App Router

use salvo::Router;

use crate::{carts, identity, orders, reviews};

/// Routes that act on behalf of a caller. Identity headers are parsed before any of them run.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(identity::handler)
        .push(
            Router::with_path("cart")
                .get(carts::get::handler)
                .push(Router::with_path("validation").get(carts::validate::handler))
                .push(Router::with_path("merge").post(carts::merge::handler))
                .push(
                    Router::with_path("coupon")
                        .post(carts::apply_coupon::handler)
                        .delete(carts::remove_coupon::handler),
                )
                .push(
                    Router::with_path("items")
                        .post(carts::add_item::handler)
                        .delete(carts::clear::handler)
                        .push(
                            Router::with_path("{product}")
                                .put(carts::set_item::handler)
                                .delete(carts::remove_item::handler),
                        ),
                ),
        )
        .push(
            Router::with_path("orders")
                .get(orders::index::handler)
                .post(orders::checkout::handler)
                .push(Router::with_path("stats").get(orders::stats::handler))
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .push(Router::with_path("cancel").post(orders::cancel::handler))
                        .push(Router::with_path("status").put(orders::status::handler)),
                ),
        )
        .push(
            Router::with_path("products/{product}")
                .push(Router::with_path("review-eligibility").get(reviews::eligibility::handler))
                .push(
                    Router::with_path("reviews")
                        .get(reviews::index::handler)
                        .post(reviews::create::handler),
                ),
        )
        .push(
            Router::with_path("reviews")
                .push(Router::with_path("pending").get(reviews::pending::handler))
                .push(Router::with_path("{review}/status").put(reviews::status::handler)),
        )
}
