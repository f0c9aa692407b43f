//! Order Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::CartNotFound => StatusError::not_found().brief("Cart not found"),
        OrdersServiceError::EmptyCart => StatusError::unprocessable_entity().brief("Cart is empty"),
        OrdersServiceError::InvalidCart(violations) => StatusError::conflict().brief(format!(
            "{} cart line(s) exceed available stock",
            violations.len()
        )),
        OrdersServiceError::CartChanged => {
            StatusError::conflict().brief("Cart changed during checkout, please try again")
        }
        OrdersServiceError::OutOfStock { product, requested } => StatusError::conflict().brief(
            format!("Not enough stock of product {product} for {requested} units"),
        ),
        OrdersServiceError::InvalidCoupon(reason) => {
            StatusError::unprocessable_entity().brief(format!("Invalid coupon: {reason}"))
        }
        OrdersServiceError::PaymentFailed(reason) => {
            StatusError::payment_required().brief(format!("Payment failed: {reason}"))
        }
        OrdersServiceError::InvalidTransition(transition) => {
            StatusError::conflict().brief(transition.to_string())
        }
        OrdersServiceError::PermissionDenied => StatusError::forbidden(),
        OrdersServiceError::Pricing(source) => {
            error!("failed to price order: {source}");

            StatusError::internal_server_error()
        }
        OrdersServiceError::InvalidData => {
            error!("order storage rejected invalid data");

            StatusError::internal_server_error()
        }
        OrdersServiceError::Unavailable(source) => {
            error!("order datastore unavailable: {source}");

            StatusError::service_unavailable()
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
