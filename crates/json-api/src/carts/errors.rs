//! Cart Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::carts::CartsServiceError;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::NotFound => StatusError::not_found().brief("Cart not found"),
        CartsServiceError::InvalidQuantity => {
            StatusError::bad_request().brief("Quantity must be at least one")
        }
        CartsServiceError::ProductUnavailable(product) => StatusError::unprocessable_entity()
            .brief(format!("Product {product} is not available")),
        CartsServiceError::OutOfStock {
            product,
            requested,
            available,
        } => StatusError::conflict().brief(format!(
            "Only {available} of product {product} in stock, {requested} requested"
        )),
        CartsServiceError::InvalidMerge => {
            StatusError::bad_request().brief("A cart cannot be merged into itself")
        }
        CartsServiceError::InvalidCoupon(reason) => {
            StatusError::unprocessable_entity().brief(format!("Invalid coupon: {reason}"))
        }
        CartsServiceError::Pricing(source) => {
            error!("failed to price cart: {source}");

            StatusError::internal_server_error()
        }
        CartsServiceError::Unavailable(source) => {
            error!("cart datastore unavailable: {source}");

            StatusError::service_unavailable()
        }
        CartsServiceError::Sql(source) => {
            error!("cart storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
