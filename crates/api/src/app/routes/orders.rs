use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use storefront_sales::CheckoutRequest;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", post(create_order))
}

/// Single-item checkout: `{productId|productSlug, qty, email}` to
/// `{orderId, status, total, currency}`.
pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.storefront().checkout.place_order(&request).await {
        Ok(confirmation) => (StatusCode::OK, Json(confirmation)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
