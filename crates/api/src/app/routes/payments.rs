use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use storefront_infra::payments::{CheckoutSessionRequest, SESSION_PENDING, SimulatedOutcome};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/checkout-session", post(create_checkout_session))
        .route("/checkout-session/status", get(checkout_session_status))
        .route("/stub-checkout", get(stub_checkout))
        .route("/stub-checkout/simulate-success", post(simulate_success))
        .route("/stub-checkout/simulate-cancel", post(simulate_cancel))
}

pub async fn create_checkout_session(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CheckoutSessionRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.storefront().payments.create_checkout_session(&request).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Sessions are not tracked; every session reads as pending.
pub async fn checkout_session_status(Query(query): Query<dto::SessionQuery>) -> impl IntoResponse {
    Json(serde_json::json!({
        "sessionId": query.session_id,
        "status": SESSION_PENDING,
    }))
}

/// The stub "hosted checkout page", rendered as JSON.
pub async fn stub_checkout(Query(query): Query<dto::StubCheckoutQuery>) -> impl IntoResponse {
    Json(serde_json::json!({
        "sessionId": query.session_id,
        "status": SESSION_PENDING,
        "successUrl": query.success_url,
        "cancelUrl": query.cancel_url,
    }))
}

pub async fn simulate_success(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SessionQuery>,
) -> impl IntoResponse {
    Json(services.storefront().payments.simulate(&query.session_id, SimulatedOutcome::Success))
}

pub async fn simulate_cancel(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SessionQuery>,
) -> impl IntoResponse {
    Json(services.storefront().payments.simulate(&query.session_id, SimulatedOutcome::Cancel))
}
