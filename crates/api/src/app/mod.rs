//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (store backend, notification channel)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use storefront_infra::config::StorefrontConfig;
use storefront_infra::store::StoreError;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &StorefrontConfig) -> Result<Router, StoreError> {
    let services = services::build_services(config).await?;
    Ok(router(Arc::new(services), &config.admin_token))
}

/// Router over already wired services.
pub fn router(services: Arc<AppServices>, admin_token: &str) -> Router {
    let admin_auth = middleware::AdminAuth::new(admin_token);

    let admin = routes::admin::router().layer(axum::middleware::from_fn_with_state(
        admin_auth,
        middleware::admin_auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .nest("/admin", admin)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

pub use services::AppServices;
