use axum::Router;

pub mod admin;
pub mod orders;
pub mod payments;
pub mod products;
pub mod system;

/// Router for all public (shopper-facing) endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/payments", payments::router())
}
