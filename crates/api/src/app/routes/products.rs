use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/:slug", get(get_product))
        .route("/:slug/waitlist", post(join_waitlist))
}

/// Published products, optionally filtered by `q`, one page at a time.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ListProductsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return errors::query_rejection(rejection),
    };

    match services.storefront().catalog.published_page(&query.into_query()).await {
        Ok(page) => {
            let page = page.map(|p| dto::PublicProduct::from(&p));
            (StatusCode::OK, Json(page)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> axum::response::Response {
    match services.storefront().catalog.published_by_slug(&slug).await {
        Ok(product) => (StatusCode::OK, Json(dto::PublicProduct::from(&product))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Unknown or unpublished slug is 404; every other outcome is a 200 status.
pub async fn join_waitlist(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
    body: Result<Json<dto::WaitlistRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    let storefront = services.storefront();
    let product = match storefront.catalog.published_by_slug(&slug).await {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match storefront.waitlist.subscribe(product.id, &body.email).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
