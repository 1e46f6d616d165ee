//! Admin endpoints. Every route here sits behind the bearer-token middleware.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use storefront_core::{OrderId, ProductId};
use storefront_infra::catalog::ProductWrite;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", get(get_product).patch(update_product))
        .route("/orders/:id", get(get_order))
}

fn write_response(status: StatusCode, write: ProductWrite) -> axum::response::Response {
    let body = dto::ProductWriteResponse {
        product: dto::AdminProduct::from(&write.product),
        restock: write.restock,
    };
    (status, Json(body)).into_response()
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    let new = match body.into_new_product() {
        Ok(new) => new,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.storefront().catalog.create_product(new).await {
        Ok(write) => write_response(StatusCode::CREATED, write),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    let patch = match body.into_patch() {
        Ok(patch) => patch,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.storefront().catalog.update_product(id, patch).await {
        Ok(write) => write_response(StatusCode::OK, write),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.storefront().catalog.product(id).await {
        Ok(product) => (StatusCode::OK, Json(dto::AdminProduct::from(&product))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.storefront().catalog.products().await {
        Ok(products) => {
            let items = products.iter().map(dto::AdminProduct::from).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.storefront().checkout.order(id).await {
        Ok((order, item)) => (StatusCode::OK, Json(dto::OrderView::new(&order, &item))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
