//! Request/response DTOs and JSON mapping helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainResult, FieldErrors, OrderId, ProductId};
use storefront_infra::restock::RestockReport;
use storefront_products::{NewProduct, Product, ProductPatch, ProductQuery};
use storefront_sales::{Order, OrderItem, OrderStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    pub short_desc: Option<String>,
    pub long_desc: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub quantity: Option<i64>,
    pub published: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub short_desc: Option<String>,
    pub long_desc: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub quantity: Option<i64>,
    pub published: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct WaitlistRequest {
    #[serde(default)]
    pub email: String,
}

/// `GET /api/products?q=&page=&size=`
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl ListProductsQuery {
    pub fn into_query(self) -> ProductQuery {
        ProductQuery::new(self.q.as_deref(), self.page, self.size)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubCheckoutQuery {
    pub session_id: String,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

fn price_cents(errors: &mut FieldErrors, raw: Option<i64>) -> Option<u64> {
    let raw = raw?;
    match u64::try_from(raw) {
        Ok(cents) => Some(cents),
        Err(_) => {
            errors.add("priceCents", "Price must not be negative");
            None
        }
    }
}

fn quantity(errors: &mut FieldErrors, raw: Option<i64>) -> Option<u32> {
    let raw = raw?;
    match u32::try_from(raw) {
        Ok(q) => Some(q),
        Err(_) => {
            errors.add("quantity", "Quantity must be between 0 and 4294967295");
            None
        }
    }
}

impl CreateProductRequest {
    pub fn into_new_product(self) -> DomainResult<NewProduct> {
        let mut errors = FieldErrors::new();
        if self.price_cents.is_none() {
            errors.add("priceCents", "Price is required");
        }
        let price_cents = price_cents(&mut errors, self.price_cents);
        let quantity = quantity(&mut errors, self.quantity);
        errors.finish("Invalid product")?;

        Ok(NewProduct {
            slug: self.slug,
            name: self.name,
            short_desc: self.short_desc,
            long_desc: self.long_desc,
            price_cents: price_cents.unwrap_or_default(),
            currency: self.currency,
            quantity,
            published: self.published,
        })
    }
}

impl UpdateProductRequest {
    pub fn into_patch(self) -> DomainResult<ProductPatch> {
        let mut errors = FieldErrors::new();
        let price_cents = price_cents(&mut errors, self.price_cents);
        let quantity = quantity(&mut errors, self.quantity);
        errors.finish("Invalid product update")?;

        Ok(ProductPatch {
            name: self.name,
            short_desc: self.short_desc,
            long_desc: self.long_desc,
            price_cents,
            currency: self.currency,
            quantity,
            published: self.published,
        })
    }
}

/// What shoppers see. Exact stock stays private.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProduct {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub short_desc: Option<String>,
    pub long_desc: Option<String>,
    pub price: String,
    pub price_cents: u64,
    pub currency: String,
    pub in_stock: bool,
}

impl From<&Product> for PublicProduct {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            slug: p.slug.clone(),
            name: p.name.clone(),
            short_desc: p.short_desc.clone(),
            long_desc: p.long_desc.clone(),
            price: p.price.format_amount(),
            price_cents: p.price.cents,
            currency: p.price.currency.clone(),
            in_stock: p.quantity > 0,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProduct {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub short_desc: Option<String>,
    pub long_desc: Option<String>,
    pub price_cents: u64,
    pub currency: String,
    pub quantity: u32,
    pub published: bool,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for AdminProduct {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            slug: p.slug.clone(),
            name: p.name.clone(),
            short_desc: p.short_desc.clone(),
            long_desc: p.long_desc.clone(),
            price_cents: p.price.cents,
            currency: p.price.currency.clone(),
            quantity: p.quantity,
            published: p.published,
            version: p.version,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Admin write response: the stored product plus any restock fan-out it caused.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWriteResponse {
    pub product: AdminProduct,
    pub restock: Option<RestockReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub product_id: ProductId,
    pub qty: u32,
    pub unit_price_cents: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub email: String,
    pub status: OrderStatus,
    pub total: String,
    pub total_cents: u64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub item: OrderItemView,
}

impl OrderView {
    pub fn new(order: &Order, item: &OrderItem) -> Self {
        Self {
            id: order.id,
            email: order.email.clone(),
            status: order.status,
            total: order.total.format_amount(),
            total_cents: order.total.cents,
            currency: order.total.currency.clone(),
            created_at: order.created_at,
            item: OrderItemView {
                product_id: item.product_id,
                qty: item.quantity,
                unit_price_cents: item.unit_price_cents,
            },
        }
    }
}
