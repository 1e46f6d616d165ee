//! Product catalog: admin writes and public reads.
//!
//! Every admin write hands the pre-write snapshot to the [`RestockNotifier`].

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use storefront_core::{DomainError, DomainResult, ExpectedVersion, ProductId};
use storefront_products::{
    NewProduct, Product, ProductPage, ProductPatch, ProductQuery, ProductRef, ProductSnapshot,
};

use crate::checkout::DEFAULT_MAX_ATTEMPTS;
use crate::restock::{RestockNotifier, RestockReport};
use crate::store::{StoreError, StorefrontStore};

/// A product write and what it set off.
#[derive(Debug, Clone)]
pub struct ProductWrite {
    pub product: Product,
    pub restock: Option<RestockReport>,
}

pub struct CatalogService<S: ?Sized = dyn StorefrontStore> {
    store: Arc<S>,
    notifier: RestockNotifier<S>,
    max_attempts: u32,
}

impl<S: ?Sized> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: self.notifier.clone(),
            max_attempts: self.max_attempts,
        }
    }
}

impl<S> CatalogService<S>
where
    S: StorefrontStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, notifier: RestockNotifier<S>) -> Self {
        Self {
            store,
            notifier,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Create a product. A product born purchasable counts as restocked from
    /// `(0, unpublished)`.
    #[instrument(skip(self, new), fields(slug = %new.slug), err)]
    pub async fn create_product(&self, new: NewProduct) -> DomainResult<ProductWrite> {
        new.validate()?;
        let product = self
            .store
            .insert_product(new, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => DomainError::conflict("Product slug already exists"),
                other => other.into(),
            })?;
        info!(product_id = %product.id, slug = %product.slug, "product created");

        let restock = if product.is_purchasable() {
            let previous = ProductSnapshot {
                quantity: 0,
                published: false,
            };
            self.notifier.on_product_updated(&product, previous).await
        } else {
            None
        };
        Ok(ProductWrite { product, restock })
    }

    /// Apply a partial update, retrying on concurrent writes.
    #[instrument(skip(self, patch), err)]
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> DomainResult<ProductWrite> {
        patch.validate()?;

        for attempt in 1..=self.max_attempts {
            let current = self.product(id).await?;
            let mut updated = current.clone();
            let previous = updated.apply_patch(&patch, Utc::now())?;

            match self
                .store
                .save_product(&updated, ExpectedVersion::exact(current.version))
                .await
            {
                Ok(saved) => {
                    info!(
                        product_id = %saved.id,
                        quantity = saved.quantity,
                        published = saved.published,
                        "product updated"
                    );
                    let restock = self.notifier.on_product_updated(&saved, previous).await;
                    return Ok(ProductWrite {
                        product: saved,
                        restock,
                    });
                }
                Err(StoreError::VersionConflict(reason)) => {
                    debug!(attempt, %reason, "product update lost a concurrent write, retrying");
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::internal(format!(
            "product {id}: no update after {} attempts",
            self.max_attempts
        )))
    }

    pub async fn product(&self, id: ProductId) -> DomainResult<Product> {
        self.store
            .find_product(&ProductRef::ById(id))
            .await?
            .ok_or_else(|| DomainError::not_found("Product"))
    }

    pub async fn products(&self) -> DomainResult<Vec<Product>> {
        Ok(self.store.list_products().await?)
    }

    /// Public lookup: unpublished products do not exist for shoppers.
    pub async fn published_by_slug(&self, slug: &str) -> DomainResult<Product> {
        self.store
            .find_product(&ProductRef::BySlug(slug.trim().to_string()))
            .await?
            .filter(|p| p.published)
            .ok_or_else(|| DomainError::not_found("Product"))
    }

    /// Public listing: published products matching the query text, paged.
    pub async fn published_page(&self, query: &ProductQuery) -> DomainResult<ProductPage> {
        Ok(self.store.search_published(query).await?)
    }
}
