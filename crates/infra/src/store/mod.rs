//! Storage contracts for the storefront.
//!
//! The engines only ever talk to these traits. Two backends implement them:
//! [`InMemoryStorefront`] for tests/dev and [`PgStorefront`] for production.
//!
//! ## Concurrency contract
//!
//! Products carry a `version` that is bumped on every successful write. Admin
//! writes pass the [`ExpectedVersion`] they observed; a stale version is
//! rejected with [`StoreError::VersionConflict`] and the caller re-reads and
//! retries.
//!
//! The checkout commit (stock decrement + order + order item) is one
//! indivisible unit in every backend. It is guarded by what the order was
//! priced from (stock, price, currency, published flag), not by the version,
//! so concurrent checkouts of a well-stocked product never invalidate each
//! other.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use storefront_core::{DomainError, ExpectedVersion, OrderId, ProductId};
use storefront_products::{NewProduct, Product, ProductPage, ProductQuery, ProductRef};
use storefront_sales::{NewOrder, Order, OrderItem};
use storefront_waitlist::{NewWaitlistEntry, WaitlistEntry};

mod memory;
mod postgres;

pub use memory::InMemoryStorefront;
pub use postgres::PgStorefront;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row changed since the caller read it.
    #[error("version conflict: {0}")]
    VersionConflict(String),

    /// A uniqueness constraint rejected the write.
    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("{0} not found")]
    NotFound(String),

    /// The domain refused to build the record.
    #[error(transparent)]
    Rejected(#[from] DomainError),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::VersionConflict(msg) => DomainError::Conflict(msg),
            StoreError::Duplicate(msg) => DomainError::Conflict(msg),
            StoreError::NotFound(what) => DomainError::NotFound(what),
            StoreError::Rejected(err) => err,
            StoreError::Backend(msg) => DomainError::Internal(msg),
        }
    }
}

/// Product rows, addressed by id or slug.
#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    async fn find_product(&self, product: &ProductRef) -> StoreResult<Option<Product>>;

    /// All products ordered by id.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    /// One page of published products matching `query`, ordered by id.
    async fn search_published(&self, query: &ProductQuery) -> StoreResult<ProductPage>;

    /// Store a new product at version 1. A taken slug is `Duplicate`.
    async fn insert_product(&self, new: NewProduct, now: DateTime<Utc>) -> StoreResult<Product>;

    /// Conditional write of every mutable column. Returns the stored row with
    /// its bumped version.
    async fn save_product(&self, product: &Product, expected: ExpectedVersion) -> StoreResult<Product>;
}

/// Orders are created only together with their stock decrement.
#[async_trait::async_trait]
pub trait OrderLedger: Send + Sync {
    /// Atomically: decrement the product's stock by `order.quantity`, insert
    /// the order, insert its single item. The decrement only happens while the
    /// product is published, still holds at least `order.quantity` units and
    /// still sells at `order.unit_price`.
    ///
    /// Any failed guard is reported as `VersionConflict`; nothing is written.
    async fn commit_checkout(&self, order: NewOrder) -> StoreResult<(Order, OrderItem)>;

    async fn find_order(&self, order_id: OrderId) -> StoreResult<Option<(Order, OrderItem)>>;
}

/// Waitlist subscriptions. At most one entry per `(product_id, lower(email))`.
#[async_trait::async_trait]
pub trait WaitlistLedger: Send + Sync {
    async fn waitlist_exists(&self, product_id: ProductId, email_key: &str) -> StoreResult<bool>;

    /// A second entry for the same key is `Duplicate`.
    async fn insert_waitlist_entry(&self, entry: NewWaitlistEntry) -> StoreResult<WaitlistEntry>;

    /// Entries with no `notified_at`, oldest first.
    async fn find_pending_waitlist(&self, product_id: ProductId) -> StoreResult<Vec<WaitlistEntry>>;

    /// Persist delivery bookkeeping. A stored `notified_at` is never cleared or
    /// overwritten.
    async fn save_waitlist_entry(&self, entry: &WaitlistEntry) -> StoreResult<()>;

    async fn list_waitlist(&self, product_id: ProductId) -> StoreResult<Vec<WaitlistEntry>>;
}

/// Everything the storefront engines need from one backend.
pub trait StorefrontStore: InventoryStore + OrderLedger + WaitlistLedger {}

impl<S> StorefrontStore for S where S: InventoryStore + OrderLedger + WaitlistLedger + ?Sized {}

/// Shared handle used by the engines.
pub type SharedStore = Arc<dyn StorefrontStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_keep_their_domain_meaning() {
        assert!(matches!(
            DomainError::from(StoreError::Duplicate("slug".into())),
            DomainError::Conflict(_)
        ));
        assert!(matches!(
            DomainError::from(StoreError::NotFound("product".into())),
            DomainError::NotFound(_)
        ));
        assert!(matches!(
            DomainError::from(StoreError::Backend("down".into())),
            DomainError::Internal(_)
        ));

        let rejected = DomainError::invalid_field("Invalid product", "slug", "bad");
        assert_eq!(DomainError::from(StoreError::Rejected(rejected.clone())), rejected);
    }
}
