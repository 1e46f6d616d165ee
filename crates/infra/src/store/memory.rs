use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use storefront_core::{Entity, ExpectedVersion, OrderId, OrderItemId, ProductId, WaitlistEntryId};
use storefront_products::{NewProduct, Product, ProductPage, ProductQuery, ProductRef};
use storefront_sales::{NewOrder, Order, OrderItem};
use storefront_waitlist::{NewWaitlistEntry, WaitlistEntry};

use super::{InventoryStore, OrderLedger, StoreError, StoreResult, WaitlistLedger};

/// Rows of one entity type plus the id sequence that feeds them.
#[derive(Debug)]
struct Table<E: Entity> {
    rows: BTreeMap<E::Id, E>,
    last_id: i64,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<E> Table<E>
where
    E: Entity + Clone,
    E::Id: From<i64>,
{
    fn next_id(&mut self) -> E::Id {
        self.last_id += 1;
        E::Id::from(self.last_id)
    }

    fn insert(&mut self, row: E) {
        self.rows.insert(row.id(), row);
    }

    fn get(&self, id: E::Id) -> Option<&E> {
        self.rows.get(&id)
    }

    fn all(&self) -> impl Iterator<Item = &E> {
        self.rows.values()
    }
}

#[derive(Debug, Default)]
struct State {
    products: Table<Product>,
    slugs: BTreeMap<String, ProductId>,
    orders: Table<Order>,
    items: Table<OrderItem>,
    // Order id -> its single item.
    item_by_order: BTreeMap<OrderId, OrderItemId>,
    waitlist: Table<WaitlistEntry>,
}

impl State {
    fn product(&self, product: &ProductRef) -> Option<&Product> {
        match product {
            ProductRef::ById(id) => self.products.get(*id),
            ProductRef::BySlug(slug) => self
                .slugs
                .get(slug)
                .and_then(|id| self.products.get(*id)),
        }
    }
}

/// In-memory storefront backend.
///
/// All tables live behind one `RwLock`, so every write (including the whole
/// checkout commit) is a single critical section. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStorefront {
    state: RwLock<State>,
}

impl InMemoryStorefront {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    /// Number of stored orders.
    pub fn order_count(&self) -> usize {
        self.read().map(|s| s.orders.rows.len()).unwrap_or(0)
    }

    /// Number of stored order items.
    pub fn order_item_count(&self) -> usize {
        self.read().map(|s| s.items.rows.len()).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl InventoryStore for InMemoryStorefront {
    async fn find_product(&self, product: &ProductRef) -> StoreResult<Option<Product>> {
        Ok(self.read()?.product(product).cloned())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.read()?.products.all().cloned().collect())
    }

    async fn search_published(&self, query: &ProductQuery) -> StoreResult<ProductPage> {
        let state = self.read()?;
        let matching: Vec<&Product> = state
            .products
            .all()
            .filter(|p| p.published && query.matches(p))
            .collect();
        let total = matching.len() as u64;
        let skip = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(skip)
            .take(query.size as usize)
            .cloned()
            .collect();
        Ok(ProductPage::new(items, query, total))
    }

    async fn insert_product(&self, new: NewProduct, now: DateTime<Utc>) -> StoreResult<Product> {
        let mut state = self.write()?;
        let slug = new.slug.trim().to_string();
        if state.slugs.contains_key(&slug) {
            return Err(StoreError::Duplicate(format!("product slug '{slug}' already exists")));
        }

        // Build before consuming an id so a rejected product leaves no gap.
        let mut product = Product::create(ProductId::new(0), new, now)?;
        product.id = state.products.next_id();
        state.slugs.insert(product.slug.clone(), product.id);
        state.products.insert(product.clone());
        Ok(product)
    }

    async fn save_product(&self, product: &Product, expected: ExpectedVersion) -> StoreResult<Product> {
        let mut state = self.write()?;
        let current = state
            .products
            .get(product.id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", product.id)))?;

        if !expected.matches(current.version) {
            return Err(StoreError::VersionConflict(format!(
                "product {}: expected version {}, found {}",
                product.id,
                expected.get(),
                current.version
            )));
        }

        let mut stored = product.clone();
        // Slugs are immutable after creation.
        stored.slug = current.slug.clone();
        stored.created_at = current.created_at;
        stored.version = current.version + 1;
        state.products.insert(stored.clone());
        Ok(stored)
    }
}

#[async_trait::async_trait]
impl OrderLedger for InMemoryStorefront {
    async fn commit_checkout(&self, order: NewOrder) -> StoreResult<(Order, OrderItem)> {
        let mut state = self.write()?;
        let product_id = order.product_id;

        let mut product = state
            .products
            .get(product_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("product {product_id}")))?;

        if !product.published || product.price != order.unit_price {
            return Err(StoreError::VersionConflict(format!(
                "product {product_id}: price or availability changed since it was read"
            )));
        }
        if product.take_stock(order.quantity).is_err() {
            return Err(StoreError::VersionConflict(format!(
                "product {product_id}: stock changed below {}",
                order.quantity
            )));
        }
        product.version += 1;
        product.updated_at = order.created_at;

        let order_id = state.orders.next_id();
        let item_id = state.items.next_id();
        let (order, item) = order.into_records(order_id, item_id);

        state.products.insert(product);
        state.orders.insert(order.clone());
        state.items.insert(item.clone());
        state.item_by_order.insert(order_id, item_id);
        Ok((order, item))
    }

    async fn find_order(&self, order_id: OrderId) -> StoreResult<Option<(Order, OrderItem)>> {
        let state = self.read()?;
        let Some(order) = state.orders.get(order_id) else {
            return Ok(None);
        };
        let item = state
            .item_by_order
            .get(&order_id)
            .and_then(|item_id| state.items.get(*item_id))
            .ok_or_else(|| StoreError::Backend(format!("order {order_id} has no item")))?;
        Ok(Some((order.clone(), item.clone())))
    }
}

#[async_trait::async_trait]
impl WaitlistLedger for InMemoryStorefront {
    async fn waitlist_exists(&self, product_id: ProductId, email_key: &str) -> StoreResult<bool> {
        Ok(self
            .read()?
            .waitlist
            .all()
            .any(|e| e.product_id == product_id && e.email_key() == email_key))
    }

    async fn insert_waitlist_entry(&self, entry: NewWaitlistEntry) -> StoreResult<WaitlistEntry> {
        let mut state = self.write()?;
        let key = entry.email_key();
        if state
            .waitlist
            .all()
            .any(|e| e.product_id == entry.product_id && e.email_key() == key)
        {
            return Err(StoreError::Duplicate(format!(
                "waitlist entry for product {} and {key}",
                entry.product_id
            )));
        }

        let id: WaitlistEntryId = state.waitlist.next_id();
        let stored = entry.into_entry(id);
        state.waitlist.insert(stored.clone());
        Ok(stored)
    }

    async fn find_pending_waitlist(&self, product_id: ProductId) -> StoreResult<Vec<WaitlistEntry>> {
        Ok(self
            .read()?
            .waitlist
            .all()
            .filter(|e| e.product_id == product_id && e.is_pending())
            .cloned()
            .collect())
    }

    async fn save_waitlist_entry(&self, entry: &WaitlistEntry) -> StoreResult<()> {
        let mut state = self.write()?;
        let current = state
            .waitlist
            .rows
            .get_mut(&entry.id)
            .ok_or_else(|| StoreError::NotFound(format!("waitlist entry {}", entry.id)))?;

        current.notified_at = current.notified_at.or(entry.notified_at);
        current.failed_attempts = entry.failed_attempts;
        current.last_attempt_at = entry.last_attempt_at;
        Ok(())
    }

    async fn list_waitlist(&self, product_id: ProductId) -> StoreResult<Vec<WaitlistEntry>> {
        Ok(self
            .read()?
            .waitlist
            .all()
            .filter(|e| e.product_id == product_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{EmailAddress, Money};

    fn sunset_print() -> NewProduct {
        NewProduct {
            slug: "sunset-print".to_string(),
            name: "Sunset Print".to_string(),
            price_cents: 4500,
            quantity: Some(2),
            published: Some(true),
            ..NewProduct::default()
        }
    }

    fn order_for(product: &Product, qty: u32) -> NewOrder {
        let email = EmailAddress::parse("user@example.com").unwrap();
        NewOrder::price(product.id, &product.price, qty, email, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_rejects_duplicate_slugs() {
        let store = InMemoryStorefront::new();
        let first = store.insert_product(sunset_print(), Utc::now()).await.unwrap();
        assert_eq!(first.id, ProductId::new(1));
        assert_eq!(first.version, 1);

        let err = store.insert_product(sunset_print(), Utc::now()).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        let by_slug = store
            .find_product(&ProductRef::BySlug("sunset-print".into()))
            .await
            .unwrap();
        assert_eq!(by_slug, Some(first));
    }

    #[tokio::test]
    async fn search_pages_through_published_matches_only() {
        let store = InMemoryStorefront::new();
        for (slug, name, published) in [
            ("sunset-one", "Sunset One", true),
            ("harbour", "Harbour", true),
            ("sunset-two", "Sunset Two", true),
            ("sunset-draft", "Sunset Draft", false),
            ("sunset-three", "Sunset Three", true),
        ] {
            let new = NewProduct {
                slug: slug.to_string(),
                name: name.to_string(),
                published: Some(published),
                ..sunset_print()
            };
            store.insert_product(new, Utc::now()).await.unwrap();
        }

        let first = store
            .search_published(&ProductQuery::new(Some("sunset"), Some(0), Some(2)))
            .await
            .unwrap();
        let slugs: Vec<_> = first.items.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["sunset-one", "sunset-two"]);
        assert_eq!((first.total_items, first.total_pages), (3, 2));

        let second = store
            .search_published(&ProductQuery::new(Some("sunset"), Some(1), Some(2)))
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].slug, "sunset-three");

        let beyond = store
            .search_published(&ProductQuery::new(None, Some(9), None))
            .await
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_items, 4);
    }

    #[tokio::test]
    async fn save_requires_the_observed_version() {
        let store = InMemoryStorefront::new();
        let mut product = store.insert_product(sunset_print(), Utc::now()).await.unwrap();
        product.quantity = 7;

        let saved = store.save_product(&product, ExpectedVersion::exact(1)).await.unwrap();
        assert_eq!(saved.version, 2);

        let err = store.save_product(&product, ExpectedVersion::exact(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict(_)));
    }

    #[tokio::test]
    async fn checkout_commit_writes_everything_or_nothing() {
        let store = InMemoryStorefront::new();
        let product = store.insert_product(sunset_print(), Utc::now()).await.unwrap();

        let (order, item) = store.commit_checkout(order_for(&product, 2)).await.unwrap();
        assert_eq!(order.total, Money::new(9000, "EUR"));
        assert_eq!(item.order_id, order.id);

        // Sold out since the read: nothing changes.
        let err = store.commit_checkout(order_for(&product, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict(_)));
        assert_eq!(store.order_count(), 1);
        assert_eq!(store.order_item_count(), 1);

        let stored = store.find_product(&ProductRef::ById(product.id)).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 0);
        assert_eq!(stored.version, 2);

        let found = store.find_order(order.id).await.unwrap();
        assert_eq!(found, Some((order, item)));
    }

    #[tokio::test]
    async fn checkout_commit_ignores_unrelated_version_bumps() {
        let mut new = sunset_print();
        new.quantity = Some(10);
        let store = InMemoryStorefront::new();
        let product = store.insert_product(new, Utc::now()).await.unwrap();

        // Priced at version 1; another sale and a description edit land first.
        let priced = order_for(&product, 1);
        store.commit_checkout(order_for(&product, 1)).await.unwrap();
        let mut edited = store.find_product(&ProductRef::ById(product.id)).await.unwrap().unwrap();
        edited.short_desc = Some("Limited run".to_string());
        store
            .save_product(&edited, ExpectedVersion::exact(edited.version))
            .await
            .unwrap();

        store.commit_checkout(priced).await.unwrap();
        let stored = store.find_product(&ProductRef::ById(product.id)).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 8);
        assert_eq!(stored.version, 4);
    }

    #[tokio::test]
    async fn checkout_commit_refuses_a_changed_price_or_unpublished_product() {
        let store = InMemoryStorefront::new();
        let product = store.insert_product(sunset_print(), Utc::now()).await.unwrap();
        let priced = order_for(&product, 1);

        let mut repriced = product.clone();
        repriced.price = Money::new(5000, "EUR");
        let repriced = store
            .save_product(&repriced, ExpectedVersion::exact(1))
            .await
            .unwrap();
        let err = store.commit_checkout(priced).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict(_)));

        let mut hidden = repriced.clone();
        hidden.published = false;
        store
            .save_product(&hidden, ExpectedVersion::exact(repriced.version))
            .await
            .unwrap();
        let err = store.commit_checkout(order_for(&repriced, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict(_)));
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn notified_at_is_never_cleared() {
        let store = InMemoryStorefront::new();
        let email = EmailAddress::parse("A@B.com").unwrap();
        let mut entry = store
            .insert_waitlist_entry(NewWaitlistEntry::new(ProductId::new(1), email.clone(), Utc::now()))
            .await
            .unwrap();

        let dup = store
            .insert_waitlist_entry(NewWaitlistEntry::new(
                ProductId::new(1),
                EmailAddress::parse("a@b.com").unwrap(),
                Utc::now(),
            ))
            .await
            .unwrap_err();
        assert!(matches!(dup, StoreError::Duplicate(_)));

        let stale = entry.clone();
        entry.mark_notified(Utc::now());
        store.save_waitlist_entry(&entry).await.unwrap();
        store.save_waitlist_entry(&stale).await.unwrap();

        assert!(store.find_pending_waitlist(ProductId::new(1)).await.unwrap().is_empty());
        assert!(store.waitlist_exists(ProductId::new(1), "a@b.com").await.unwrap());
    }
}
