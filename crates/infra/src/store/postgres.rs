//! Postgres-backed storefront store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Duplicate` | Taken slug, second waitlist entry for the same email |
//! | Database (check violation) | `23514` | `VersionConflict` | Stock would go negative |
//! | Database (other) | Any other | `Backend` | |
//! | Other | N/A | `Backend` | Pool closed, network errors |
//!
//! ## Checkout
//!
//! The checkout commit runs in one transaction. The stock decrement is a single
//! conditional `UPDATE ... WHERE quantity >= $qty AND price_cents = $price ...`
//! guarded by what the order was priced from. If it touches no row the
//! transaction is rolled back and the caller re-reads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use storefront_core::{ExpectedVersion, Money, OrderId, OrderItemId, ProductId, WaitlistEntryId};
use storefront_products::{NewProduct, Product, ProductPage, ProductQuery, ProductRef};
use storefront_sales::{NewOrder, Order, OrderItem, OrderStatus};
use storefront_waitlist::{NewWaitlistEntry, WaitlistEntry};

use super::{InventoryStore, OrderLedger, StoreError, StoreResult, WaitlistLedger};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS product (
    id            BIGSERIAL PRIMARY KEY,
    slug          TEXT NOT NULL UNIQUE,
    name          TEXT NOT NULL,
    short_desc    TEXT,
    long_desc     TEXT,
    price_cents   BIGINT NOT NULL CHECK (price_cents >= 0),
    currency      CHAR(3) NOT NULL,
    quantity      BIGINT NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    is_published  BOOLEAN NOT NULL DEFAULT FALSE,
    version       BIGINT NOT NULL DEFAULT 1,
    created_at    TIMESTAMPTZ NOT NULL,
    updated_at    TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    id            BIGSERIAL PRIMARY KEY,
    email         TEXT NOT NULL,
    total_cents   BIGINT NOT NULL CHECK (total_cents >= 0),
    currency      CHAR(3) NOT NULL,
    status        TEXT NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS order_item (
    id               BIGSERIAL PRIMARY KEY,
    order_id         BIGINT NOT NULL UNIQUE REFERENCES orders(id),
    product_id       BIGINT NOT NULL REFERENCES product(id),
    qty              BIGINT NOT NULL CHECK (qty > 0),
    unit_price_cents BIGINT NOT NULL CHECK (unit_price_cents >= 0)
);

CREATE TABLE IF NOT EXISTS stock_waitlist (
    id              BIGSERIAL PRIMARY KEY,
    product_id      BIGINT NOT NULL REFERENCES product(id),
    email           TEXT NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL,
    notified_at     TIMESTAMPTZ,
    failed_attempts INTEGER NOT NULL DEFAULT 0,
    last_attempt_at TIMESTAMPTZ
);

CREATE UNIQUE INDEX IF NOT EXISTS stock_waitlist_product_email_uq
    ON stock_waitlist (product_id, lower(email));

CREATE INDEX IF NOT EXISTS stock_waitlist_pending_idx
    ON stock_waitlist (product_id) WHERE notified_at IS NULL;
"#;

const PRODUCT_COLUMNS: &str = "id, slug, name, short_desc, long_desc, price_cents, currency, \
     quantity, is_published, version, created_at, updated_at";

// `$1` is an ILIKE pattern or NULL for no text filter.
const PUBLISHED_MATCH: &str = "is_published AND ($1::text IS NULL \
     OR name ILIKE $1 OR short_desc ILIKE $1 OR long_desc ILIKE $1)";

const WAITLIST_COLUMNS: &str =
    "id, product_id, email, created_at, notified_at, failed_attempts, last_attempt_at";

/// Postgres implementation of every storefront storage trait.
#[derive(Debug, Clone)]
pub struct PgStorefront {
    pool: Arc<PgPool>,
}

impl PgStorefront {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl InventoryStore for PgStorefront {
    #[instrument(skip(self), fields(product = %product), err)]
    async fn find_product(&self, product: &ProductRef) -> StoreResult<Option<Product>> {
        let row = match product {
            ProductRef::ById(id) => {
                sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"))
                    .bind(id.get())
                    .fetch_optional(&*self.pool)
                    .await
            }
            ProductRef::BySlug(slug) => {
                sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE slug = $1"))
                    .bind(slug)
                    .fetch_optional(&*self.pool)
                    .await
            }
        }
        .map_err(|e| map_sqlx_error("find_product", e))?;

        row.map(|r| ProductRow::from_row(&r).map_err(|e| map_sqlx_error("decode_product", e)))
            .transpose()?
            .map(Product::try_from)
            .transpose()
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY id"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;

        decode_products(&rows)
    }

    #[instrument(skip(self), fields(page = query.page, size = query.size), err)]
    async fn search_published(&self, query: &ProductQuery) -> StoreResult<ProductPage> {
        let pattern = query.text.as_deref().map(like_pattern);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM product WHERE {PUBLISHED_MATCH}"
        ))
        .bind(&pattern)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_published", e))?;

        let offset = i64::try_from(query.offset())
            .map_err(|_| StoreError::Backend(format!("offset {} exceeds BIGINT", query.offset())))?;
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE {PUBLISHED_MATCH} ORDER BY id LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(i64::from(query.size))
        .bind(offset)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("search_published", e))?;

        let items = decode_products(&rows)?;
        Ok(ProductPage::new(items, query, non_negative(total, "count")?))
    }

    #[instrument(skip(self, new), fields(slug = %new.slug), err)]
    async fn insert_product(&self, new: NewProduct, now: DateTime<Utc>) -> StoreResult<Product> {
        // The sequence assigns the real id.
        let mut product = Product::create(ProductId::new(0), new, now)?;

        let row = sqlx::query(
            r#"
            INSERT INTO product (
                slug, name, short_desc, long_desc, price_cents, currency,
                quantity, is_published, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&product.slug)
        .bind(&product.name)
        .bind(&product.short_desc)
        .bind(&product.long_desc)
        .bind(cents_to_db(product.price.cents)?)
        .bind(&product.price.currency)
        .bind(quantity_to_db(product.quantity))
        .bind(product.published)
        .bind(version_to_db(product.version)?)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate(format!("product slug '{}' already exists", product.slug))
            } else {
                map_sqlx_error("insert_product", e)
            }
        })?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("insert_product", e))?;
        product.id = ProductId::new(id);
        Ok(product)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn save_product(&self, product: &Product, expected: ExpectedVersion) -> StoreResult<Product> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE product
            SET name = $3, short_desc = $4, long_desc = $5, price_cents = $6,
                currency = $7, quantity = $8, is_published = $9,
                version = version + 1, updated_at = $10
            WHERE id = $1 AND version = $2
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.id.get())
        .bind(version_to_db(expected.get())?)
        .bind(&product.name)
        .bind(&product.short_desc)
        .bind(&product.long_desc)
        .bind(cents_to_db(product.price.cents)?)
        .bind(&product.price.currency)
        .bind(quantity_to_db(product.quantity))
        .bind(product.published)
        .bind(product.updated_at)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_product", e))?;

        match row {
            Some(row) => ProductRow::from_row(&row)
                .map_err(|e| map_sqlx_error("decode_product", e))
                .and_then(Product::try_from),
            None => Err(StoreError::VersionConflict(format!(
                "product {}: expected version {} no longer current",
                product.id,
                expected.get()
            ))),
        }
    }
}

#[async_trait::async_trait]
impl OrderLedger for PgStorefront {
    #[instrument(
        skip(self, order),
        fields(product_id = %order.product_id, qty = order.quantity),
        err
    )]
    async fn commit_checkout(&self, order: NewOrder) -> StoreResult<(Order, OrderItem)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let decremented = sqlx::query(
            r#"
            UPDATE product
            SET quantity = quantity - $2, version = version + 1, updated_at = $5
            WHERE id = $1
              AND is_published
              AND quantity >= $2
              AND price_cents = $3
              AND currency = $4
            "#,
        )
        .bind(order.product_id.get())
        .bind(quantity_to_db(order.quantity))
        .bind(cents_to_db(order.unit_price.cents)?)
        .bind(&order.unit_price.currency)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("decrement_stock", e))?;

        if decremented.rows_affected() != 1 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::VersionConflict(format!(
                "product {}: stock, price or availability changed since it was read",
                order.product_id
            )));
        }

        let order_row = sqlx::query(
            r#"
            INSERT INTO orders (email, total_cents, currency, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(order.email.as_str())
        .bind(cents_to_db(order.total.cents)?)
        .bind(&order.total.currency)
        .bind(OrderStatus::Pending.as_str())
        .bind(order.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;
        let order_id: i64 = order_row
            .try_get("id")
            .map_err(|e| map_sqlx_error("insert_order", e))?;

        let item_row = sqlx::query(
            r#"
            INSERT INTO order_item (order_id, product_id, qty, unit_price_cents)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(order_id)
        .bind(order.product_id.get())
        .bind(quantity_to_db(order.quantity))
        .bind(cents_to_db(order.unit_price.cents)?)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order_item", e))?;
        let item_id: i64 = item_row
            .try_get("id")
            .map_err(|e| map_sqlx_error("insert_order_item", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(order.into_records(OrderId::new(order_id), OrderItemId::new(item_id)))
    }

    async fn find_order(&self, order_id: OrderId) -> StoreResult<Option<(Order, OrderItem)>> {
        let row = sqlx::query(
            r#"
            SELECT o.id, o.email, o.total_cents, o.currency, o.status, o.created_at,
                   i.id AS item_id, i.product_id, i.qty, i.unit_price_cents
            FROM orders o
            JOIN order_item i ON i.order_id = o.id
            WHERE o.id = $1
            "#,
        )
        .bind(order_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_order", e))?;

        row.map(|r| {
            OrderRow::from_row(&r)
                .map_err(|e| map_sqlx_error("decode_order", e))
                .and_then(OrderRow::into_records)
        })
        .transpose()
    }
}

#[async_trait::async_trait]
impl WaitlistLedger for PgStorefront {
    async fn waitlist_exists(&self, product_id: ProductId, email_key: &str) -> StoreResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM stock_waitlist WHERE product_id = $1 AND lower(email) = $2) AS present",
        )
        .bind(product_id.get())
        .bind(email_key)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("waitlist_exists", e))?;

        row.try_get("present")
            .map_err(|e| map_sqlx_error("waitlist_exists", e))
    }

    #[instrument(skip(self, entry), fields(product_id = %entry.product_id), err)]
    async fn insert_waitlist_entry(&self, entry: NewWaitlistEntry) -> StoreResult<WaitlistEntry> {
        let row = sqlx::query(
            r#"
            INSERT INTO stock_waitlist (product_id, email, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(entry.product_id.get())
        .bind(entry.email.as_str())
        .bind(entry.created_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate(format!(
                    "waitlist entry for product {} and {}",
                    entry.product_id,
                    entry.email_key()
                ))
            } else {
                map_sqlx_error("insert_waitlist_entry", e)
            }
        })?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("insert_waitlist_entry", e))?;
        Ok(entry.into_entry(WaitlistEntryId::new(id)))
    }

    async fn find_pending_waitlist(&self, product_id: ProductId) -> StoreResult<Vec<WaitlistEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {WAITLIST_COLUMNS} FROM stock_waitlist \
             WHERE product_id = $1 AND notified_at IS NULL ORDER BY id"
        ))
        .bind(product_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_pending_waitlist", e))?;

        decode_waitlist(&rows)
    }

    async fn save_waitlist_entry(&self, entry: &WaitlistEntry) -> StoreResult<()> {
        let failed_attempts = i32::try_from(entry.failed_attempts).unwrap_or(i32::MAX);
        let updated = sqlx::query(
            r#"
            UPDATE stock_waitlist
            SET notified_at = COALESCE(notified_at, $2),
                failed_attempts = $3,
                last_attempt_at = $4
            WHERE id = $1
            "#,
        )
        .bind(entry.id.get())
        .bind(entry.notified_at)
        .bind(failed_attempts)
        .bind(entry.last_attempt_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_waitlist_entry", e))?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("waitlist entry {}", entry.id)));
        }
        Ok(())
    }

    async fn list_waitlist(&self, product_id: ProductId) -> StoreResult<Vec<WaitlistEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {WAITLIST_COLUMNS} FROM stock_waitlist WHERE product_id = $1 ORDER BY id"
        ))
        .bind(product_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_waitlist", e))?;

        decode_waitlist(&rows)
    }
}

fn decode_waitlist(rows: &[PgRow]) -> StoreResult<Vec<WaitlistEntry>> {
    rows.iter()
        .map(|r| {
            WaitlistRow::from_row(r)
                .map_err(|e| map_sqlx_error("decode_waitlist", e))
                .map(WaitlistEntry::from)
        })
        .collect()
}

fn decode_products(rows: &[PgRow]) -> StoreResult<Vec<Product>> {
    rows.iter()
        .map(|r| {
            ProductRow::from_row(r)
                .map_err(|e| map_sqlx_error("decode_product", e))
                .and_then(Product::try_from)
        })
        .collect()
}

/// `%text%` for ILIKE, with the wildcard characters in `text` taken literally.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn cents_to_db(cents: u64) -> StoreResult<i64> {
    i64::try_from(cents).map_err(|_| StoreError::Backend(format!("amount {cents} exceeds BIGINT")))
}

// Quantity columns are BIGINT, so every `u32` fits.
fn quantity_to_db(quantity: u32) -> i64 {
    i64::from(quantity)
}

fn version_to_db(version: u64) -> StoreResult<i64> {
    i64::try_from(version).map_err(|_| StoreError::Backend(format!("version {version} exceeds BIGINT")))
}

fn non_negative<T: TryFrom<i64>>(value: i64, column: &str) -> StoreResult<T> {
    T::try_from(value).map_err(|_| StoreError::Backend(format!("column {column} holds {value}")))
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(msg),
                Some("23514") => StoreError::VersionConflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Check if an error is a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: i64,
    slug: String,
    name: String,
    short_desc: Option<String>,
    long_desc: Option<String>,
    price_cents: i64,
    currency: String,
    quantity: i64,
    is_published: bool,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            slug: row.try_get("slug")?,
            name: row.try_get("name")?,
            short_desc: row.try_get("short_desc")?,
            long_desc: row.try_get("long_desc")?,
            price_cents: row.try_get("price_cents")?,
            currency: row.try_get("currency")?,
            quantity: row.try_get("quantity")?,
            is_published: row.try_get("is_published")?,
            version: row.try_get("version")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: ProductId::new(row.id),
            slug: row.slug,
            name: row.name,
            short_desc: row.short_desc,
            long_desc: row.long_desc,
            price: Money::new(non_negative(row.price_cents, "price_cents")?, row.currency.trim()),
            quantity: non_negative(row.quantity, "quantity")?,
            published: row.is_published,
            version: non_negative(row.version, "version")?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug)]
struct OrderRow {
    id: i64,
    email: String,
    total_cents: i64,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
    item_id: i64,
    product_id: i64,
    qty: i64,
    unit_price_cents: i64,
}

impl<'r> FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            total_cents: row.try_get("total_cents")?,
            currency: row.try_get("currency")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            item_id: row.try_get("item_id")?,
            product_id: row.try_get("product_id")?,
            qty: row.try_get("qty")?,
            unit_price_cents: row.try_get("unit_price_cents")?,
        })
    }
}

impl OrderRow {
    fn into_records(self) -> StoreResult<(Order, OrderItem)> {
        let status = OrderStatus::parse(&self.status)
            .ok_or_else(|| StoreError::Backend(format!("unknown order status '{}'", self.status)))?;
        let order = Order {
            id: OrderId::new(self.id),
            email: self.email,
            total: Money::new(non_negative(self.total_cents, "total_cents")?, self.currency.trim()),
            status,
            created_at: self.created_at,
        };
        let item = OrderItem {
            id: OrderItemId::new(self.item_id),
            order_id: order.id,
            product_id: ProductId::new(self.product_id),
            quantity: non_negative(self.qty, "qty")?,
            unit_price_cents: non_negative(self.unit_price_cents, "unit_price_cents")?,
        };
        Ok((order, item))
    }
}

#[derive(Debug)]
struct WaitlistRow {
    id: i64,
    product_id: i64,
    email: String,
    created_at: DateTime<Utc>,
    notified_at: Option<DateTime<Utc>>,
    failed_attempts: i32,
    last_attempt_at: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, PgRow> for WaitlistRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            notified_at: row.try_get("notified_at")?,
            failed_attempts: row.try_get("failed_attempts")?,
            last_attempt_at: row.try_get("last_attempt_at")?,
        })
    }
}

impl From<WaitlistRow> for WaitlistEntry {
    fn from(row: WaitlistRow) -> Self {
        WaitlistEntry {
            id: WaitlistEntryId::new(row.id),
            product_id: ProductId::new(row.product_id),
            email: row.email,
            created_at: row.created_at,
            notified_at: row.notified_at,
            failed_attempts: u32::try_from(row.failed_attempts).unwrap_or(0),
            last_attempt_at: row.last_attempt_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_text_wildcards_are_literal() {
        assert_eq!(like_pattern("sunset"), "%sunset%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn every_accepted_quantity_and_price_fits_its_column() {
        assert_eq!(quantity_to_db(u32::MAX), 4_294_967_295);
        assert_eq!(cents_to_db(i64::MAX as u64).unwrap(), i64::MAX);
        assert!(cents_to_db(u64::MAX).is_err());
        for column in ["quantity      BIGINT", "qty              BIGINT", "price_cents   BIGINT"] {
            assert!(SCHEMA.contains(column), "{column}");
        }
    }
}
