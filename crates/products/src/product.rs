use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{
    DEFAULT_CURRENCY, DomainError, DomainResult, Entity, FieldErrors, Money, ProductId,
    normalize_currency,
};

use crate::restock::ProductSnapshot;

/// Catalog product.
///
/// `quantity` is the sole source of truth for availability and is unsigned, so
/// stock can never be represented as negative. `version` is bumped by the store
/// on every successful write and guards concurrent admin edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub short_desc: Option<String>,
    pub long_desc: Option<String>,
    pub price: Money,
    pub quantity: u32,
    pub published: bool,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl Product {
    /// Build the first stored state of a product. The store assigns `id`.
    pub fn create(id: ProductId, new: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        new.validate()?;
        let currency = match new.currency.as_deref() {
            Some(code) => normalize_currency(code)
                .ok_or_else(|| DomainError::invalid_field("Invalid product", "currency", "must be a 3-letter code"))?,
            None => DEFAULT_CURRENCY.to_string(),
        };
        Ok(Self {
            id,
            slug: new.slug.trim().to_string(),
            name: new.name.trim().to_string(),
            short_desc: new.short_desc,
            long_desc: new.long_desc,
            price: Money::new(new.price_cents, currency),
            quantity: new.quantity.unwrap_or(0),
            published: new.published.unwrap_or(false),
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Purchasable iff published and holding stock.
    pub fn is_purchasable(&self) -> bool {
        self.published && self.quantity > 0
    }

    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            quantity: self.quantity,
            published: self.published,
        }
    }

    /// Apply an admin patch. Returns the state observed *before* the patch.
    pub fn apply_patch(&mut self, patch: &ProductPatch, now: DateTime<Utc>) -> DomainResult<ProductSnapshot> {
        patch.validate()?;
        let previous = self.snapshot();

        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(short_desc) = &patch.short_desc {
            self.short_desc = Some(short_desc.clone());
        }
        if let Some(long_desc) = &patch.long_desc {
            self.long_desc = Some(long_desc.clone());
        }
        if let Some(price_cents) = patch.price_cents {
            self.price.cents = price_cents;
        }
        if let Some(currency) = patch.currency.as_deref().and_then(normalize_currency) {
            self.price.currency = currency;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(published) = patch.published {
            self.published = published;
        }
        self.updated_at = now;

        Ok(previous)
    }

    /// Remove `quantity` units; refuses rather than going below zero.
    pub fn take_stock(&mut self, quantity: u32) -> DomainResult<()> {
        self.quantity = self
            .quantity
            .checked_sub(quantity)
            .ok_or(DomainError::InsufficientStock {
                requested: quantity,
                available: self.quantity,
            })?;
        Ok(())
    }
}

/// How a caller names a product: resolved once, before validation continues.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductRef {
    ById(ProductId),
    BySlug(String),
}

impl ProductRef {
    /// Numeric id wins when both are supplied; a blank slug counts as absent.
    pub fn from_parts(id: Option<i64>, slug: Option<&str>) -> Option<Self> {
        match (id, slug.map(str::trim).filter(|s| !s.is_empty())) {
            (Some(id), _) => Some(Self::ById(ProductId::new(id))),
            (None, Some(slug)) => Some(Self::BySlug(slug.to_string())),
            (None, None) => None,
        }
    }
}

impl core::fmt::Display for ProductRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ById(id) => write!(f, "id:{id}"),
            Self::BySlug(slug) => write!(f, "slug:{slug}"),
        }
    }
}

/// Admin input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewProduct {
    pub slug: String,
    pub name: String,
    pub short_desc: Option<String>,
    pub long_desc: Option<String>,
    pub price_cents: u64,
    pub currency: Option<String>,
    pub quantity: Option<u32>,
    pub published: Option<bool>,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = FieldErrors::new();
        if !is_valid_slug(self.slug.trim()) {
            errors.add("slug", "slug must be lowercase letters, digits and single hyphens");
        }
        if self.name.trim().is_empty() {
            errors.add("name", "name cannot be empty");
        }
        if let Some(code) = &self.currency {
            if normalize_currency(code).is_none() {
                errors.add("currency", "must be a 3-letter code");
            }
        }
        errors.finish("Invalid product")
    }
}

/// Admin partial update. `None` leaves a field untouched; slugs are immutable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub short_desc: Option<String>,
    pub long_desc: Option<String>,
    pub price_cents: Option<u64>,
    pub currency: Option<String>,
    pub quantity: Option<u32>,
    pub published: Option<bool>,
}

impl ProductPatch {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = FieldErrors::new();
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            errors.add("name", "name cannot be empty");
        }
        if matches!(&self.currency, Some(code) if normalize_currency(code).is_none()) {
            errors.add("currency", "must be a 3-letter code");
        }
        errors.finish("Invalid product update")
    }
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn sunset_print() -> NewProduct {
        NewProduct {
            slug: "sunset-print".to_string(),
            name: "Sunset Print".to_string(),
            price_cents: 4500,
            quantity: Some(10),
            published: Some(true),
            ..NewProduct::default()
        }
    }

    #[test]
    fn create_applies_defaults() {
        let new = NewProduct {
            slug: "forest-sketch".to_string(),
            name: "Forest Sketch".to_string(),
            price_cents: 1200,
            ..NewProduct::default()
        };
        let product = Product::create(ProductId::new(1), new, test_time()).unwrap();
        assert_eq!(product.price.currency, "EUR");
        assert_eq!(product.quantity, 0);
        assert!(!product.published);
        assert_eq!(product.version, 1);
        assert!(!product.is_purchasable());
    }

    #[test]
    fn create_rejects_bad_slug_and_empty_name() {
        let new = NewProduct {
            slug: "Sunset Print".to_string(),
            name: "  ".to_string(),
            ..NewProduct::default()
        };
        let err = Product::create(ProductId::new(1), new, test_time()).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains_key("slug"));
        assert!(fields.contains_key("name"));
    }

    #[test]
    fn slug_rules() {
        assert!(is_valid_slug("sunset-print-2"));
        assert!(!is_valid_slug("-sunset"));
        assert!(!is_valid_slug("sunset-"));
        assert!(!is_valid_slug("sun--set"));
        assert!(!is_valid_slug("Sunset"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn patch_returns_previous_snapshot() {
        let mut product = Product::create(ProductId::new(1), sunset_print(), test_time()).unwrap();
        let patch = ProductPatch {
            quantity: Some(0),
            published: Some(false),
            currency: Some("usd".to_string()),
            ..ProductPatch::default()
        };
        let previous = product.apply_patch(&patch, test_time()).unwrap();

        assert_eq!(previous, ProductSnapshot { quantity: 10, published: true });
        assert_eq!(product.quantity, 0);
        assert!(!product.published);
        assert_eq!(product.price.currency, "USD");
        assert_eq!(product.slug, "sunset-print");
    }

    #[test]
    fn invalid_patch_leaves_product_untouched() {
        let mut product = Product::create(ProductId::new(1), sunset_print(), test_time()).unwrap();
        let before = product.clone();
        let patch = ProductPatch {
            name: Some(" ".to_string()),
            quantity: Some(3),
            ..ProductPatch::default()
        };
        assert!(product.apply_patch(&patch, test_time()).is_err());
        assert_eq!(product, before);
    }

    #[test]
    fn take_stock_never_goes_negative() {
        let mut product = Product::create(ProductId::new(1), sunset_print(), test_time()).unwrap();
        product.take_stock(4).unwrap();
        assert_eq!(product.quantity, 6);

        let err = product.take_stock(7).unwrap_err();
        assert_eq!(err, DomainError::InsufficientStock { requested: 7, available: 6 });
        assert_eq!(product.quantity, 6);
    }

    #[test]
    fn product_ref_prefers_id_and_ignores_blank_slug() {
        assert_eq!(
            ProductRef::from_parts(Some(3), Some("sunset-print")),
            Some(ProductRef::ById(ProductId::new(3)))
        );
        assert_eq!(
            ProductRef::from_parts(None, Some(" sunset-print ")),
            Some(ProductRef::BySlug("sunset-print".to_string()))
        );
        assert_eq!(ProductRef::from_parts(None, Some("  ")), None);
        assert_eq!(ProductRef::from_parts(None, None), None);
    }
}
