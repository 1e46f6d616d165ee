//! Public catalog search: free-text filter plus page/size paging.

use serde::Serialize;

use crate::product::Product;

/// Page size when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 12;
/// Larger requests are capped to this.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Which slice of the published catalog to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Lower-cased search text. `None` matches every product.
    pub text: Option<String>,
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            text: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ProductQuery {
    /// Blank text is ignored; size is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(text: Option<&str>, page: Option<u32>, size: Option<u32>) -> Self {
        Self {
            text: text
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_lowercase),
            page: page.unwrap_or(0),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of matching products that precede this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Case-insensitive substring match over name and both descriptions.
    pub fn matches(&self, product: &Product) -> bool {
        let Some(text) = self.text.as_deref() else {
            return true;
        };
        let contains = |field: &str| field.to_lowercase().contains(text);
        contains(product.name.as_str())
            || product.short_desc.as_deref().is_some_and(contains)
            || product.long_desc.as_deref().is_some_and(contains)
    }
}

/// One page of search results with the totals a client needs to page on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage<T = Product> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> ProductPage<T> {
    pub fn new(items: Vec<T>, query: &ProductQuery, total_items: u64) -> Self {
        Self {
            items,
            page: query.page,
            size: query.size,
            total_items,
            total_pages: total_items.div_ceil(u64::from(query.size)),
        }
    }

    /// Convert the items, keeping the paging totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ProductPage<U> {
        ProductPage {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use storefront_core::ProductId;

    use super::*;
    use crate::product::NewProduct;

    fn product(name: &str, short_desc: Option<&str>, long_desc: Option<&str>) -> Product {
        let new = NewProduct {
            slug: "print".into(),
            name: name.into(),
            short_desc: short_desc.map(Into::into),
            long_desc: long_desc.map(Into::into),
            price_cents: 4500,
            ..NewProduct::default()
        };
        Product::create(ProductId::new(1), new, Utc::now()).unwrap()
    }

    #[test]
    fn defaults_to_first_page_of_twelve() {
        let query = ProductQuery::new(None, None, None);
        assert_eq!(query, ProductQuery::default());
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn size_is_clamped_and_blank_text_ignored() {
        assert_eq!(ProductQuery::new(None, None, Some(0)).size, 1);
        assert_eq!(ProductQuery::new(None, None, Some(5000)).size, MAX_PAGE_SIZE);
        assert_eq!(ProductQuery::new(Some("   "), None, None).text, None);
        assert_eq!(ProductQuery::new(None, Some(3), Some(10)).offset(), 30);
    }

    #[test]
    fn text_matches_any_field_ignoring_case() {
        let query = ProductQuery::new(Some("SUNSET"), None, None);
        assert!(query.matches(&product("Sunset Print", None, None)));
        assert!(query.matches(&product("Print", Some("a warm sunset"), None)));
        assert!(query.matches(&product("Print", None, Some("Shot at sunset in Lisbon"))));
        assert!(!query.matches(&product("Harbour Print", Some("blue"), Some("morning"))));
    }

    #[test]
    fn total_pages_round_up() {
        let query = ProductQuery::new(None, Some(0), Some(12));
        let page = ProductPage::<Product>::new(Vec::new(), &query, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(ProductPage::<Product>::new(Vec::new(), &query, 0).total_pages, 0);
    }
}
