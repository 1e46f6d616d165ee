//! Products domain module.
//!
//! Catalog records, admin create/patch rules, public search paging and the
//! restock transition rule, implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;
pub mod query;
pub mod restock;

pub use product::{NewProduct, Product, ProductPatch, ProductRef};
pub use query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, ProductPage, ProductQuery};
pub use restock::{ProductSnapshot, RestockTrigger, detect_restock};
