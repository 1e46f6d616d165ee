//! `storefront-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod email;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod version;

pub use email::EmailAddress;
pub use entity::Entity;
pub use error::{DomainError, DomainResult, FieldErrors};
pub use id::{OrderId, OrderItemId, ProductId, WaitlistEntryId};
pub use money::{normalize_currency, Money, DEFAULT_CURRENCY};
pub use version::ExpectedVersion;
