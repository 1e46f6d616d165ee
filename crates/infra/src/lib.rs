//! Infrastructure layer: storage backends, the checkout/waitlist/restock
//! engines, notification channels, configuration.

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod notify;
pub mod payments;
pub mod restock;
pub mod store;
pub mod waitlist;

mod storefront;

pub use storefront::Storefront;
