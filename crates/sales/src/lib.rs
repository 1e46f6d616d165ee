//! Sales domain module: single-item orders.
//!
//! This crate contains business rules for checkout requests and orders,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod checkout;
pub mod order;

pub use checkout::{CheckoutRequest, ValidCheckout};
pub use order::{NewOrder, Order, OrderConfirmation, OrderItem, OrderStatus};
