//! Stock waitlist domain module.
//!
//! Subscriptions of shoppers to out-of-stock products, and the one-way
//! pending -> notified lifecycle of each subscription (no IO, no storage).

pub mod entry;

pub use entry::{NewWaitlistEntry, WaitlistAddStatus, WaitlistEntry, WaitlistState};
