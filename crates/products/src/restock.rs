//! Restock transition rule.
//!
//! Decides, from two immutable snapshots of a product, whether it just went from
//! unavailable to available. Waitlisted shoppers are only ever told about such a
//! transition; stock moving between two positive values is not news to anyone
//! on the waitlist.

use serde::{Deserialize, Serialize};

/// The availability-relevant part of a product's state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub quantity: u32,
    pub published: bool,
}

/// Why a transition counts as a restock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestockTrigger {
    /// Quantity went from zero to positive.
    StockReplenished,
    /// Product became published while holding stock.
    PublishedWithStock,
}

impl RestockTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            RestockTrigger::StockReplenished => "stock_replenished",
            RestockTrigger::PublishedWithStock => "published_with_stock",
        }
    }
}

/// `Some(trigger)` iff `previous -> current` is a restock transition.
pub fn detect_restock(previous: ProductSnapshot, current: ProductSnapshot) -> Option<RestockTrigger> {
    if current.quantity == 0 {
        return None;
    }
    if previous.quantity == 0 {
        return Some(RestockTrigger::StockReplenished);
    }
    if !previous.published && current.published {
        return Some(RestockTrigger::PublishedWithStock);
    }
    None
}
