use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{
    DomainResult, EmailAddress, Entity, Money, OrderId, OrderItemId, ProductId,
};

/// Order status lifecycle.
///
/// Only `Pending` is reachable here; confirmation belongs to the payment flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(OrderStatus::Pending),
            _ => None,
        }
    }
}

/// A placed order. Owns exactly one [`OrderItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub email: String,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> OrderId {
        self.id
    }
}

impl Order {
    pub fn confirmation(&self) -> OrderConfirmation {
        OrderConfirmation {
            order_id: self.id,
            status: self.status,
            total: self.total.format_amount(),
            currency: self.total.currency.clone(),
        }
    }
}

/// The line of an order. The unit price is captured at purchase time, so later
/// catalog price changes never reach past orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price_cents: u64,
}

impl Entity for OrderItem {
    type Id = OrderItemId;

    fn id(&self) -> OrderItemId {
        self.id
    }
}

/// A priced order that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub email: EmailAddress,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
    pub total: Money,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    /// Price a single-item order. Overflow of `unit_price * quantity` is an
    /// internal error.
    pub fn price(
        product_id: ProductId,
        unit_price: &Money,
        quantity: u32,
        email: EmailAddress,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let total = unit_price.checked_times(quantity)?;
        Ok(Self {
            email,
            product_id,
            quantity,
            unit_price: unit_price.clone(),
            total,
            created_at: now,
        })
    }

    /// Materialise the stored records once the store has assigned ids.
    pub fn into_records(self, order_id: OrderId, item_id: OrderItemId) -> (Order, OrderItem) {
        let order = Order {
            id: order_id,
            email: self.email.into_inner(),
            total: self.total,
            status: OrderStatus::Pending,
            created_at: self.created_at,
        };
        let item = OrderItem {
            id: item_id,
            order_id,
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price_cents: self.unit_price.cents,
        };
        (order, item)
    }
}

/// What the shopper gets back from a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub total: String,
    pub currency: String,
}
