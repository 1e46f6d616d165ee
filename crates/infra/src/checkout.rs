//! Checkout Engine: single-item order placement with an oversell guard.
//!
//! The engine reads the product, checks stock and prices the order, then asks
//! the store to commit (decrement + order + item) conditionally on what it
//! priced from: enough stock, same price, still published. Other sales of the
//! same product do not invalidate the commit. When a guard fails the engine
//! re-reads and decides again, so a shortfall surfaces as `InsufficientStock`
//! and a price change re-prices the order.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use storefront_core::{DomainError, DomainResult, OrderId};
use storefront_sales::{CheckoutRequest, NewOrder, Order, OrderConfirmation, OrderItem, ValidCheckout};

use crate::store::{StoreError, StorefrontStore};

/// Optimistic attempts before a checkout gives up under contention.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 16;

pub struct CheckoutEngine<S: ?Sized = dyn StorefrontStore> {
    store: Arc<S>,
    max_attempts: u32,
}

impl<S: ?Sized> Clone for CheckoutEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            max_attempts: self.max_attempts,
        }
    }
}

impl<S> CheckoutEngine<S>
where
    S: StorefrontStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Validate a raw request and place the order.
    pub async fn place_order(&self, request: &CheckoutRequest) -> DomainResult<OrderConfirmation> {
        let valid = request.validate()?;
        let (order, _item) = self.place(valid).await?;
        Ok(order.confirmation())
    }

    /// Place an already validated order.
    ///
    /// Fails with `NotFound` for unknown or unpublished products and with
    /// `InsufficientStock` when the request exceeds the stock read in the same
    /// attempt that commits.
    #[instrument(skip(self, checkout), fields(product = %checkout.product, qty = checkout.quantity), err)]
    pub async fn place(&self, checkout: ValidCheckout) -> DomainResult<(Order, OrderItem)> {
        for attempt in 1..=self.max_attempts {
            let product = self
                .store
                .find_product(&checkout.product)
                .await?
                .filter(|p| p.published)
                .ok_or_else(|| DomainError::not_found("Product"))?;

            if checkout.quantity > product.quantity {
                return Err(DomainError::InsufficientStock {
                    requested: checkout.quantity,
                    available: product.quantity,
                });
            }

            let new_order = NewOrder::price(
                product.id,
                &product.price,
                checkout.quantity,
                checkout.email.clone(),
                Utc::now(),
            )?;

            match self.store.commit_checkout(new_order).await {
                Ok((order, item)) => {
                    info!(
                        order_id = %order.id,
                        product_id = %product.id,
                        qty = item.quantity,
                        total = %order.total.format_amount(),
                        "order placed"
                    );
                    return Ok((order, item));
                }
                Err(StoreError::VersionConflict(reason)) => {
                    debug!(attempt, %reason, "product changed before the commit, re-reading");
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(attempts = self.max_attempts, "checkout gave up under contention");
        Err(DomainError::internal(format!(
            "checkout contention: no commit after {} attempts",
            self.max_attempts
        )))
    }

    /// A placed order and its line.
    pub async fn order(&self, id: OrderId) -> DomainResult<(Order, OrderItem)> {
        self.store
            .find_order(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order"))
    }
}
