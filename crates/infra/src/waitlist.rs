//! Waitlist Engine: idempotent subscription for out-of-stock products.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use storefront_core::{DomainResult, EmailAddress, ProductId};
use storefront_products::ProductRef;
use storefront_waitlist::{NewWaitlistEntry, WaitlistAddStatus, WaitlistEntry};

use crate::store::{StoreError, StorefrontStore};

pub struct WaitlistEngine<S: ?Sized = dyn StorefrontStore> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for WaitlistEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> WaitlistEngine<S>
where
    S: StorefrontStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Subscribe `email` to `product_id`.
    ///
    /// Unknown and in-stock products are `NotEligible`, which is a normal
    /// outcome rather than an error. Only a malformed email is an error. No
    /// message is sent here.
    pub async fn subscribe(&self, product_id: ProductId, email: &str) -> DomainResult<WaitlistAddStatus> {
        let email = EmailAddress::parse(email)?;

        let Some(product) = self.store.find_product(&ProductRef::ById(product_id)).await? else {
            debug!(%product_id, "waitlist subscribe for unknown product");
            return Ok(WaitlistAddStatus::NotEligible);
        };
        if product.quantity > 0 {
            return Ok(WaitlistAddStatus::NotEligible);
        }

        if self.store.waitlist_exists(product_id, &email.normalized()).await? {
            return Ok(WaitlistAddStatus::AlreadySubscribed);
        }

        match self
            .store
            .insert_waitlist_entry(NewWaitlistEntry::new(product_id, email, Utc::now()))
            .await
        {
            Ok(entry) => {
                info!(%product_id, entry_id = %entry.id, "waitlist entry added");
                Ok(WaitlistAddStatus::Added)
            }
            // Lost the race against an identical subscribe.
            Err(StoreError::Duplicate(_)) => Ok(WaitlistAddStatus::AlreadySubscribed),
            Err(e) => Err(e.into()),
        }
    }

    /// Every entry for a product, notified or not.
    pub async fn entries(&self, product_id: ProductId) -> DomainResult<Vec<WaitlistEntry>> {
        Ok(self.store.list_waitlist(product_id).await?)
    }
}
