//! Restock Notifier.
//!
//! Runs after every product write with the snapshot taken before the write.
//! On a restock transition it fans out one task per pending waitlist entry;
//! each task sends one message and records the outcome on its own entry, so a
//! failing subscriber never blocks the others. Nothing here propagates an
//! error to the caller: the product write has already succeeded.
//!
//! Fan-outs for the same product run one at a time, each reading the pending
//! waitlist only after the previous one has recorded its outcomes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use storefront_core::ProductId;
use storefront_products::{Product, ProductSnapshot, RestockTrigger, detect_restock};
use storefront_waitlist::WaitlistEntry;

use crate::notify::{Locale, MessageCatalog, NotificationChannel, RenderedMessage};
use crate::store::StorefrontStore;

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Summary of one restock fan-out. Observability only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockReport {
    pub product_id: ProductId,
    pub trigger: RestockTrigger,
    pub attempted: usize,
    pub notified: usize,
    pub failed: usize,
}

/// One lock per product, shared by every clone of the notifier.
#[derive(Default)]
struct FanOutLocks {
    inflight: Mutex<HashMap<ProductId, Arc<Mutex<()>>>>,
}

impl FanOutLocks {
    async fn acquire(&self, product_id: ProductId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(inflight.entry(product_id).or_default())
        };
        lock.lock_owned().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryOutcome {
    Notified,
    Failed,
}

pub struct RestockNotifier<S: ?Sized = dyn StorefrontStore> {
    store: Arc<S>,
    channel: Arc<dyn NotificationChannel>,
    messages: MessageCatalog,
    locale: Locale,
    send_timeout: Duration,
    fan_outs: Arc<FanOutLocks>,
}

impl<S: ?Sized> Clone for RestockNotifier<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            channel: Arc::clone(&self.channel),
            messages: self.messages.clone(),
            locale: self.locale,
            send_timeout: self.send_timeout,
            fan_outs: Arc::clone(&self.fan_outs),
        }
    }
}

impl<S> RestockNotifier<S>
where
    S: StorefrontStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, channel: Arc<dyn NotificationChannel>, messages: MessageCatalog) -> Self {
        Self {
            store,
            channel,
            messages,
            locale: Locale::default(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
            fan_outs: Arc::default(),
        }
    }

    /// Locale used for every subscriber; no per-subscriber preference is stored.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// `None` when `previous -> product` is not a restock transition.
    pub async fn on_product_updated(
        &self,
        product: &Product,
        previous: ProductSnapshot,
    ) -> Option<RestockReport> {
        let trigger = detect_restock(previous, product.snapshot())?;

        // Held until every entry's outcome is saved.
        let _fan_out = self.fan_outs.acquire(product.id).await;
        let pending = match self.store.find_pending_waitlist(product.id).await {
            Ok(pending) => pending,
            Err(e) => {
                error!(product_id = %product.id, error = %e, "could not load waitlist for restock");
                return Some(RestockReport {
                    product_id: product.id,
                    trigger,
                    attempted: 0,
                    notified: 0,
                    failed: 0,
                });
            }
        };

        if pending.is_empty() {
            debug!(product_id = %product.id, trigger = trigger.as_str(), "restock with empty waitlist");
        }

        let message = self
            .messages
            .back_in_stock(self.locale, &product.name, &product.slug);
        let message = Arc::new(message);

        let mut tasks = JoinSet::new();
        for entry in pending.iter().cloned() {
            tasks.spawn(notify_entry(
                Arc::clone(&self.store),
                Arc::clone(&self.channel),
                Arc::clone(&message),
                self.send_timeout,
                entry,
            ));
        }

        let mut report = RestockReport {
            product_id: product.id,
            trigger,
            attempted: pending.len(),
            notified: 0,
            failed: 0,
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(EntryOutcome::Notified) => report.notified += 1,
                Ok(EntryOutcome::Failed) => report.failed += 1,
                Err(e) => {
                    error!(product_id = %product.id, error = %e, "waitlist notification task aborted");
                    report.failed += 1;
                }
            }
        }

        info!(
            product_id = %report.product_id,
            trigger = report.trigger.as_str(),
            attempted = report.attempted,
            notified = report.notified,
            failed = report.failed,
            "restock notifications processed"
        );
        Some(report)
    }
}

async fn notify_entry<S>(
    store: Arc<S>,
    channel: Arc<dyn NotificationChannel>,
    message: Arc<RenderedMessage>,
    send_timeout: Duration,
    mut entry: WaitlistEntry,
) -> EntryOutcome
where
    S: StorefrontStore + ?Sized,
{
    let delivered = tokio::time::timeout(
        send_timeout,
        channel.send(&entry.email, &message.subject, &message.body),
    )
    .await
    .unwrap_or(false);

    let now = Utc::now();
    if delivered {
        entry.mark_notified(now);
    } else {
        entry.record_failure(now);
        warn!(
            entry_id = %entry.id,
            product_id = %entry.product_id,
            failed_attempts = entry.failed_attempts,
            "waitlist notification failed, entry stays pending"
        );
    }

    match store.save_waitlist_entry(&entry).await {
        Ok(()) if delivered => EntryOutcome::Notified,
        Ok(()) => EntryOutcome::Failed,
        Err(e) => {
            // A delivered message whose mark was lost is re-sent on the next restock.
            error!(entry_id = %entry.id, error = %e, delivered, "could not record waitlist notification");
            EntryOutcome::Failed
        }
    }
}
