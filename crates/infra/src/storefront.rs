use std::sync::Arc;

use crate::catalog::CatalogService;
use crate::checkout::CheckoutEngine;
use crate::config::StorefrontConfig;
use crate::notify::{MessageCatalog, NotificationChannel};
use crate::payments::PaymentService;
use crate::restock::RestockNotifier;
use crate::store::StorefrontStore;
use crate::waitlist::WaitlistEngine;

/// Every storefront service wired to one store and one notification channel.
pub struct Storefront<S: ?Sized = dyn StorefrontStore> {
    pub checkout: CheckoutEngine<S>,
    pub waitlist: WaitlistEngine<S>,
    pub catalog: CatalogService<S>,
    pub payments: PaymentService<S>,
}

impl<S: ?Sized> Clone for Storefront<S> {
    fn clone(&self) -> Self {
        Self {
            checkout: self.checkout.clone(),
            waitlist: self.waitlist.clone(),
            catalog: self.catalog.clone(),
            payments: self.payments.clone(),
        }
    }
}

impl<S> Storefront<S>
where
    S: StorefrontStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, channel: Arc<dyn NotificationChannel>, config: &StorefrontConfig) -> Self {
        let notifier = RestockNotifier::new(
            Arc::clone(&store),
            channel,
            MessageCatalog::new(config.public_base_url.clone()),
        )
        .with_locale(config.default_locale);

        Self {
            checkout: CheckoutEngine::new(Arc::clone(&store))
                .with_max_attempts(config.checkout_max_attempts),
            waitlist: WaitlistEngine::new(Arc::clone(&store)),
            catalog: CatalogService::new(Arc::clone(&store), notifier)
                .with_max_attempts(config.checkout_max_attempts),
            payments: PaymentService::new(store, config.payments_enabled, config.public_base_url.clone()),
        }
    }
}
