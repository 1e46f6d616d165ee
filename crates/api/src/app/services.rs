//! Infrastructure wiring: one store backend, one notification channel, and
//! the storefront services built on top of them.

use std::sync::Arc;

use tracing::info;

use storefront_infra::Storefront;
use storefront_infra::config::{StorageConfig, StorefrontConfig};
use storefront_infra::notify::{LogNotificationChannel, NotificationChannel};
use storefront_infra::store::{InMemoryStorefront, PgStorefront, SharedStore, StoreError};

/// The variant records which backend the storefront runs on.
pub enum AppServices {
    InMemory { storefront: Storefront },
    Persistent { storefront: Storefront },
}

impl AppServices {
    /// Dev/test wiring over the in-memory store.
    pub fn in_memory(config: &StorefrontConfig, channel: Arc<dyn NotificationChannel>) -> Self {
        let store: SharedStore = Arc::new(InMemoryStorefront::new());
        Self::InMemory {
            storefront: Storefront::new(store, channel, config),
        }
    }

    pub fn persistent(
        store: Arc<PgStorefront>,
        config: &StorefrontConfig,
        channel: Arc<dyn NotificationChannel>,
    ) -> Self {
        let store: SharedStore = store;
        Self::Persistent {
            storefront: Storefront::new(store, channel, config),
        }
    }

    pub fn storefront(&self) -> &Storefront {
        match self {
            Self::InMemory { storefront } | Self::Persistent { storefront } => storefront,
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Self::InMemory { .. } => "in-memory",
            Self::Persistent { .. } => "postgres",
        }
    }
}

/// Build services for the configured backend, delivering messages to the log.
pub async fn build_services(config: &StorefrontConfig) -> Result<AppServices, StoreError> {
    let channel: Arc<dyn NotificationChannel> = Arc::new(LogNotificationChannel);

    match &config.storage {
        StorageConfig::InMemory => {
            info!("using in-memory stores");
            Ok(AppServices::in_memory(config, channel))
        }
        StorageConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let store = PgStorefront::connect(database_url, *max_connections).await?;
            store.migrate().await?;
            info!("using postgres stores");
            Ok(AppServices::persistent(Arc::new(store), config, channel))
        }
    }
}
