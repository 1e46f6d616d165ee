//! Configuration loading and representation.
//!
//! Everything comes from environment variables with development defaults.
//! Values that are present but malformed are errors, never silently replaced.

use std::net::SocketAddr;

use thiserror::Error;
use tracing::warn;

use crate::checkout::DEFAULT_MAX_ATTEMPTS;
use crate::notify::Locale;

pub const DEV_ADMIN_TOKEN: &str = "dev-admin-token";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not valid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    Postgres { database_url: String, max_connections: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    pub bind_addr: SocketAddr,
    /// Origin used for product links in emails and stub checkout URLs.
    pub public_base_url: String,
    /// Bearer token required on `/admin` routes.
    pub admin_token: String,
    pub payments_enabled: bool,
    pub default_locale: Locale,
    pub checkout_max_attempts: u32,
    pub storage: StorageConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            public_base_url: "http://localhost:8080".to_string(),
            admin_token: DEV_ADMIN_TOKEN.to_string(),
            payments_enabled: false,
            default_locale: Locale::EnUs,
            checkout_max_attempts: DEFAULT_MAX_ATTEMPTS,
            storage: StorageConfig::InMemory,
        }
    }
}

impl StorefrontConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let bind_addr = match var("STOREFRONT_BIND_ADDR") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                name: "STOREFRONT_BIND_ADDR",
                reason: format!("{e}"),
            })?,
            None => defaults.bind_addr,
        };

        let public_base_url = match var("STOREFRONT_PUBLIC_BASE_URL") {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.trim_end_matches('/').to_string()
            }
            Some(url) => {
                return Err(ConfigError::Invalid {
                    name: "STOREFRONT_PUBLIC_BASE_URL",
                    reason: format!("'{url}' is not an http(s) URL"),
                });
            }
            None => defaults.public_base_url,
        };

        let admin_token = var("STOREFRONT_ADMIN_TOKEN").unwrap_or_else(|| {
            warn!("STOREFRONT_ADMIN_TOKEN not set; using insecure dev default");
            DEV_ADMIN_TOKEN.to_string()
        });

        let payments_enabled = match var("STOREFRONT_PAYMENTS_ENABLED") {
            Some(raw) => parse_bool("STOREFRONT_PAYMENTS_ENABLED", &raw)?,
            None => defaults.payments_enabled,
        };

        let default_locale = match var("STOREFRONT_DEFAULT_LOCALE") {
            Some(raw) => Locale::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "STOREFRONT_DEFAULT_LOCALE",
                reason: format!("unsupported locale '{raw}'"),
            })?,
            None => defaults.default_locale,
        };

        let checkout_max_attempts = match var("STOREFRONT_CHECKOUT_MAX_ATTEMPTS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "STOREFRONT_CHECKOUT_MAX_ATTEMPTS",
                        reason: format!("'{raw}' is not a positive integer"),
                    });
                }
            },
            None => defaults.checkout_max_attempts,
        };

        let persistent = match var("USE_PERSISTENT_STORES") {
            Some(raw) => parse_bool("USE_PERSISTENT_STORES", &raw)?,
            None => false,
        };
        let storage = if persistent {
            let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => raw.parse::<u32>().map_err(|_| ConfigError::Invalid {
                    name: "DATABASE_MAX_CONNECTIONS",
                    reason: format!("'{raw}' is not a number"),
                })?,
                None => 10,
            };
            StorageConfig::Postgres {
                database_url,
                max_connections,
            }
        } else {
            StorageConfig::InMemory
        };

        Ok(Self {
            bind_addr,
            public_base_url,
            admin_token,
            payments_enabled,
            default_locale,
            checkout_max_attempts,
            storage,
        })
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            reason: format!("'{raw}' is not a boolean"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StorefrontConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_gives_dev_defaults() {
        assert_eq!(config_from(&[]).unwrap(), StorefrontConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            ("STOREFRONT_BIND_ADDR", "127.0.0.1:9000"),
            ("STOREFRONT_PUBLIC_BASE_URL", "https://shop.example/"),
            ("STOREFRONT_ADMIN_TOKEN", "s3cret"),
            ("STOREFRONT_PAYMENTS_ENABLED", "true"),
            ("STOREFRONT_DEFAULT_LOCALE", "lt-LT"),
            ("STOREFRONT_CHECKOUT_MAX_ATTEMPTS", "4"),
            ("USE_PERSISTENT_STORES", "1"),
            ("DATABASE_URL", "postgres://localhost/storefront"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.public_base_url, "https://shop.example");
        assert_eq!(config.admin_token, "s3cret");
        assert!(config.payments_enabled);
        assert_eq!(config.default_locale, Locale::LtLt);
        assert_eq!(config.checkout_max_attempts, 4);
        assert_eq!(
            config.storage,
            StorageConfig::Postgres {
                database_url: "postgres://localhost/storefront".to_string(),
                max_connections: 10,
            }
        );
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(matches!(
            config_from(&[("STOREFRONT_PAYMENTS_ENABLED", "maybe")]),
            Err(ConfigError::Invalid { name: "STOREFRONT_PAYMENTS_ENABLED", .. })
        ));
        assert!(matches!(
            config_from(&[("STOREFRONT_CHECKOUT_MAX_ATTEMPTS", "0")]),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            config_from(&[("STOREFRONT_PUBLIC_BASE_URL", "shop.example")]),
            Err(ConfigError::Invalid { .. })
        ));
        assert_eq!(
            config_from(&[("USE_PERSISTENT_STORES", "true")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }
}
