//! Stub payment sessions.
//!
//! No gateway is contacted: a session is a fabricated id plus a URL pointing
//! back at this service's own stub checkout page. Stock is checked but not
//! reserved; the real decrement happens at order placement.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use storefront_core::{DomainError, DomainResult, EmailAddress, FieldErrors};
use storefront_products::ProductRef;

use crate::store::StorefrontStore;

pub const SESSION_PENDING: &str = "PENDING";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionRequest {
    pub product_slug: Option<String>,
    pub qty: Option<i64>,
    pub email: Option<String>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub checkout_url: String,
    pub session_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedOutcome {
    Success,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedPayment {
    pub status: String,
    pub session_id: String,
    pub message: String,
}

struct ValidSessionRequest {
    slug: String,
    qty: u32,
    email: EmailAddress,
}

impl CheckoutSessionRequest {
    fn validate(&self) -> DomainResult<ValidSessionRequest> {
        let mut errors = FieldErrors::new();

        let slug = self
            .product_slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if slug.is_none() {
            errors.add("productSlug", "Product slug is required");
        }

        let qty = match self.qty {
            None => {
                errors.add("qty", "Quantity is required");
                None
            }
            Some(q) => match u32::try_from(q) {
                Ok(q) if q > 0 => Some(q),
                _ => {
                    errors.add("qty", "Quantity must be positive");
                    None
                }
            },
        };

        let email = match EmailAddress::parse(self.email.as_deref().unwrap_or_default()) {
            Ok(email) => Some(email),
            Err(_) => {
                errors.add("email", "Email must be valid");
                None
            }
        };

        errors.finish("Invalid checkout session request")?;
        match (slug, qty, email) {
            (Some(slug), Some(qty), Some(email)) => Ok(ValidSessionRequest {
                slug: slug.to_string(),
                qty,
                email,
            }),
            _ => Err(DomainError::invalid("Invalid checkout session request")),
        }
    }
}

pub struct PaymentService<S: ?Sized = dyn StorefrontStore> {
    store: Arc<S>,
    enabled: bool,
    base_url: String,
}

impl<S: ?Sized> Clone for PaymentService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            enabled: self.enabled,
            base_url: self.base_url.clone(),
        }
    }
}

impl<S> PaymentService<S>
where
    S: StorefrontStore + ?Sized,
{
    pub fn new(store: Arc<S>, enabled: bool, base_url: impl Into<String>) -> Self {
        Self {
            store,
            enabled,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> DomainResult<CheckoutSession> {
        if !self.enabled {
            warn!("checkout session requested while payments are disabled");
            return Err(DomainError::FeatureDisabled(
                "Payments are currently disabled".to_string(),
            ));
        }
        let valid = request.validate()?;

        let product = self
            .store
            .find_product(&ProductRef::BySlug(valid.slug.clone()))
            .await?
            .filter(|p| p.published)
            .ok_or_else(|| DomainError::not_found("Product"))?;

        if valid.qty > product.quantity {
            return Err(DomainError::InsufficientStock {
                requested: valid.qty,
                available: product.quantity,
            });
        }

        let session_id = stub_session_id(&valid.slug, valid.email.as_str());
        let checkout_url = self.stub_checkout_url(
            &session_id,
            request.success_url.as_deref(),
            request.cancel_url.as_deref(),
        );
        info!(
            session_id = %session_id,
            slug = %valid.slug,
            qty = valid.qty,
            "stub checkout session created"
        );

        Ok(CheckoutSession {
            checkout_url,
            session_id,
            status: SESSION_PENDING.to_string(),
        })
    }

    /// Sessions are never stored, so every id is accepted.
    pub fn simulate(&self, session_id: &str, outcome: SimulatedOutcome) -> SimulatedPayment {
        let (status, message) = match outcome {
            SimulatedOutcome::Success => ("success", "Payment simulation successful"),
            SimulatedOutcome::Cancel => ("cancelled", "Payment simulation cancelled"),
        };
        info!(session_id = %session_id, status, "stub payment simulated");
        SimulatedPayment {
            status: status.to_string(),
            session_id: session_id.to_string(),
            message: message.to_string(),
        }
    }

    fn stub_checkout_url(&self, session_id: &str, success_url: Option<&str>, cancel_url: Option<&str>) -> String {
        let success = success_url
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/success", self.base_url));
        let cancel = cancel_url
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/cancel", self.base_url));
        format!(
            "{}/payments/stub-checkout?sessionId={}&successUrl={}&cancelUrl={}",
            self.base_url,
            urlencoding::encode(session_id),
            urlencoding::encode(&success),
            urlencoding::encode(&cancel),
        )
    }
}

/// `cs_stub_<n>_<8 hex>`: `n` is stable for the same slug and email within one
/// minute, the suffix keeps ids unique.
fn stub_session_id(slug: &str, email: &str) -> String {
    let minute = Utc::now().timestamp() / 60;
    let mut hasher = DefaultHasher::new();
    (slug, email, minute).hash(&mut hasher);
    let n = hasher.finish() % 1_000_000_000;

    let suffix = Uuid::new_v4().simple().to_string();
    format!("cs_stub_{n}_{}", &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_have_the_stub_shape() {
        let id = stub_session_id("sunset-print", "user@example.com");
        let rest = id.strip_prefix("cs_stub_").unwrap();
        let (n, suffix) = rest.split_once('_').unwrap();
        assert!(n.parse::<u64>().is_ok());
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn session_request_reports_each_missing_field() {
        let err = CheckoutSessionRequest::default().validate().err().unwrap();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields["productSlug"], "Product slug is required");
        assert_eq!(fields["qty"], "Quantity is required");
        assert_eq!(fields["email"], "Email must be valid");
    }

    #[test]
    fn zero_quantity_is_not_positive() {
        let req = CheckoutSessionRequest {
            product_slug: Some("sunset-print".into()),
            qty: Some(0),
            email: Some("user@example.com".into()),
            ..CheckoutSessionRequest::default()
        };
        let err = req.validate().err().unwrap();
        assert_eq!(err.field_errors().unwrap()["qty"], "Quantity must be positive");
    }
}
