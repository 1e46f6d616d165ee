use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{EmailAddress, Entity, ProductId, WaitlistEntryId};

/// Outcome of a subscribe attempt. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaitlistAddStatus {
    Added,
    AlreadySubscribed,
    NotEligible,
}

/// Lifecycle of a subscription: `Pending -> Notified`, terminal at `Notified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitlistState {
    Pending,
    Notified,
}

/// One shopper waiting for one product.
///
/// At most one entry exists per `(product_id, lower(email))`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub id: WaitlistEntryId,
    pub product_id: ProductId,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub notified_at: Option<DateTime<Utc>>,
    /// Delivery attempts that failed while the entry was pending.
    pub failed_attempts: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl Entity for WaitlistEntry {
    type Id = WaitlistEntryId;

    fn id(&self) -> WaitlistEntryId {
        self.id
    }
}

impl WaitlistEntry {
    pub fn state(&self) -> WaitlistState {
        if self.notified_at.is_some() {
            WaitlistState::Notified
        } else {
            WaitlistState::Pending
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state() == WaitlistState::Pending
    }

    /// Case-insensitive uniqueness key.
    pub fn email_key(&self) -> String {
        self.email.to_lowercase()
    }

    /// Record a confirmed delivery. Returns `false` (and changes nothing) if the
    /// entry was already notified: `notified_at` is never overwritten or cleared.
    pub fn mark_notified(&mut self, now: DateTime<Utc>) -> bool {
        if self.notified_at.is_some() {
            return false;
        }
        self.notified_at = Some(now);
        self.last_attempt_at = Some(now);
        true
    }

    /// Record a failed delivery; the entry stays pending.
    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        if self.notified_at.is_none() {
            self.failed_attempts = self.failed_attempts.saturating_add(1);
            self.last_attempt_at = Some(now);
        }
    }
}

/// A subscription that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWaitlistEntry {
    pub product_id: ProductId,
    pub email: EmailAddress,
    pub created_at: DateTime<Utc>,
}

impl NewWaitlistEntry {
    pub fn new(product_id: ProductId, email: EmailAddress, now: DateTime<Utc>) -> Self {
        Self {
            product_id,
            email,
            created_at: now,
        }
    }

    pub fn email_key(&self) -> String {
        self.email.normalized()
    }

    pub fn into_entry(self, id: WaitlistEntryId) -> WaitlistEntry {
        WaitlistEntry {
            id,
            product_id: self.product_id,
            email: self.email.into_inner(),
            created_at: self.created_at,
            notified_at: None,
            failed_attempts: 0,
            last_attempt_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending_entry() -> WaitlistEntry {
        let email = EmailAddress::parse("A@B.com").unwrap();
        NewWaitlistEntry::new(ProductId::new(1), email, Utc::now()).into_entry(WaitlistEntryId::new(1))
    }

    #[test]
    fn new_entries_are_pending() {
        let entry = pending_entry();
        assert_eq!(entry.state(), WaitlistState::Pending);
        assert_eq!(entry.email, "A@B.com");
        assert_eq!(entry.email_key(), "a@b.com");
        assert_eq!(entry.failed_attempts, 0);
    }

    #[test]
    fn notified_is_terminal() {
        let mut entry = pending_entry();
        let first = Utc::now();
        assert!(entry.mark_notified(first));
        assert_eq!(entry.state(), WaitlistState::Notified);

        assert!(!entry.mark_notified(first + Duration::hours(1)));
        assert_eq!(entry.notified_at, Some(first));

        entry.record_failure(first + Duration::hours(2));
        assert_eq!(entry.failed_attempts, 0);
        assert_eq!(entry.notified_at, Some(first));
    }

    #[test]
    fn failures_keep_entry_pending() {
        let mut entry = pending_entry();
        entry.record_failure(Utc::now());
        entry.record_failure(Utc::now());
        assert!(entry.is_pending());
        assert_eq!(entry.failed_attempts, 2);
        assert!(entry.last_attempt_at.is_some());
    }

    #[test]
    fn status_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&WaitlistAddStatus::AlreadySubscribed).unwrap();
        assert_eq!(json, "\"ALREADY_SUBSCRIBED\"");
    }
}
