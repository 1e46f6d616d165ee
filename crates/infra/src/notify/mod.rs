//! Outbound notifications.
//!
//! A [`NotificationChannel`] delivers one rendered message and reports whether
//! delivery was confirmed. Channels own their own error handling; a failed send
//! is simply `false`.

use std::collections::BTreeSet;
use std::sync::Mutex;

use tracing::info;

mod messages;

pub use messages::{Locale, MessageCatalog, RenderedMessage};

#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync {
    /// `true` only on confirmed delivery.
    async fn send(&self, address: &str, subject: &str, body: &str) -> bool;
}

/// Writes every message to the log and reports success. Dev default.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationChannel;

#[async_trait::async_trait]
impl NotificationChannel for LogNotificationChannel {
    async fn send(&self, address: &str, subject: &str, body: &str) -> bool {
        info!(to = %address, subject = %subject, body_len = body.len(), "notification delivered to log");
        true
    }
}

/// One message handed to a [`RecordingNotificationChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub address: String,
    pub subject: String,
    pub body: String,
    pub delivered: bool,
}

/// Test double: records every attempt and fails for chosen addresses.
#[derive(Debug, Default)]
pub struct RecordingNotificationChannel {
    sent: Mutex<Vec<SentMessage>>,
    failing: Mutex<BTreeSet<String>>,
}

impl RecordingNotificationChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later send to `address` (case-insensitive) fail.
    pub fn fail_for(&self, address: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(address.to_lowercase());
        }
    }

    pub fn recover(&self, address: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.remove(&address.to_lowercase());
        }
    }

    /// Every attempt so far, delivered or not.
    pub fn attempts(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Addresses with at least one confirmed delivery.
    pub fn delivered_to(&self) -> Vec<String> {
        self.attempts()
            .into_iter()
            .filter(|m| m.delivered)
            .map(|m| m.address)
            .collect()
    }
}

#[async_trait::async_trait]
impl NotificationChannel for RecordingNotificationChannel {
    async fn send(&self, address: &str, subject: &str, body: &str) -> bool {
        let delivered = self
            .failing
            .lock()
            .map(|f| !f.contains(&address.to_lowercase()))
            .unwrap_or(false);

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentMessage {
                address: address.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
                delivered,
            });
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_channel_fails_only_chosen_addresses() {
        let channel = RecordingNotificationChannel::new();
        channel.fail_for("Broken@Example.com");

        assert!(channel.send("ok@example.com", "s", "b").await);
        assert!(!channel.send("broken@example.com", "s", "b").await);

        channel.recover("broken@example.com");
        assert!(channel.send("broken@example.com", "s", "b").await);

        assert_eq!(channel.attempts().len(), 3);
        assert_eq!(channel.delivered_to(), vec!["ok@example.com", "broken@example.com"]);
    }

    #[tokio::test]
    async fn log_channel_always_succeeds() {
        assert!(LogNotificationChannel.send("a@b.com", "subject", "body").await);
    }
}
