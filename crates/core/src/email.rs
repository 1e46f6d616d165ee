//! Email addresses as supplied by shoppers.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A syntactically present email address.
///
/// Only a thin shape check is applied (non-empty local part and domain around a
/// single `@`). The original spelling is kept for display; comparisons go through
/// [`EmailAddress::normalized`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_field("Invalid email", "email", "email is required"));
        }
        match trimmed.split_once('@') {
            Some((local, domain))
                if !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !trimmed.contains(char::is_whitespace) =>
            {
                Ok(Self(trimmed.to_string()))
            }
            _ => Err(DomainError::invalid_field(
                "Invalid email",
                "email",
                "email must look like name@example.com",
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison key.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_original_spelling_but_normalizes_key() {
        let email = EmailAddress::parse("  A@B.com ").unwrap();
        assert_eq!(email.as_str(), "A@B.com");
        assert_eq!(email.normalized(), "a@b.com");
    }

    #[test]
    fn rejects_missing_or_malformed_addresses() {
        for raw in ["", "   ", "no-at-sign", "@example.com", "user@", "a@b@c", "a b@c.d"] {
            let err = EmailAddress::parse(raw).unwrap_err();
            assert!(err.field_errors().unwrap().contains_key("email"), "{raw}");
        }
    }
}
