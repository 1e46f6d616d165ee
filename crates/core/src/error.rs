//! Domain error model.

use std::collections::BTreeMap;

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a distinct, machine-readable outcome. `NotFound` and
/// `InsufficientStock` are never folded into each other: the latter implies the
/// product exists but cannot satisfy the request right now.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input, with per-field detail.
    #[error("{message}")]
    InvalidRequest {
        message: String,
        fields: BTreeMap<String, String>,
    },

    /// A requested resource does not exist (or is not visible to the caller).
    #[error("{0} not found")]
    NotFound(String),

    /// The product exists but holds fewer units than requested.
    #[error("insufficient stock (requested {requested}, available {available})")]
    InsufficientStock { requested: u32, available: u32 },

    /// A uniqueness conflict (e.g. duplicate slug).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The operation is switched off by configuration.
    #[error("feature disabled: {0}")]
    FeatureDisabled(String),

    /// Arithmetic overflow, storage failure, exhausted retries.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn invalid_field(
        message: impl Into<String>,
        field: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.into(), detail.into());
        Self::InvalidRequest {
            message: message.into(),
            fields,
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Field-level detail for `InvalidRequest`, empty for every other variant.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::InvalidRequest { fields, .. } => Some(fields),
            _ => None,
        }
    }
}

/// Accumulates field validation failures so a request reports all of them at once.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, detail: impl Into<String>) {
        // First failure per field wins.
        self.fields.entry(field.into()).or_insert_with(|| detail.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(())` when nothing was recorded, otherwise an `InvalidRequest`.
    pub fn finish(self, message: impl Into<String>) -> DomainResult<()> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(DomainError::InvalidRequest {
                message: message.into(),
                fields: self.fields,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_errors_finish_ok() {
        assert_eq!(FieldErrors::new().finish("bad"), Ok(()));
    }

    #[test]
    fn field_errors_collect_every_field() {
        let mut errors = FieldErrors::new();
        errors.add("qty", "Quantity must be greater than 0");
        errors.add("email", "email is required");
        errors.add("qty", "ignored");

        let err = errors.finish("Invalid order request").unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["qty"], "Quantity must be greater than 0");
        assert_eq!(err.to_string(), "Invalid order request");
    }

    #[test]
    fn not_found_and_insufficient_stock_are_distinct() {
        let a = DomainError::not_found("product");
        let b = DomainError::InsufficientStock {
            requested: 2,
            available: 1,
        };
        assert_ne!(a, b);
        assert!(b.field_errors().is_none());
    }
}
