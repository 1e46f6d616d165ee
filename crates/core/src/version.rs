//! Optimistic concurrency for mutable rows.

use crate::error::{DomainError, DomainResult};

/// Version a writer observed when it read a row.
///
/// Every successful write bumps the row version by one, so a conditional write
/// carrying a stale `ExpectedVersion` is rejected instead of overwriting a
/// concurrent change.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpectedVersion(u64);

impl ExpectedVersion {
    pub const fn exact(version: u64) -> Self {
        Self(version)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub fn matches(self, actual: u64) -> bool {
        self.0 == actual
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {}, actual: {actual})",
                self.0
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_version_is_rejected() {
        assert!(ExpectedVersion::exact(3).check(3).is_ok());
        assert!(matches!(
            ExpectedVersion::exact(3).check(4),
            Err(DomainError::Conflict(_))
        ));
    }
}
