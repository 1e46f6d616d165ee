//! Money value object: an integer amount of minor currency units.
//!
//! Amounts are never floating point. Two `Money` values are equal when both the
//! amount and the currency code match.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Currency used when a product is created without one.
pub const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in minor units (e.g. cents).
    pub cents: u64,
    /// ISO 4217 code, upper case.
    pub currency: String,
}

impl Money {
    pub fn new(cents: u64, currency: impl Into<String>) -> Self {
        Self {
            cents,
            currency: currency.into(),
        }
    }

    /// Exact multiplication; overflow is an internal error, never a wrapped value.
    pub fn checked_times(&self, factor: u32) -> DomainResult<Money> {
        let cents = self.cents.checked_mul(u64::from(factor)).ok_or_else(|| {
            DomainError::internal(format!(
                "price overflow: {} x {} {}",
                self.cents, factor, self.currency
            ))
        })?;
        Ok(Money::new(cents, self.currency.clone()))
    }

    /// Plain decimal rendering with two fraction digits: 4500 -> "45.00".
    pub fn format_amount(&self) -> String {
        format!("{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

/// Validate a currency code: exactly three ASCII letters. Returns it upper-cased.
pub fn normalize_currency(code: &str) -> Option<String> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_ascii_uppercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minor_units_with_two_digits() {
        assert_eq!(Money::new(4500, "EUR").format_amount(), "45.00");
        assert_eq!(Money::new(5, "EUR").format_amount(), "0.05");
        assert_eq!(Money::new(123_456, "USD").format_amount(), "1234.56");
        assert_eq!(Money::new(0, "EUR").format_amount(), "0.00");
    }

    #[test]
    fn multiplication_is_exact() {
        let total = Money::new(4500, "EUR").checked_times(3).unwrap();
        assert_eq!(total, Money::new(13_500, "EUR"));
    }

    #[test]
    fn multiplication_overflow_is_internal_error() {
        let err = Money::new(u64::MAX, "EUR").checked_times(2).unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[test]
    fn currency_codes_are_normalized() {
        assert_eq!(normalize_currency("eur").as_deref(), Some("EUR"));
        assert_eq!(normalize_currency("EURO"), None);
        assert_eq!(normalize_currency("E1R"), None);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn checked_times_matches_wide_multiplication(cents in any::<u64>(), qty in any::<u32>()) {
                let wide = u128::from(cents) * u128::from(qty);
                match Money::new(cents, "EUR").checked_times(qty) {
                    Ok(total) => prop_assert_eq!(u128::from(total.cents), wide),
                    Err(_) => prop_assert!(wide > u128::from(u64::MAX)),
                }
            }

            #[test]
            fn formatted_amount_round_trips_to_cents(cents in 0u64..10_000_000_000) {
                let formatted = Money::new(cents, "EUR").format_amount();
                let digits: String = formatted.chars().filter(|c| *c != '.').collect();
                prop_assert_eq!(digits.parse::<u64>().unwrap(), cents);
            }
        }
    }
}
