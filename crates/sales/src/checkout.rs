//! Checkout request validation.

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, EmailAddress, FieldErrors};
use storefront_products::ProductRef;

/// Raw single-item checkout request, as received from a shopper.
///
/// Every field is optional so that missing and malformed input both surface as
/// field-level validation errors instead of deserialisation failures.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub product_id: Option<i64>,
    pub product_slug: Option<String>,
    pub qty: Option<i64>,
    pub email: Option<String>,
}

/// A checkout request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCheckout {
    pub product: ProductRef,
    pub quantity: u32,
    pub email: EmailAddress,
}

impl CheckoutRequest {
    pub fn validate(&self) -> DomainResult<ValidCheckout> {
        let mut errors = FieldErrors::new();

        let quantity = match self.qty {
            Some(qty) if qty > 0 => match u32::try_from(qty) {
                Ok(q) => Some(q),
                Err(_) => {
                    errors.add("qty", "Quantity is too large");
                    None
                }
            },
            _ => {
                errors.add("qty", "Quantity must be greater than 0");
                None
            }
        };

        let product = ProductRef::from_parts(self.product_id, self.product_slug.as_deref());
        if product.is_none() {
            errors.add("product", "productId or productSlug required");
        }

        let email = match EmailAddress::parse(self.email.as_deref().unwrap_or_default()) {
            Ok(email) => Some(email),
            Err(err) => {
                if let Some((field, detail)) = err.field_errors().and_then(|f| f.iter().next()) {
                    errors.add(field.clone(), detail.clone());
                }
                None
            }
        };

        errors.finish("Invalid order request")?;

        match (product, quantity, email) {
            (Some(product), Some(quantity), Some(email)) => Ok(ValidCheckout {
                product,
                quantity,
                email,
            }),
            _ => Err(DomainError::invalid("Invalid order request")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::ProductId;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            product_id: None,
            product_slug: Some("sunset-print".to_string()),
            qty: Some(1),
            email: Some("user@example.com".to_string()),
        }
    }

    #[test]
    fn accepts_slug_request() {
        let valid = request().validate().unwrap();
        assert_eq!(valid.product, ProductRef::BySlug("sunset-print".to_string()));
        assert_eq!(valid.quantity, 1);
        assert_eq!(valid.email.as_str(), "user@example.com");
    }

    #[test]
    fn accepts_id_request() {
        let req = CheckoutRequest {
            product_id: Some(4),
            product_slug: None,
            ..request()
        };
        assert_eq!(req.validate().unwrap().product, ProductRef::ById(ProductId::new(4)));
    }

    #[test]
    fn rejects_non_positive_quantity_with_field_detail() {
        for qty in [None, Some(0), Some(-3)] {
            let req = CheckoutRequest { qty, ..request() };
            let err = req.validate().unwrap_err();
            let fields = err.field_errors().unwrap();
            assert_eq!(fields["qty"], "Quantity must be greater than 0");
        }
    }

    #[test]
    fn rejects_quantity_beyond_u32() {
        let req = CheckoutRequest {
            qty: Some(i64::from(u32::MAX) + 1),
            ..request()
        };
        assert!(req.validate().unwrap_err().field_errors().unwrap().contains_key("qty"));
    }

    #[test]
    fn reports_every_invalid_field_at_once() {
        let err = CheckoutRequest::default().validate().unwrap_err();
        match err {
            DomainError::InvalidRequest { message, fields } => {
                assert_eq!(message, "Invalid order request");
                assert!(fields.contains_key("qty"));
                assert!(fields.contains_key("product"));
                assert!(fields.contains_key("email"));
            }
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn deserializes_camel_case_body() {
        let req: CheckoutRequest = serde_json::from_value(serde_json::json!({
            "productSlug": "sunset-print",
            "qty": 2,
            "email": "user@example.com"
        }))
        .unwrap();
        assert_eq!(req.product_slug.as_deref(), Some("sunset-print"));
        assert_eq!(req.qty, Some(2));
    }
}
