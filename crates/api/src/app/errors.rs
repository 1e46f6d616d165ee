//! Problem-style JSON errors.
//!
//! Every failure leaves the API as
//! `{type, title, status, detail, code, timestamp, errors?}` where `code` is a
//! stable machine-readable string.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;
use tracing::error;

use storefront_core::DomainError;

const PROBLEM_BASE: &str = "https://api.baltaragis.dev/problems/";

#[derive(Debug, Serialize)]
pub struct FieldProblem {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldProblem>,
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::InvalidRequest { message, fields } => {
            let errors = fields
                .into_iter()
                .map(|(field, message)| FieldProblem { field, message })
                .collect();
            problem(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message, errors)
        }
        DomainError::NotFound(what) => json_error(StatusCode::NOT_FOUND, "NOT_FOUND", format!("{what} not found")),
        DomainError::InsufficientStock { .. } => {
            json_error(StatusCode::CONFLICT, "INSUFFICIENT_STOCK", "Insufficient stock")
        }
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "CONFLICT", msg),
        DomainError::FeatureDisabled(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "FEATURE_DISABLED", msg)
        }
        DomainError::Internal(msg) => {
            error!(error = %msg, "internal error");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An unexpected error occurred",
            )
        }
    }
}

/// A body that is not valid JSON for the endpoint is a validation failure.
pub fn json_rejection(rejection: JsonRejection) -> Response {
    problem(
        StatusCode::BAD_REQUEST,
        "VALIDATION_FAILED",
        "Malformed request body",
        vec![FieldProblem {
            field: "body".to_string(),
            message: rejection.body_text(),
        }],
    )
}

/// Unparseable query parameters, e.g. `?page=abc`.
pub fn query_rejection(rejection: QueryRejection) -> Response {
    problem(
        StatusCode::BAD_REQUEST,
        "VALIDATION_FAILED",
        "Malformed query string",
        vec![FieldProblem {
            field: "query".to_string(),
            message: rejection.body_text(),
        }],
    )
}

pub fn json_error(status: StatusCode, code: &'static str, detail: impl Into<String>) -> Response {
    problem(status, code, detail, Vec::new())
}

fn problem(
    status: StatusCode,
    code: &'static str,
    detail: impl Into<String>,
    errors: Vec<FieldProblem>,
) -> Response {
    let body = Problem {
        kind: format!("{PROBLEM_BASE}{}", code.to_ascii_lowercase()),
        title: status.canonical_reason().unwrap_or("Error").to_string(),
        status: status.as_u16(),
        detail: detail.into(),
        code,
        timestamp: Utc::now().to_rfc3339(),
        errors,
    };
    (status, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_domain_error_has_its_own_status() {
        let cases = [
            (DomainError::invalid_field("Invalid order request", "qty", "bad"), StatusCode::BAD_REQUEST),
            (DomainError::not_found("Product"), StatusCode::NOT_FOUND),
            (
                DomainError::InsufficientStock { requested: 2, available: 1 },
                StatusCode::CONFLICT,
            ),
            (DomainError::conflict("slug"), StatusCode::CONFLICT),
            (DomainError::FeatureDisabled("off".into()), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }
}
