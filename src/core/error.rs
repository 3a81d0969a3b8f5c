//! Typed error handling for the storefront
//!
//! Every failure that can reach a caller is a [`ShopError`]. Handlers return
//! `Result<_, ShopError>` and axum turns the error into a structured JSON body:
//!
//! ```json
//! { "status": "error", "kind": "not_found", "message": "product '...' not found" }
//! ```
//!
//! # Error Categories
//!
//! - [`ShopError::NotFound`] / [`ShopError::NotInCart`]: identifier does not resolve (404)
//! - [`ShopError::Validation`]: malformed input, see [`ValidationError`] (400)
//! - [`ShopError::Conflict`]: duplicate business key (400)
//! - [`ShopError::Internal`]: store failure or unexpected fault (500, generic message)
//!
//! Stores report their own failures through [`StoreError`], which converts into
//! `ShopError` without leaking backend details to the client.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Coarse error classification exposed to clients as `kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

/// The main error type for the storefront
#[derive(Debug, Error)]
pub enum ShopError {
    /// A product or cart identifier does not resolve
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: Uuid },

    /// The cart exists but holds no line for the product
    #[error("product '{product_id}' is not in cart '{cart_id}'")]
    NotInCart { cart_id: Uuid, product_id: Uuid },

    /// Input rejected before reaching the store
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A uniqueness-constrained field already holds this value
    #[error("{field} '{value}' already exists")]
    Conflict { field: &'static str, value: String },

    /// Store failure or unexpected fault; the source is logged, never returned
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `"error"`
    pub status: &'static str,
    /// Error kind for programmatic handling
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ShopError {
    pub fn product_not_found(id: Uuid) -> Self {
        ShopError::NotFound {
            resource: "product",
            id,
        }
    }

    pub fn cart_not_found(id: Uuid) -> Self {
        ShopError::NotFound {
            resource: "cart",
            id,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ShopError::NotFound { .. } | ShopError::NotInCart { .. } => ErrorKind::NotFound,
            ShopError::Validation(_) => ErrorKind::Validation,
            ShopError::Conflict { .. } => ErrorKind::Conflict,
            ShopError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            status: "error",
            kind: self.kind(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ShopError::Validation(ValidationError::Fields(issues)) => {
                Some(serde_json::json!({ "fields": issues }))
            }
            ShopError::Conflict { field, value } => {
                Some(serde_json::json!({ "field": field, "value": value }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        if let ShopError::Internal(source) = &self {
            tracing::error!(error = ?source, "request failed with internal error");
        }
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<StoreError> for ShopError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { field, value } => ShopError::Conflict { field, value },
            StoreError::Backend(source) => ShopError::Internal(source),
        }
    }
}

impl From<JsonRejection> for ShopError {
    fn from(rejection: JsonRejection) -> Self {
        ShopError::Validation(ValidationError::Body(rejection.body_text()))
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Path segment is not a well-formed identifier
    #[error("invalid {resource} id '{value}'")]
    InvalidId { resource: &'static str, value: String },

    /// One or more fields were rejected
    #[error("validation failed: {}", summarize(.0))]
    Fields(Vec<FieldIssue>),

    /// Body could not be decoded at all
    #[error("malformed request body: {0}")]
    Body(String),
}

impl ValidationError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Fields(vec![FieldIssue {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn quantity() -> Self {
        Self::field("quantity", "must be an integer greater than 0")
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut issues: Vec<FieldIssue> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldIssue {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        issues.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::Fields(issues)
    }
}

fn summarize(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{} {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors reported by store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint violation, distinguishable from other failures
    #[error("{field} '{value}' already exists")]
    Conflict { field: &'static str, value: String },

    /// Connectivity, I/O or encoding failure inside the backend
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ShopError::product_not_found(Uuid::nil());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            "product '00000000-0000-0000-0000-000000000000' not found"
        );
    }

    #[test]
    fn test_conflict_maps_to_400_with_details() {
        let err: ShopError = StoreError::Conflict {
            field: "code",
            value: "SKU-1".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["kind"], "conflict");
        assert_eq!(body["details"]["field"], "code");
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err: ShopError =
            StoreError::Backend(anyhow::anyhow!("connection refused on 10.0.0.3:27017")).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");
        assert!(!err.to_response().message.contains("27017"));
    }

    #[test]
    fn test_field_errors_are_listed() {
        let err = ShopError::Validation(ValidationError::field("price", "must be >= 0"));
        let body = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(body["kind"], "validation");
        assert_eq!(body["message"], "validation failed: price must be >= 0");
        assert_eq!(body["details"]["fields"][0]["field"], "price");
    }
}
