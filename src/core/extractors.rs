//! Axum extractors and response envelope shared by the HTTP handlers
//!
//! - [`JsonBody`] decodes a JSON body and reports failures as [`ShopError`]
//!   so they come back in the uniform error shape.
//! - [`parse_id`] turns a path segment into a UUID, or a validation error.
//! - [`Success`] wraps a payload as `{ "status": "success", "payload": ... }`.

use axum::Json;
use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

use crate::core::error::{ShopError, ValidationError};

/// `axum::Json` with rejections mapped onto [`ShopError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ShopError))]
pub struct JsonBody<T>(pub T);

/// Parse a path segment as the identifier of `resource`
///
/// Path parameters are extracted as plain strings so a malformed id surfaces as
/// a `validation` error rather than axum's plain-text path rejection.
pub fn parse_id(resource: &'static str, value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| ValidationError::InvalidId {
        resource,
        value: value.to_string(),
    })
}

/// Success envelope
#[derive(Debug, Serialize)]
pub struct Success<T> {
    status: &'static str,
    pub payload: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> Success<T> {
    pub fn new(payload: T) -> Self {
        Self {
            status: "success",
            payload,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
