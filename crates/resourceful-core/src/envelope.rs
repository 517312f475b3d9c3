//! The JSON envelope every response is wrapped in.
//!
//! Three shapes are produced:
//!
//! ```text
//! { "status": "success", "code": 200, "data": ... }
//! { "status": "fail",    "code": 4xx, "message": "...", "data": {field errors} }
//! { "status": "error",   "code": 5xx, "message": "...", "detail": "..." }
//! ```
//!
//! `fail` is for problems with the client's input, `error` for everything
//! else. `detail` is only emitted when the application runs in debug mode.

use bytes::Bytes;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ResourceError;

/// Message of the envelope returned for unmatched routes.
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Request address does not exist on the api.";

/// Outcome class of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    /// The pipeline completed.
    Success,
    /// The request was rejected because of its input or credentials.
    Fail,
    /// The server failed to handle the request.
    Error,
}

/// A response envelope.
///
/// # Example
///
/// ```
/// use resourceful_core::{EnvelopeStatus, ResourceError, ResponseEnvelope};
/// use serde_json::json;
///
/// let ok = ResponseEnvelope::success(json!({ "count": 2 }));
/// assert_eq!(ok.status, EnvelopeStatus::Success);
/// assert_eq!(ok.code, 200);
///
/// let denied = ResponseEnvelope::from_error(&ResourceError::permission_denied("find"), false);
/// assert_eq!(denied.status, EnvelopeStatus::Fail);
/// assert_eq!(denied.code, 401);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Outcome class.
    pub status: EnvelopeStatus,
    /// HTTP status code, repeated in the body.
    pub code: u16,
    /// Human-readable message (`fail` and `error` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Payload on success, field-level validation detail on `fail`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Error source chain, emitted only in debug mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ResponseEnvelope {
    /// Wraps a handler result in a 200 `success` envelope.
    #[must_use]
    pub fn success(data: Value) -> Self {
        Self::success_with_code(StatusCode::OK, data)
    }

    /// Wraps a handler result in a `success` envelope with an explicit code.
    #[must_use]
    pub fn success_with_code(code: StatusCode, data: Value) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            code: code.as_u16(),
            message: None,
            data: Some(data),
            detail: None,
        }
    }

    /// Renders an error as a `fail` (4xx) or `error` envelope.
    ///
    /// `debug` controls whether the error's source chain is included.
    #[must_use]
    pub fn from_error(error: &ResourceError, debug: bool) -> Self {
        let code = error.status_code();
        if code.is_client_error() {
            return Self {
                status: EnvelopeStatus::Fail,
                code: code.as_u16(),
                message: Some(error.to_string()),
                data: error
                    .field_errors()
                    .and_then(|fields| serde_json::to_value(fields).ok()),
                detail: None,
            };
        }

        Self {
            status: EnvelopeStatus::Error,
            code: code.as_u16(),
            message: Some(error.to_string()),
            data: None,
            detail: if debug { error.detail() } else { None },
        }
    }

    /// The 404 `fail` envelope for a request no route matched.
    #[must_use]
    pub fn route_not_found() -> Self {
        Self::from_error(&ResourceError::not_found(ROUTE_NOT_FOUND_MESSAGE), false)
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Serializes the envelope to JSON bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        match serde_json::to_vec(self) {
            Ok(body) => Bytes::from(body),
            Err(error) => {
                tracing::error!(%error, "failed to serialize response envelope");
                Bytes::from_static(
                    br#"{"status":"error","code":500,"message":"Failed to serialize response."}"#,
                )
            }
        }
    }
}
