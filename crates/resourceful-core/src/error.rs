//! Error types for request-time failures.
//!
//! This module provides the [`ResourceError`] type, the single error type that
//! flows out of permission predicates, middleware, hooks and handlers. Every
//! error maps to an [`ErrorCategory`], and the category decides both the HTTP
//! status code and whether the response envelope is a `fail` (client input
//! problem, 4xx) or an `error` (server problem, 5xx).
//!
//! | `ErrorCategory` | Status | Envelope |
//! |---|---|---|
//! | `Validation` | 400 | `fail` |
//! | `Unauthorized` | 401 | `fail` |
//! | `Forbidden` | 403 | `fail` |
//! | `NotFound` | 404 | `fail` |
//! | `Conflict` | 409 | `fail` |
//! | `Internal` | 500 | `error` |
//! | `Timeout` | 504 | `error` |
//!
//! Handlers that need a status outside this table use [`ResourceError::with_status`].

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias using [`ResourceError`].
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Categories of request-time errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request validation errors (malformed body, missing fields).
    Validation,
    /// Missing or rejected credentials, or a denied permission gate.
    Unauthorized,
    /// Authenticated but not allowed.
    Forbidden,
    /// Resource not found.
    NotFound,
    /// Conflict (e.g., duplicate unique field).
    Conflict,
    /// Internal server errors.
    Internal,
    /// A pipeline stage did not settle within its bound.
    Timeout,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

/// Request-time error raised anywhere in a resource pipeline.
///
/// # Example
///
/// ```
/// use resourceful_core::{ResourceError, ErrorCategory};
///
/// fn require_title(title: Option<&str>) -> Result<&str, ResourceError> {
///     title.ok_or_else(|| ResourceError::validation("A title is required."))
/// }
///
/// let err = require_title(None).unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::Validation);
/// ```
#[derive(Error, Debug)]
pub enum ResourceError {
    /// Request validation failed.
    #[error("{message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// Field-specific validation errors.
        field_errors: Option<FieldErrors>,
    },

    /// Credentials missing or the permission gate denied the request.
    #[error("{message}")]
    Unauthorized {
        /// Human-readable error message.
        message: String,
        /// The endpoint whose gate denied the request.
        endpoint_id: Option<String>,
    },

    /// Authenticated caller is not allowed.
    #[error("{message}")]
    Forbidden {
        /// Human-readable error message.
        message: String,
    },

    /// Resource not found.
    #[error("{message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Conflicting state.
    #[error("{message}")]
    Conflict {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("{message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (surfaced only in debug mode).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A stage exceeded its time bound.
    #[error("{message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
    },

    /// Error carrying an explicit status code chosen by a handler.
    #[error("{message}")]
    Status {
        /// HTTP status code (4xx renders as `fail`, anything else as `error`).
        status: StatusCode,
        /// Human-readable error message.
        message: String,
    },
}

impl ResourceError {
    /// Creates a validation error with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Creates a validation error with field-specific errors.
    #[must_use]
    pub fn validation_with_fields(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            endpoint_id: None,
        }
    }

    /// Creates the error returned when an endpoint's permission gate denies access.
    #[must_use]
    pub fn permission_denied(endpoint_id: impl Into<String>) -> Self {
        let endpoint_id = endpoint_id.into();
        Self::Unauthorized {
            message: format!("Permission denied for endpoint \"{endpoint_id}\"."),
            endpoint_id: Some(endpoint_id),
        }
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates an error with an explicit status code.
    #[must_use]
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Unauthorized { .. } => ErrorCategory::Unauthorized,
            Self::Forbidden { .. } => ErrorCategory::Forbidden,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Internal { .. } => ErrorCategory::Internal,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Status { status, .. } => match *status {
                StatusCode::BAD_REQUEST => ErrorCategory::Validation,
                StatusCode::UNAUTHORIZED => ErrorCategory::Unauthorized,
                StatusCode::FORBIDDEN => ErrorCategory::Forbidden,
                StatusCode::NOT_FOUND => ErrorCategory::NotFound,
                StatusCode::CONFLICT => ErrorCategory::Conflict,
                StatusCode::GATEWAY_TIMEOUT => ErrorCategory::Timeout,
                s if s.is_client_error() => ErrorCategory::Validation,
                _ => ErrorCategory::Internal,
            },
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => *status,
            other => other.category().default_status_code(),
        }
    }

    /// Returns `true` when the error describes a problem with the client's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Returns field-level validation detail, if any.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { field_errors, .. } => field_errors.as_ref(),
            _ => None,
        }
    }

    /// Renders the chain of underlying causes, outermost first.
    ///
    /// Returns `None` when the error has no source.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Internal {
                source: Some(source),
                ..
            } => Some(format!("{source:#}")),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ResourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal_with_source("Failed to serialize a response payload.", err)
    }
}

/// Field-specific validation errors.
///
/// Serializes as a plain map of field name to messages so it can be used
/// directly as the `data` of a `fail` envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates a new empty `FieldErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns the messages recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Returns `true` if there are no field errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = ResourceError::validation("Invalid email format");
        assert_eq!(error.category(), ErrorCategory::Validation);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(error.is_client_error());
        assert_eq!(error.to_string(), "Invalid email format");
    }

    #[test]
    fn test_validation_error_with_fields() {
        let mut field_errors = FieldErrors::new();
        field_errors.add("password", "Path `password` is required.");
        field_errors.add("email", "Invalid format");

        let error = ResourceError::validation_with_fields("Validation failed", field_errors);
        let fields = error.field_errors().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("password").unwrap().len(), 1);
    }

    #[test]
    fn test_permission_denied() {
        let error = ResourceError::permission_denied("find");
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
        assert!(error.to_string().contains("find"));
    }

    #[test]
    fn test_internal_error_detail() {
        let error = ResourceError::internal_with_source(
            "store failed",
            anyhow::anyhow!("connection reset"),
        );
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!error.is_client_error());
        assert_eq!(error.detail().as_deref(), Some("connection reset"));
        assert!(ResourceError::internal("plain").detail().is_none());
    }

    #[test]
    fn test_explicit_status() {
        let error = ResourceError::with_status(StatusCode::IM_A_TEAPOT, "short and stout");
        assert_eq!(error.status_code(), StatusCode::IM_A_TEAPOT);
        assert_eq!(error.category(), ErrorCategory::Validation);
        assert!(error.is_client_error());

        let error = ResourceError::with_status(StatusCode::BAD_GATEWAY, "upstream");
        assert_eq!(error.category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let mut errors = FieldErrors::new();
        errors.add("password", "required");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "password": ["required"] }));
    }

    #[test]
    fn test_all_error_categories_have_error_status_codes() {
        let categories = [
            ErrorCategory::Validation,
            ErrorCategory::Unauthorized,
            ErrorCategory::Forbidden,
            ErrorCategory::NotFound,
            ErrorCategory::Conflict,
            ErrorCategory::Internal,
            ErrorCategory::Timeout,
        ];

        for category in categories {
            let status = category.default_status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "Category {:?} should map to error status code, got {}",
                category,
                status
            );
        }
    }
}
