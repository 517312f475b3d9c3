//! Test response wrapper.

use bytes::Bytes;
use http::{header, HeaderMap, StatusCode};
use resourceful_core::{EnvelopeStatus, ResponseEnvelope};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TestError;

/// A rendered response plus the envelope it was rendered from.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    envelope: ResponseEnvelope,
}

impl TestResponse {
    /// Creates a response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes, envelope: ResponseEnvelope) -> Self {
        Self {
            status,
            headers,
            body,
            envelope,
        }
    }

    /// HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// HTTP status as a number.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Body deserialized as `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// The envelope.
    #[must_use]
    pub fn envelope(&self) -> &ResponseEnvelope {
        &self.envelope
    }

    /// Envelope `data`.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.envelope.data.as_ref()
    }

    /// Envelope `data` at a dotted path, e.g. `"post.comments"`.
    #[must_use]
    pub fn data_at(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(self.data()?, |value, key| match value {
                Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => value.get(key),
            })
    }

    /// Envelope `message`.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.envelope.message.as_deref()
    }

    /// Envelope `detail`.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.envelope.detail.as_deref()
    }

    /// Asserts the HTTP status code.
    pub fn assert_status_code(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status_code(),
            expected,
            "expected status {expected}, got {}: {}",
            self.status_code(),
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts a `success` envelope.
    pub fn assert_success(&self) -> &Self {
        assert_eq!(
            self.envelope.status,
            EnvelopeStatus::Success,
            "expected success, got {}",
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts a `fail` envelope with `code`.
    pub fn assert_fail(&self, code: u16) -> &Self {
        assert_eq!(
            self.envelope.status,
            EnvelopeStatus::Fail,
            "expected fail, got {}",
            String::from_utf8_lossy(&self.body)
        );
        self.assert_status_code(code)
    }

    /// Asserts an `error` envelope with `code`.
    pub fn assert_error(&self, code: u16) -> &Self {
        assert_eq!(
            self.envelope.status,
            EnvelopeStatus::Error,
            "expected error, got {}",
            String::from_utf8_lossy(&self.body)
        );
        self.assert_status_code(code)
    }

    /// Asserts the `Content-Type` starts with `expected`.
    pub fn assert_content_type(&self, expected: &str) -> &Self {
        let actual = self.content_type().unwrap_or_default();
        assert!(
            actual.starts_with(expected),
            "Content-Type: expected '{expected}', got '{actual}'"
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(envelope: ResponseEnvelope) -> TestResponse {
        TestResponse::new(
            envelope.status_code(),
            HeaderMap::new(),
            envelope.to_bytes(),
            envelope,
        )
    }

    #[test]
    fn test_data_at_walks_objects_and_arrays() {
        let response = response(ResponseEnvelope::success(json!({
            "posts": [{ "title": "a" }, { "title": "b" }]
        })));
        assert_eq!(response.data_at("posts.1.title"), Some(&json!("b")));
        assert_eq!(response.data_at("posts.9.title"), None);
        assert_eq!(response.data_at("missing"), None);
    }

    #[test]
    fn test_body_matches_envelope() {
        let response = response(ResponseEnvelope::route_not_found());
        response.assert_fail(404);
        let parsed: ResponseEnvelope = response.json().unwrap();
        assert_eq!(&parsed, response.envelope());
        assert!(response.text().unwrap().contains("\"fail\""));
    }

    #[test]
    #[should_panic(expected = "expected error")]
    fn test_assert_error_on_fail_panics() {
        response(ResponseEnvelope::route_not_found()).assert_error(404);
    }
}
