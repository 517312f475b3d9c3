//! Documents and the fields the store maintains on them.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// A stored document: a JSON object with a string `id`.
pub type Document = Map<String, Value>;

/// Identifier field.
pub const ID: &str = "id";
/// Creation timestamp, maintained when timestamps are on.
pub const CREATED_AT: &str = "createdAt";
/// Last-write timestamp, maintained when timestamps are on.
pub const UPDATED_AT: &str = "updatedAt";
/// Soft-delete flag, maintained when soft delete is on.
pub const DELETED: &str = "deleted";
/// Soft-delete timestamp, maintained when both soft delete and timestamps are on.
pub const DELETED_AT: &str = "deletedAt";

/// Fields a client may not write through `create` or `update`.
pub const MANAGED_FIELDS: [&str; 5] = [ID, CREATED_AT, UPDATED_AT, DELETED, DELETED_AT];

/// Returns the document's id, if it has a string one.
#[must_use]
pub fn document_id(document: &Document) -> Option<&str> {
    document.get(ID).and_then(Value::as_str)
}

/// Returns `true` if the document carries `deleted: true`.
#[must_use]
pub fn is_soft_deleted(document: &Document) -> bool {
    document.get(DELETED).and_then(Value::as_bool).unwrap_or(false)
}

/// Current time in the RFC 3339 form stored in timestamp fields.
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Unwraps a request body into a document, dropping store-managed fields.
pub fn into_writable(collection: &str, body: Value) -> StoreResult<Document> {
    match body {
        Value::Object(mut fields) => {
            for field in MANAGED_FIELDS {
                fields.remove(field);
            }
            Ok(fields)
        }
        Value::Null => Ok(Document::new()),
        other => Err(StoreError::invalid_document(
            collection,
            format!("Expected a JSON object, got {}.", type_name(&other)),
        )),
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
