//! Per-request identifiers and scratch state.
//!
//! [`RequestId`] tags every request for log correlation. [`Locals`] is the
//! per-request scratch map that permission predicates, middleware, hooks and
//! handlers use to pass ad hoc values to later stages of the same request.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, so request ids sort by arrival in logs.
///
/// # Example
///
/// ```
/// use resourceful_core::RequestId;
///
/// let a = RequestId::new();
/// let b = RequestId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-request scratch map threaded through every pipeline stage.
///
/// A fresh `Locals` is created for each inbound request. Cloning a `Locals`
/// yields a handle to the *same* map, which is how a value written by a
/// middleware becomes visible to the handler that runs after it. Nothing
/// holds a `Locals` beyond the request it was created for.
///
/// # Example
///
/// ```
/// use resourceful_core::Locals;
/// use serde_json::json;
///
/// let locals = Locals::new();
/// let seen_by_handler = locals.clone();
///
/// locals.insert("order", json!(["a"]));
/// assert_eq!(seen_by_handler.get("order"), Some(json!(["a"])));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Locals {
    inner: Arc<Mutex<Map<String, Value>>>,
}

impl Locals {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.inner.lock().insert(key.into(), value)
    }

    /// Returns a copy of the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.lock().get(key).cloned()
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.lock().remove(key)
    }

    /// Returns `true` if a value is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// Applies `f` to the value under `key`, inserting `Value::Null` first if absent.
    ///
    /// The map stays locked for the duration of `f`.
    pub fn update<R>(&self, key: &str, f: impl FnOnce(&mut Value) -> R) -> R {
        let mut map = self.inner.lock();
        let slot = map.entry(key.to_string()).or_insert(Value::Null);
        f(slot)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns a copy of every entry.
    #[must_use]
    pub fn snapshot(&self) -> Map<String, Value> {
        self.inner.lock().clone()
    }
}
