//! Caller identities resolved before the permission stage.
//!
//! Two identities ride on every request:
//!
//! - [`AuthIdentity`] - the token the caller presented, as recorded in the
//!   token collection
//! - [`UserIdentity`] - the user document that token belongs to
//!
//! Either may be absent. A request with no (or an invalid) bearer credential
//! carries neither; that is not an error, it just fails predicates that look
//! for them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The token a caller authenticated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthIdentity {
    /// Id of the token document.
    pub id: String,
    /// Id of the user the token was issued to.
    pub user_id: String,
    /// Email the token was issued for, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AuthIdentity {
    /// Returns `true` if the identity names a token.
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.id.is_empty()
    }
}

/// The user document an authenticated request acts as.
///
/// The document is kept whole (minus its password) so handlers and
/// predicates can read any field of it.
///
/// # Example
///
/// ```
/// use resourceful_core::UserIdentity;
/// use serde_json::json;
///
/// let user = UserIdentity::from_document(json!({
///     "id": "u1",
///     "email": "ada@example.com",
///     "password": "secret-hash",
/// }))
/// .unwrap();
///
/// assert_eq!(user.id(), "u1");
/// assert_eq!(user.get("email"), Some(&json!("ada@example.com")));
/// assert!(user.get("password").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    id: String,
    document: Map<String, Value>,
}

impl UserIdentity {
    /// Builds an identity from a stored user document.
    ///
    /// Returns `None` when the document is not an object or has no string `id`.
    /// A `password` field is dropped.
    #[must_use]
    pub fn from_document(document: Value) -> Option<Self> {
        let Value::Object(mut document) = document else {
            return None;
        };
        let id = document.get("id")?.as_str()?.to_string();
        document.remove("password");
        Some(Self { id, document })
    }

    /// Returns the user's id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns a field of the user document.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.document.get(field)
    }

    /// Returns the full user document.
    #[must_use]
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }
}
