//! Token documents.
//!
//! Every login or registration stores a token document
//! `{ id, userId, email, active: true }` and hands the caller the signed
//! token for its id. Logging out flips `active` to `false`.

use resourceful_core::AuthIdentity;
use resourceful_store::document::document_id;
use resourceful_store::{Document, Model, StoreError, StoreResult};
use serde_json::{json, Value};

use crate::codec::TokenCodec;

/// Field of the issued auth payload carrying the bearer token.
pub const TOKEN_FIELD: &str = "token";

/// Issues, resolves and revokes tokens backed by a token model.
#[derive(Debug, Clone)]
pub struct TokenStore {
    codec: TokenCodec,
    model: Model,
}

impl TokenStore {
    /// Creates a token store.
    pub fn new(codec: TokenCodec, model: Model) -> Self {
        Self { codec, model }
    }

    /// The token model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Stores a token for `user` and returns the token document plus its
    /// signed bearer value under [`TOKEN_FIELD`].
    pub async fn issue(&self, user: &Document) -> StoreResult<Value> {
        let user_id = document_id(user).ok_or_else(|| {
            StoreError::invalid_document(self.model.name(), "Cannot issue a token for a user without an id.")
        })?;
        let email = user.get("email").cloned().unwrap_or(Value::Null);

        let mut token = self
            .model
            .create(json!({ "userId": user_id, "email": email, "active": true }))
            .await?;
        let bearer = document_id(&token).map(|id| self.codec.issue(id));
        if let Some(bearer) = bearer {
            token.insert(TOKEN_FIELD.to_string(), Value::String(bearer));
        }
        Ok(Value::Object(token))
    }

    /// Resolves a bearer token to the auth identity of an active token.
    ///
    /// Returns `None` for a bad signature, an unknown id or a revoked token.
    pub async fn resolve(&self, bearer: &str) -> StoreResult<Option<AuthIdentity>> {
        let Some(id) = self.codec.verify(bearer) else {
            return Ok(None);
        };
        let Some(token) = self.model.find_by_id(id).await? else {
            return Ok(None);
        };
        if token.get("active").and_then(Value::as_bool) != Some(true) {
            return Ok(None);
        }

        Ok(Some(AuthIdentity {
            id: id.to_string(),
            user_id: token
                .get("userId")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            email: token.get("email").and_then(Value::as_str).map(String::from),
        }))
    }

    /// Deactivates the token document `id`.
    pub async fn revoke(&self, id: &str) -> StoreResult<Option<Document>> {
        self.model.update(id, json!({ "active": false })).await
    }
}
