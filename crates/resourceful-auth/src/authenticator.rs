//! Populating caller identities on inbound requests.

use resourceful_core::{Request, UserIdentity};
use resourceful_store::Model;
use tracing::{debug, warn};

use crate::tokens::TokenStore;

/// Resolves the auth and user identities of a request.
///
/// The bearer credential resolves an [`AuthIdentity`](resourceful_core::AuthIdentity)
/// through the token store; when a user model is configured, the token's
/// `userId` then resolves a [`UserIdentity`]. Missing or invalid credentials,
/// and store failures, leave the identities empty.
#[derive(Debug, Clone)]
pub struct Authenticator {
    tokens: TokenStore,
    users: Option<Model>,
}

impl Authenticator {
    /// Creates an authenticator that only resolves tokens.
    pub fn new(tokens: TokenStore) -> Self {
        Self {
            tokens,
            users: None,
        }
    }

    /// Also resolve user identities from `users`.
    #[must_use]
    pub fn with_users(mut self, users: Model) -> Self {
        self.users = Some(users);
        self
    }

    /// The token store.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Sets the request's auth and user identities.
    pub async fn populate(&self, request: &mut Request) {
        request.set_auth(None);
        request.set_user(None);

        let Some(bearer) = request.bearer_token().map(str::to_string) else {
            return;
        };

        let auth = match self.tokens.resolve(&bearer).await {
            Ok(Some(auth)) => auth,
            Ok(None) => {
                debug!(request_id = %request.request_id(), "bearer token rejected");
                return;
            }
            Err(error) => {
                warn!(request_id = %request.request_id(), %error, "token lookup failed");
                return;
            }
        };

        let user = match &self.users {
            Some(users) => match users.find_by_id(&auth.user_id).await {
                Ok(found) => found.and_then(|doc| UserIdentity::from_document(doc.into())),
                Err(error) => {
                    warn!(request_id = %request.request_id(), %error, "user lookup failed");
                    None
                }
            },
            None => None,
        };

        request.set_auth(Some(auth));
        request.set_user(user);
    }
}
