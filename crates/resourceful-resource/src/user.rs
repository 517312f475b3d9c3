//! The user resource: register, login and logout.
//!
//! A user resource is a regular resource whose documents carry `email` and
//! `password`. On top of the defaults it declares:
//!
//! | Id | Route | Open |
//! |----|-------|------|
//! | `register` | `POST /register` | yes |
//! | `login` | `POST /login` | yes |
//! | `logout` | `POST /logout` | no, gated by [`is_tokenized`](crate::access::is_tokenized) |
//!
//! Passwords are hashed by `create`, `update` and `register` before they are
//! stored, and the `password` field is never returned. Tokens are issued by a
//! [`TokenStore`] bound when the host connects.

use std::fmt;
use std::sync::{Arc, OnceLock};

use resourceful_auth::{BcryptHasher, PasswordHasher, TokenStore};
use resourceful_core::{FieldErrors, ResourceError, ResourceResult};
use resourceful_store::Filter;
use serde_json::{json, Value};

use crate::access;
use crate::context::RequestContext;
use crate::controller::Controller;
use crate::endpoint::EndpointSpec;
use crate::error::ResourceConfigError;
use crate::handler::Handler;
use crate::resource::{Resource, ResourceOptions};

const PASSWORD: &str = "password";
const EMAIL: &str = "email";

/// Credential handling shared by the endpoints of one user resource.
pub(crate) struct UserAuth {
    hasher: Arc<dyn PasswordHasher>,
    tokens: OnceLock<TokenStore>,
}

impl fmt::Debug for UserAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAuth")
            .field("bound", &self.tokens.get().is_some())
            .finish_non_exhaustive()
    }
}

impl UserAuth {
    fn tokens(&self) -> ResourceResult<&TokenStore> {
        self.tokens
            .get()
            .ok_or_else(|| ResourceError::internal("The user resource is not connected to a token store."))
    }

    /// Copies `body` with its password, if any, replaced by its hash.
    async fn hash_password(&self, body: &Value) -> ResourceResult<Value> {
        let mut body = body.clone();
        if let Some(Value::String(password)) = body.get_mut(PASSWORD) {
            let hasher = Arc::clone(&self.hasher);
            let plain = std::mem::take(password);
            *password = blocking(move || hasher.hash(&plain))
                .await?
                .map_err(|e| ResourceError::internal_with_source("Failed to hash the password.", e))?;
        }
        Ok(body)
    }

    async fn verify_password(&self, password: String, stored: String) -> ResourceResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        blocking(move || hasher.verify(&password, &stored)).await
    }
}

/// Runs slow hashing work off the async workers.
async fn blocking<T, F>(work: F) -> ResourceResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ResourceError::internal_with_source("Password hashing did not complete.", e))
}

fn credentials(body: &Value) -> ResourceResult<(String, String)> {
    let field = |name: &str| body.get(name).and_then(Value::as_str).filter(|v| !v.is_empty());

    match (field(EMAIL), field(PASSWORD)) {
        (Some(email), Some(password)) => Ok((email.to_string(), password.to_string())),
        (email, password) => {
            let mut errors = FieldErrors::new();
            if email.is_none() {
                errors.add(EMAIL, "An email is required.");
            }
            if password.is_none() {
                errors.add(PASSWORD, "A password is required.");
            }
            Err(ResourceError::validation_with_fields(
                "Both an email and a password are required.",
                errors,
            ))
        }
    }
}

fn with_auth<F, Fut>(controller: &Controller, auth: &Arc<UserAuth>, f: F) -> Handler
where
    F: Fn(Controller, Arc<UserAuth>, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ResourceResult<Value>> + Send + 'static,
{
    let auth = Arc::clone(auth);
    controller.handler(move |controller, ctx| f(controller, Arc::clone(&auth), ctx))
}

fn create(controller: &Controller, auth: &Arc<UserAuth>) -> Handler {
    with_auth(controller, auth, |controller, auth, ctx| async move {
        let document = ctx.model().create(auth.hash_password(ctx.body()).await?).await?;
        Ok(controller.wrap_one(Some(document)))
    })
}

fn update(controller: &Controller, auth: &Arc<UserAuth>) -> Handler {
    with_auth(controller, auth, |controller, auth, ctx| async move {
        let id = controller.target_id(&ctx)?;
        let document = ctx.model().update(&id, auth.hash_password(ctx.body()).await?).await?;
        match document {
            Some(document) => Ok(controller.wrap_one(Some(document))),
            None => Err(controller.missing()),
        }
    })
}

fn register(controller: &Controller, auth: &Arc<UserAuth>) -> Handler {
    with_auth(controller, auth, |controller, auth, ctx| async move {
        credentials(ctx.body())?;
        let tokens = auth.tokens()?;

        let user = ctx
            .model()
            .create_unique(auth.hash_password(ctx.body()).await?, EMAIL)
            .await?
            .ok_or_else(|| ResourceError::conflict("A user with this email already exists."))?;
        let token = tokens.issue(&user).await?;
        let user = controller.present(user);
        Ok(json!({ "user": user, "auth": token }))
    })
}

fn login(controller: &Controller, auth: &Arc<UserAuth>) -> Handler {
    with_auth(controller, auth, |_, auth, ctx| async move {
        let (email, password) = credentials(ctx.body())?;
        let tokens = auth.tokens()?;

        let user = ctx
            .model()
            .find_one(&Filter::new().where_eq(EMAIL, Value::String(email)))
            .await?
            .ok_or_else(|| ResourceError::not_found("No user was found for the given email."))?;

        let stored = user.get(PASSWORD).and_then(Value::as_str).unwrap_or_default().to_string();
        if !auth.verify_password(password, stored).await? {
            return Err(ResourceError::validation("Password is incorrect."));
        }

        let token = tokens.issue(&user).await?;
        Ok(json!({ "auth": token }))
    })
}

fn logout(controller: &Controller, auth: &Arc<UserAuth>) -> Handler {
    with_auth(controller, auth, |_, auth, ctx| async move {
        let token_id = ctx.auth().map(|identity| identity.id.clone());
        if let Some(token_id) = token_id {
            auth.tokens()?.revoke(&token_id).await?;
        }
        Ok(json!({ "auth": null }))
    })
}

impl Resource {
    /// Declares a user resource hashing passwords with a default-cost
    /// [`BcryptHasher`].
    ///
    /// # Errors
    ///
    /// See [`Resource::new`].
    pub fn user(options: ResourceOptions) -> Result<Self, ResourceConfigError> {
        Self::user_with_hasher(options, Arc::new(BcryptHasher::default()))
    }

    /// Declares a user resource with a custom password hasher.
    ///
    /// # Errors
    ///
    /// See [`Resource::new`].
    pub fn user_with_hasher(
        options: ResourceOptions,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self, ResourceConfigError> {
        let mut resource = Self::new(options.hidden_fields([PASSWORD]))?;
        let auth = Arc::new(UserAuth {
            hasher,
            tokens: OnceLock::new(),
        });

        let controller = resource.controller().clone();
        resource.seed(vec![
            ("create", EndpointSpec::new("post", "/", create(&controller, &auth))),
            ("update", EndpointSpec::new("patch", controller.id_path(), update(&controller, &auth))),
            ("register", EndpointSpec::new("post", "/register", register(&controller, &auth)).open(true)),
            ("login", EndpointSpec::new("post", "/login", login(&controller, &auth)).open(true)),
            ("logout", EndpointSpec::new("post", "/logout", logout(&controller, &auth))),
        ])?;
        resource.add_permission("logout", access::is_tokenized())?;
        resource.set_user_auth(auth);
        Ok(resource)
    }

    /// Returns `true` for a user resource.
    pub fn is_auth(&self) -> bool {
        self.user_auth().is_some()
    }

    /// Binds the token store used by `register`, `login` and `logout`.
    ///
    /// # Errors
    ///
    /// Fails when this is not a user resource or a store is already bound.
    pub fn bind_tokens(&self, tokens: TokenStore) -> Result<(), ResourceConfigError> {
        let auth = self.user_auth().ok_or_else(|| ResourceConfigError::AuthBinding {
            resource: self.name().to_string(),
            reason: "it is not a user resource",
        })?;
        auth.tokens
            .set(tokens)
            .map_err(|_| ResourceConfigError::AuthBinding {
                resource: self.name().to_string(),
                reason: "a token store is already bound",
            })
    }
}
