//! The host application.
//!
//! [`App::connect`] wires everything a set of resources needs to serve
//! requests: the model registry, the token model and authenticator, the
//! mounted resource routers and the health check. [`App::handle`] then turns
//! one inbound [`Request`] into one [`ResponseEnvelope`].

use std::sync::Arc;
use std::time::Instant;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode, Uri};
use resourceful_auth::{Authenticator, CodecError, TokenCodec, TokenStore};
use resourceful_core::{Request, ResourceError, ResponseEnvelope};
use resourceful_resource::{Host, Resource, ResourceConfigError, ResourceRouter};
use resourceful_store::{MemoryStore, ModelOptions, ModelRegistry, Store};
use resourceful_telemetry::metrics::UNMATCHED_ENDPOINT;
use resourceful_telemetry::{record_request, InFlightGuard};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming the deployment environment.
pub const ENVIRONMENT_VAR: &str = "RESOURCEFUL_ENV";

/// Environment reported by the health check when [`ENVIRONMENT_VAR`] is unset.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Message of the 400 answered for a body that is not JSON.
pub const MALFORMED_BODY_MESSAGE: &str = "Request body is not valid JSON.";

/// Message of the 400 answered for a form body that cannot be decoded.
pub const MALFORMED_FORM_MESSAGE: &str = "Request body is not valid form data.";

/// Default cap on request body size: 1 MiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Connection options of an [`App`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectOptions {
    /// Parse request bodies as JSON or URL-encoded forms. When off every
    /// body is `null`.
    pub parse: bool,

    /// Include error details in 5xx envelopes.
    pub debug: bool,

    /// Secret the bearer tokens are signed with. Required.
    pub secret: String,

    /// Name of the token resource.
    pub token: String,

    /// Largest accepted request body in bytes. Larger bodies get a 413.
    pub max_body_size: usize,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            parse: true,
            debug: false,
            secret: String::new(),
            token: "Token".to_string(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ConnectOptions {
    /// Default options signing tokens with `secret`.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }

    /// Toggles JSON body parsing.
    #[must_use]
    pub fn parse(mut self, enabled: bool) -> Self {
        self.parse = enabled;
        self
    }

    /// Toggles error details.
    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Renames the token resource.
    #[must_use]
    pub fn token(mut self, name: impl Into<String>) -> Self {
        self.token = name.into();
        self
    }

    /// Caps request bodies at `bytes`.
    #[must_use]
    pub const fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }
}

/// Errors raised by [`App::connect`].
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The token secret is unusable.
    #[error("invalid connection options: {0}")]
    Codec(#[from] CodecError),

    /// The token resource name is empty.
    #[error("invalid connection options: the token resource needs a non-empty name")]
    EmptyTokenName,

    /// A resource failed to compile or bind.
    #[error(transparent)]
    Resource(#[from] ResourceConfigError),
}

/// Mounted resources plus the state shared by every request.
pub struct App {
    options: ConnectOptions,
    registry: ModelRegistry,
    authenticator: Authenticator,
    router: ResourceRouter,
    environment: String,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("options", &self.options)
            .field("models", &self.registry.names())
            .field("routes", &self.router.route_count())
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl Host for App {
    fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    fn mount(&mut self, prefix: &str, router: ResourceRouter) {
        self.router.mount(prefix, router);
    }
}

impl App {
    /// Connects `resources` to an in-memory store.
    ///
    /// # Errors
    ///
    /// See [`App::connect_with_store`].
    pub fn connect(
        options: ConnectOptions,
        resources: impl IntoIterator<Item = Resource>,
    ) -> Result<Self, ConnectError> {
        Self::connect_with_store(options, MemoryStore::new(), resources)
    }

    /// Connects `resources` to `store`.
    ///
    /// The first user resource (see [`Resource::user`]) supplies the user
    /// identities; tokens live in the resource named by
    /// [`ConnectOptions::token`].
    ///
    /// # Errors
    ///
    /// Fails on an empty secret or token name, and on any resource that
    /// cannot be compiled or bound.
    pub fn connect_with_store(
        options: ConnectOptions,
        store: impl Store,
        resources: impl IntoIterator<Item = Resource>,
    ) -> Result<Self, ConnectError> {
        let codec = TokenCodec::new(options.secret.clone())?;
        if options.token.trim().is_empty() {
            return Err(ConnectError::EmptyTokenName);
        }

        let registry = ModelRegistry::new(store);
        let token_model = registry.model(
            &options.token,
            ModelOptions {
                timestamps: true,
                safe: false,
            },
        );
        let tokens = TokenStore::new(codec, token_model);
        let mut resources: Vec<Resource> = resources.into_iter().collect();

        let mut authenticator = Authenticator::new(tokens.clone());
        if let Some(users) = resources.iter().find(|resource| resource.is_auth()) {
            users.bind_tokens(tokens)?;
            authenticator =
                authenticator.with_users(registry.model(users.name(), users.model_options()));
        }

        let environment =
            std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string());

        let mut app = Self {
            options,
            registry,
            authenticator,
            router: ResourceRouter::new(),
            environment,
        };
        for resource in &mut resources {
            resource.attach(&mut app)?;
        }

        info!(
            resources = resources.len(),
            routes = app.router.route_count(),
            environment = %app.environment,
            "application connected"
        );
        Ok(app)
    }

    /// Connection options.
    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    /// The model registry.
    pub fn models(&self) -> &ModelRegistry {
        &self.registry
    }

    /// The mounted routes.
    pub fn router(&self) -> &ResourceRouter {
        &self.router
    }

    /// Environment reported by the health check.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Builds a [`Request`] from raw HTTP parts.
    ///
    /// With parsing on, a `application/x-www-form-urlencoded` body becomes a
    /// JSON object of strings (repeated keys collect into an array) and any
    /// other body is read as JSON.
    ///
    /// # Errors
    ///
    /// Returns a 413 error when the body exceeds
    /// [`ConnectOptions::max_body_size`], and a 400 error when parsing is on
    /// and the body cannot be decoded.
    pub fn parse_request(
        &self,
        method: Method,
        uri: &Uri,
        headers: HeaderMap,
        body: &[u8],
    ) -> Result<Request, ResourceError> {
        if body.len() > self.options.max_body_size {
            return Err(body_too_large(self.options.max_body_size));
        }

        let body = if !self.options.parse || body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else if is_form(&headers) {
            parse_form(body)?
        } else {
            serde_json::from_slice(body)
                .map_err(|_| ResourceError::validation(MALFORMED_BODY_MESSAGE))?
        };
        Ok(Request::new(method, uri.path())
            .with_query_string(uri.query().unwrap_or_default())
            .with_headers(headers)
            .with_body(body))
    }

    /// Parses and handles raw HTTP parts.
    pub async fn handle_http(
        &self,
        method: Method,
        uri: &Uri,
        headers: HeaderMap,
        body: &[u8],
    ) -> ResponseEnvelope {
        match self.parse_request(method, uri, headers, body) {
            Ok(request) => self.handle(request).await,
            Err(error) => {
                debug!(path = %uri.path(), %error, "request body rejected");
                ResponseEnvelope::from_error(&error, self.options.debug)
            }
        }
    }

    /// Populates identities and dispatches to the first matching route.
    pub async fn handle(&self, mut request: Request) -> ResponseEnvelope {
        let started = Instant::now();
        let _in_flight = InFlightGuard::new();

        self.authenticator.populate(&mut request).await;

        let method = request.method().clone();
        let path = request.path().to_string();
        let (label, envelope) = match self.router.match_route(&method, &path) {
            Some(hit) => {
                let endpoint = Arc::clone(hit.value);
                request.set_params(hit.params);
                let envelope = endpoint.handle(request, self.options.debug).await;
                (format!("{}.{}", endpoint.resource(), endpoint.id()), envelope)
            }
            None if method == Method::GET && (path.is_empty() || path == "/") => (
                "health".to_string(),
                ResponseEnvelope::success(json!({ "environment": self.environment })),
            ),
            None => {
                debug!(%method, %path, "no route matched");
                (UNMATCHED_ENDPOINT.to_string(), ResponseEnvelope::route_not_found())
            }
        };

        record_request(&label, envelope.code, started.elapsed());
        envelope
    }
}

/// The 413 answered for a body over `limit` bytes.
pub fn body_too_large(limit: usize) -> ResourceError {
    ResourceError::with_status(
        StatusCode::PAYLOAD_TOO_LARGE,
        format!("Request body exceeds the {limit} byte limit."),
    )
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

fn parse_form(body: &[u8]) -> Result<Value, ResourceError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|_| ResourceError::validation(MALFORMED_FORM_MESSAGE))?;

    let mut fields = Map::new();
    for (key, value) in pairs {
        match fields.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                fields.insert(key, Value::String(value));
            }
        }
    }
    Ok(Value::Object(fields))
}
