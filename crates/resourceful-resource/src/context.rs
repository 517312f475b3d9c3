//! The context every pipeline function receives.
//!
//! A [`RequestContext`] bundles the inbound request, the resource's model and
//! the per-request [`Locals`]. It is cheap to clone: the request and model
//! are shared, and clones of the locals refer to the same map, so a value
//! stored by a middleware is visible to the pre-hooks, handler and post-hooks
//! that run after it on the same request.

use std::sync::Arc;

use http::Method;
use resourceful_core::{AuthIdentity, Locals, Request, RequestId, UserIdentity};
use resourceful_router::Params;
use resourceful_store::{Filter, Model};
use serde_json::{Map, Value};

/// Per-request context handed to permissions, middleware, hooks and handlers.
///
/// # Example
///
/// ```
/// use http::Method;
/// use resourceful_core::Request;
/// use resourceful_resource::RequestContext;
/// use resourceful_store::{MemoryStore, ModelOptions, ModelRegistry};
/// use serde_json::json;
///
/// let registry = ModelRegistry::new(MemoryStore::new());
/// let ctx = RequestContext::new(
///     "find",
///     Request::new(Method::GET, "/posts").with_query_string("tag=rust"),
///     registry.model("Post", ModelOptions::default()),
/// );
///
/// ctx.locals().insert("seen", json!(true));
/// assert_eq!(ctx.clone().locals().get("seen"), Some(json!(true)));
/// assert_eq!(ctx.query().get("tag"), Some(&json!("rust")));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    endpoint_id: Arc<str>,
    request: Arc<Request>,
    model: Model,
    locals: Locals,
}

impl RequestContext {
    /// Creates a context with fresh, empty locals.
    pub fn new(endpoint_id: impl Into<Arc<str>>, request: Request, model: Model) -> Self {
        Self {
            endpoint_id: endpoint_id.into(),
            request: Arc::new(request),
            model,
            locals: Locals::new(),
        }
    }

    /// Id of the endpoint being executed.
    pub fn endpoint_id(&self) -> &str {
        &self.endpoint_id
    }

    /// The inbound request.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Request id, for log correlation.
    pub fn request_id(&self) -> RequestId {
        self.request.request_id()
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Parsed JSON body (`Value::Null` when absent).
    pub fn body(&self) -> &Value {
        self.request.body()
    }

    /// Path parameters.
    pub fn params(&self) -> &Params {
        self.request.params()
    }

    /// A single path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.request.param(name)
    }

    /// Decoded query string.
    pub fn query(&self) -> &Map<String, Value> {
        self.request.query()
    }

    /// The query string as a store filter.
    pub fn query_filter(&self) -> Filter {
        Filter::from(self.request.query().clone())
    }

    /// Auth identity, if the caller presented a valid token.
    pub fn auth(&self) -> Option<&AuthIdentity> {
        self.request.auth()
    }

    /// User identity, if the caller's token resolved to a user.
    pub fn user(&self) -> Option<&UserIdentity> {
        self.request.user()
    }

    /// The resource's model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Per-request scratch map.
    pub fn locals(&self) -> &Locals {
        &self.locals
    }
}
