//! Fixed-order request pipeline of a compiled endpoint.
//!
//! Every request routed to an endpoint flows through the same stages:
//!
//! ```text
//! Permission → Middleware → PreHook → Handler → PostHook → envelope
//! ```
//!
//! Each stage runs its functions in attachment order and the first error
//! short-circuits the rest. The handler's value is the payload; post-hooks
//! observe it but cannot replace it. All errors end in one place,
//! [`CompiledEndpoint::handle`], which renders the envelope.
//!
//! A resource-wide stage timeout bounds every individual await (each
//! predicate, middleware, hook and the handler), not the request as a whole.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use resourceful_core::{Request, ResourceError, ResourceResult, ResponseEnvelope};
use resourceful_store::Model;
use serde_json::Value;
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::handler::{Handler, Hook, PostHook};
use crate::permission::PermissionGate;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Permission predicates.
    Permission,
    /// Registered middleware.
    Middleware,
    /// Pre-hooks.
    PreHook,
    /// The endpoint handler.
    Handler,
    /// Post-hooks.
    PostHook,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Permission => "permission",
            Self::Middleware => "middleware",
            Self::PreHook => "pre_hook",
            Self::Handler => "handler",
            Self::PostHook => "post_hook",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 5] {
        [
            Self::Permission,
            Self::Middleware,
            Self::PreHook,
            Self::Handler,
            Self::PostHook,
        ]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Awaits `fut`, failing with a timeout error once `limit` elapses.
pub(crate) async fn bounded<F, T>(
    stage: Stage,
    endpoint: &str,
    limit: Option<Duration>,
    fut: F,
) -> ResourceResult<T>
where
    F: Future<Output = ResourceResult<T>>,
{
    let Some(limit) = limit else {
        return fut.await;
    };
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ResourceError::timeout(format!(
            "The {stage} stage of endpoint \"{endpoint}\" did not finish within {}ms.",
            limit.as_millis()
        ))),
    }
}

/// One endpoint of a compiled resource: its route and composed pipeline.
///
/// Compiled endpoints are immutable and shared behind an `Arc` by the router
/// they are registered on.
pub struct CompiledEndpoint {
    pub(crate) resource: Arc<str>,
    pub(crate) id: Arc<str>,
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) model: Model,
    pub(crate) gate: PermissionGate,
    pub(crate) middleware: Vec<Hook>,
    pub(crate) pre_hooks: Vec<Hook>,
    pub(crate) handler: Handler,
    pub(crate) post_hooks: Vec<PostHook>,
    pub(crate) stage_timeout: Option<Duration>,
}

impl fmt::Debug for CompiledEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledEndpoint")
            .field("resource", &self.resource)
            .field("id", &self.id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("open", &self.gate.is_open())
            .field("permissions", &self.gate.len())
            .field("middleware", &self.middleware.len())
            .field("pre_hooks", &self.pre_hooks.len())
            .field("post_hooks", &self.post_hooks.len())
            .finish_non_exhaustive()
    }
}

impl CompiledEndpoint {
    /// Name of the owning resource.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Endpoint id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path pattern, relative to the resource address.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns `true` if the permission gate is bypassed.
    pub fn is_open(&self) -> bool {
        self.gate.is_open()
    }

    /// Runs the pipeline and returns the handler's value.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage, a permission denial, or
    /// a timeout.
    pub async fn run(&self, request: Request) -> ResourceResult<Value> {
        let limit = self.stage_timeout;
        let ctx = RequestContext::new(Arc::clone(&self.id), request, self.model.clone());

        self.gate.check(&ctx, limit).await?;

        for middleware in &self.middleware {
            bounded(Stage::Middleware, &self.id, limit, middleware.call(ctx.clone())).await?;
        }
        for hook in &self.pre_hooks {
            bounded(Stage::PreHook, &self.id, limit, hook.call(ctx.clone())).await?;
        }

        let value = bounded(Stage::Handler, &self.id, limit, self.handler.call(ctx.clone())).await?;

        for hook in &self.post_hooks {
            bounded(Stage::PostHook, &self.id, limit, hook.call(ctx.clone(), value.clone())).await?;
        }

        Ok(value)
    }

    /// Runs the pipeline and renders its outcome as an envelope.
    ///
    /// `debug` controls whether server errors carry their source chain.
    pub async fn handle(&self, request: Request, debug: bool) -> ResponseEnvelope {
        let request_id = request.request_id();
        match self.run(request).await {
            Ok(value) => ResponseEnvelope::success(value),
            Err(error) => {
                if error.is_client_error() {
                    debug!(
                        request_id = %request_id,
                        resource = %self.resource,
                        endpoint = %self.id,
                        status = error.status_code().as_u16(),
                        %error,
                        "request rejected"
                    );
                } else {
                    warn!(
                        request_id = %request_id,
                        resource = %self.resource,
                        endpoint = %self.id,
                        status = error.status_code().as_u16(),
                        error = %error.detail().unwrap_or_else(|| error.to_string()),
                        "request failed"
                    );
                }
                ResponseEnvelope::from_error(&error, debug)
            }
        }
    }
}
