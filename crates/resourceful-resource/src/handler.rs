//! Function values for handlers, hooks, middleware and permissions.
//!
//! Each kind of pipeline function is stored as one boxed-future shape:
//!
//! | Type | Called with | Resolves to |
//! |---|---|---|
//! | [`Handler`] | `RequestContext` | `ResourceResult<Value>` |
//! | [`Hook`] (middleware and pre-hooks) | `RequestContext` | `ResourceResult<()>` |
//! | [`PostHook`] | `RequestContext`, handler value | `ResourceResult<()>` |
//! | [`Permission`] | `RequestContext` | `bool` |
//!
//! `new` adapts an async closure, `from_fn` a synchronous one. Both end up
//! behind the same call path, so the pipeline never needs to know which kind
//! it is running.

use std::future::{ready, Future};
use std::sync::Arc;

use resourceful_core::{BoxFuture, ResourceResult};
use serde::Serialize;
use serde_json::Value;

use crate::context::RequestContext;

type HandlerFn = dyn Fn(RequestContext) -> BoxFuture<'static, ResourceResult<Value>> + Send + Sync;
type HookFn = dyn Fn(RequestContext) -> BoxFuture<'static, ResourceResult<()>> + Send + Sync;
type PostHookFn =
    dyn Fn(RequestContext, Value) -> BoxFuture<'static, ResourceResult<()>> + Send + Sync;
type PermissionFn = dyn Fn(RequestContext) -> BoxFuture<'static, bool> + Send + Sync;

/// An endpoint handler. Its value becomes the `data` of the response.
///
/// # Example
///
/// ```
/// use resourceful_resource::Handler;
/// use serde_json::json;
///
/// let talk = Handler::from_fn(|_ctx| Ok(json!({ "talk": "You look nice today." })));
///
/// let count = Handler::new(|ctx| async move {
///     let n = ctx.model().count(&ctx.query_filter()).await?;
///     Ok(json!({ "count": n }))
/// });
/// # let _ = (talk, count);
/// ```
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    /// Wraps an async handler.
    pub fn new<F, Fut, T>(f: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResourceResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        Self(Arc::new(move |ctx| {
            let fut = f(ctx);
            Box::pin(async move { Ok(serde_json::to_value(fut.await?)?) })
        }))
    }

    /// Wraps a synchronous handler.
    pub fn from_fn<F, T>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> ResourceResult<T> + Send + Sync + 'static,
        T: Serialize,
    {
        Self(Arc::new(move |ctx| {
            let result = f(&ctx).and_then(|value| Ok(serde_json::to_value(value)?));
            Box::pin(ready(result))
        }))
    }

    pub(crate) fn call(&self, ctx: RequestContext) -> BoxFuture<'static, ResourceResult<Value>> {
        (self.0)(ctx)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// A middleware or pre-hook.
///
/// Returning an error aborts the request; the error becomes the response.
#[derive(Clone)]
pub struct Hook(Arc<HookFn>);

impl Hook {
    /// Wraps an async hook.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResourceResult<()>> + Send + 'static,
    {
        Self(Arc::new(move |ctx| Box::pin(f(ctx))))
    }

    /// Wraps a synchronous hook.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> ResourceResult<()> + Send + Sync + 'static,
    {
        Self(Arc::new(move |ctx| Box::pin(ready(f(&ctx)))))
    }

    pub(crate) fn call(&self, ctx: RequestContext) -> BoxFuture<'static, ResourceResult<()>> {
        (self.0)(ctx)
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Hook(..)")
    }
}

/// A post-hook. It observes the handler's value before the response is sent.
#[derive(Clone)]
pub struct PostHook(Arc<PostHookFn>);

impl PostHook {
    /// Wraps an async post-hook.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(RequestContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResourceResult<()>> + Send + 'static,
    {
        Self(Arc::new(move |ctx, value| Box::pin(f(ctx, value))))
    }

    /// Wraps a synchronous post-hook.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&RequestContext, &Value) -> ResourceResult<()> + Send + Sync + 'static,
    {
        Self(Arc::new(move |ctx, value| Box::pin(ready(f(&ctx, &value)))))
    }

    pub(crate) fn call(
        &self,
        ctx: RequestContext,
        value: Value,
    ) -> BoxFuture<'static, ResourceResult<()>> {
        (self.0)(ctx, value)
    }
}

impl std::fmt::Debug for PostHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PostHook(..)")
    }
}

/// A permission predicate.
///
/// See [`access`](crate::access) for the bundled predicates.
#[derive(Clone)]
pub struct Permission(Arc<PermissionFn>);

impl Permission {
    /// Wraps an async predicate.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self(Arc::new(move |ctx| Box::pin(f(ctx))))
    }

    /// Wraps a synchronous predicate.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(move |ctx| Box::pin(ready(f(&ctx)))))
    }

    pub(crate) fn call(&self, ctx: RequestContext) -> BoxFuture<'static, bool> {
        (self.0)(ctx)
    }
}

impl std::fmt::Debug for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Permission(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use resourceful_core::{Request, ResourceError};
    use resourceful_store::{MemoryStore, ModelOptions, ModelRegistry};
    use serde_json::json;

    fn ctx() -> RequestContext {
        let registry = ModelRegistry::new(MemoryStore::new());
        RequestContext::new(
            "find",
            Request::new(Method::GET, "/"),
            registry.model("Post", ModelOptions::default()),
        )
    }

    #[tokio::test]
    async fn test_sync_and_async_handlers_share_one_call_path() {
        let sync = Handler::from_fn(|_| Ok(json!({ "kind": "sync" })));
        let async_ = Handler::new(|_| async { Ok(json!({ "kind": "async" })) });

        assert_eq!(sync.call(ctx()).await.unwrap()["kind"], json!("sync"));
        assert_eq!(async_.call(ctx()).await.unwrap()["kind"], json!("async"));
    }

    #[tokio::test]
    async fn test_handler_serializes_typed_values() {
        #[derive(Serialize)]
        struct Talk {
            talk: &'static str,
        }

        let handler = Handler::new(|_| async { Ok(Talk { talk: "hi" }) });
        assert_eq!(handler.call(ctx()).await.unwrap(), json!({ "talk": "hi" }));
    }

    #[tokio::test]
    async fn test_hook_errors_propagate() {
        let hook = Hook::from_fn(|_| Err(ResourceError::forbidden("no")));
        assert!(hook.call(ctx()).await.is_err());

        let hook = Hook::new(|ctx| async move {
            ctx.locals().insert("ran", json!(true));
            Ok(())
        });
        let shared = ctx();
        hook.call(shared.clone()).await.unwrap();
        assert_eq!(shared.locals().get("ran"), Some(json!(true)));
    }

    #[tokio::test]
    async fn test_post_hook_sees_value() {
        let hook = PostHook::from_fn(|_, value| {
            if value["ok"] == json!(true) {
                Ok(())
            } else {
                Err(ResourceError::internal("unexpected value"))
            }
        });
        assert!(hook.call(ctx(), json!({ "ok": true })).await.is_ok());
        assert!(hook.call(ctx(), json!({ "ok": false })).await.is_err());
    }

    #[tokio::test]
    async fn test_permissions() {
        assert!(Permission::from_fn(|_| true).call(ctx()).await);
        assert!(!Permission::new(|_| async { false }).call(ctx()).await);
    }
}
