//! Resource declaration, compilation and attachment.
//!
//! A [`Resource`] is mutable until [`Resource::compile`] runs. Compiling
//! orders the endpoint table by path specificity, composes one
//! [`CompiledEndpoint`] per endpoint and registers them on a fresh router.
//! After that the resource is sealed: every further mutation fails with
//! [`ResourceConfigError::AlreadyCompiled`].

use std::sync::Arc;
use std::time::Duration;

use resourceful_router::{order_by_specificity, Router};
use resourceful_store::{ModelOptions, ModelRegistry};
use tracing::debug;

use crate::controller::Controller;
use crate::endpoint::{Endpoint, EndpointSpec, EndpointTable};
use crate::error::ResourceConfigError;
use crate::extensions::Extensions;
use crate::handler::{Hook, Permission, PostHook};
use crate::naming::{camel_case, plural, singular};
use crate::permission::{PermissionGate, PermissionMode};
use crate::pipeline::CompiledEndpoint;
use crate::user::UserAuth;

/// The router a compiled resource mounts on its host.
pub type ResourceRouter = Router<Arc<CompiledEndpoint>>;

/// Where compiled resources are mounted.
pub trait Host {
    /// Registry the resource binds its model through.
    fn registry(&self) -> &ModelRegistry;

    /// Mounts `router` under `prefix`.
    fn mount(&mut self, prefix: &str, router: ResourceRouter);
}

/// Construction options of a [`Resource`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use resourceful_resource::{PermissionMode, ResourceOptions};
///
/// let options = ResourceOptions::new("BlogPost")
///     .disable(["remove"])
///     .permission_mode(PermissionMode::All)
///     .stage_timeout(Duration::from_secs(5));
/// assert!(options.is_timestamped() && options.is_safe());
/// ```
#[derive(Debug, Clone)]
pub struct ResourceOptions {
    name: String,
    address: Option<String>,
    disable: Vec<String>,
    unsecure: bool,
    timestamps: bool,
    safe: bool,
    permission_mode: PermissionMode,
    stage_timeout: Option<Duration>,
    hidden_fields: Vec<String>,
}

impl ResourceOptions {
    /// Options for a resource named `name`, with timestamps and soft
    /// delete on and every endpoint secured.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            disable: Vec::new(),
            unsecure: false,
            timestamps: true,
            safe: true,
            permission_mode: PermissionMode::Any,
            stage_timeout: None,
            hidden_fields: Vec::new(),
        }
    }

    /// Mounts the resource at `address` instead of the pluralized name.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Removes default endpoints by id.
    #[must_use]
    pub fn disable<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disable.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Makes endpoints without an explicit `open` flag open.
    #[must_use]
    pub const fn unsecure(mut self, unsecure: bool) -> Self {
        self.unsecure = unsecure;
        self
    }

    /// Maintains `createdAt` / `updatedAt` (default on).
    #[must_use]
    pub const fn timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Soft-deletes documents (default on).
    #[must_use]
    pub const fn safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    /// How an endpoint's predicates are combined (default [`PermissionMode::Any`]).
    #[must_use]
    pub const fn permission_mode(mut self, mode: PermissionMode) -> Self {
        self.permission_mode = mode;
        self
    }

    /// Bounds every predicate, middleware, hook and handler await.
    #[must_use]
    pub const fn stage_timeout(mut self, limit: Duration) -> Self {
        self.stage_timeout = Some(limit);
        self
    }

    /// Fields stripped from documents returned by the default handlers.
    #[must_use]
    pub fn hidden_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// The declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if endpoints default to open.
    pub const fn is_unsecure(&self) -> bool {
        self.unsecure
    }

    /// Returns `true` if timestamps are maintained.
    pub const fn is_timestamped(&self) -> bool {
        self.timestamps
    }

    /// Returns `true` if documents are soft-deleted.
    pub const fn is_safe(&self) -> bool {
        self.safe
    }

    /// The permission mode.
    pub const fn mode(&self) -> PermissionMode {
        self.permission_mode
    }

    /// The stage timeout, if any.
    pub const fn timeout(&self) -> Option<Duration> {
        self.stage_timeout
    }

    pub(crate) fn hidden(&self) -> &[String] {
        &self.hidden_fields
    }

    pub(crate) fn is_disabled(&self, id: &str) -> bool {
        self.disable.iter().any(|disabled| disabled == id)
    }
}

/// A declared resource.
///
/// # Example
///
/// ```
/// use resourceful_resource::{access, EndpointSpec, Handler, Hook, Resource, ResourceOptions};
/// use resourceful_store::{MemoryStore, ModelRegistry};
/// use serde_json::json;
///
/// let mut example = Resource::new(ResourceOptions::new("example"))?;
/// example
///     .add_endpoint(
///         "niceTalk",
///         EndpointSpec::new("get", "/nice/talk", Handler::from_fn(|_| Ok(json!({ "talk": "hi" })))),
///     )?
///     .add_permission("niceTalk", access::is_anyone())?
///     .add_pre_hook("find", Hook::from_fn(|ctx| {
///         ctx.locals().insert("seen", json!(true));
///         Ok(())
///     }))?;
///
/// assert_eq!(example.address(), "/examples");
///
/// let registry = ModelRegistry::new(MemoryStore::new());
/// let routes = example.compile(&registry)?.route_count();
/// assert_eq!(routes, 8);
/// assert!(example.compile(&registry).is_err());
/// # Ok::<(), resourceful_resource::ResourceConfigError>(())
/// ```
#[derive(Debug)]
pub struct Resource {
    options: ResourceOptions,
    resource_name: String,
    address: String,
    endpoints: EndpointTable,
    extensions: Extensions,
    controller: Controller,
    auth: Option<Arc<UserAuth>>,
    router: Option<ResourceRouter>,
}

impl Resource {
    /// Declares a resource with the default CRUD endpoints, minus any
    /// disabled ids.
    ///
    /// # Errors
    ///
    /// Fails when the name is empty or the explicit address does not start
    /// with `/`.
    pub fn new(options: ResourceOptions) -> Result<Self, ResourceConfigError> {
        if options.name.trim().is_empty() {
            return Err(ResourceConfigError::EmptyName);
        }

        let resource_name = camel_case(&singular(&options.name));
        let address = match &options.address {
            Some(address) if address.starts_with('/') => address.clone(),
            Some(address) => {
                return Err(ResourceConfigError::InvalidAddress {
                    resource: options.name.clone(),
                    address: address.clone(),
                })
            }
            None => format!("/{}", camel_case(&plural(&options.name))),
        };
        let controller = Controller::new(&resource_name, options.hidden());

        let mut resource = Self {
            options,
            resource_name,
            address,
            endpoints: EndpointTable::default(),
            extensions: Extensions::default(),
            controller,
            auth: None,
            router: None,
        };
        let defaults = resource.controller.defaults();
        resource.seed(defaults)?;
        Ok(resource)
    }

    /// Adds endpoints that are not disabled.
    pub(crate) fn seed(
        &mut self,
        endpoints: Vec<(&'static str, EndpointSpec)>,
    ) -> Result<(), ResourceConfigError> {
        for (id, spec) in endpoints {
            if !self.options.is_disabled(id) {
                let endpoint = spec.validate(&self.options.name, id)?;
                self.endpoints.upsert(endpoint);
            }
        }
        Ok(())
    }

    /// The declared name; the model is bound under it.
    pub fn name(&self) -> &str {
        &self.options.name
    }

    /// camelCase singular name (`"BlogPost"` -> `"blogPost"`).
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// Mount address (`"BlogPost"` -> `"/blogPosts"`).
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Construction options.
    pub fn options(&self) -> &ResourceOptions {
        &self.options
    }

    /// Model behavior derived from the options.
    pub const fn model_options(&self) -> ModelOptions {
        ModelOptions {
            timestamps: self.options.timestamps,
            safe: self.options.safe,
        }
    }

    /// The endpoint table.
    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    /// The extension maps.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns `true` once [`compile`](Self::compile) has run.
    pub fn is_compiled(&self) -> bool {
        self.router.is_some()
    }

    /// The compiled router, if compiled.
    pub fn router(&self) -> Option<&ResourceRouter> {
        self.router.as_ref()
    }

    pub(crate) fn controller(&self) -> &Controller {
        &self.controller
    }

    pub(crate) fn user_auth(&self) -> Option<&Arc<UserAuth>> {
        self.auth.as_ref()
    }

    pub(crate) fn set_user_auth(&mut self, auth: Arc<UserAuth>) {
        self.auth = Some(auth);
    }

    fn ensure_mutable(&self, operation: &'static str, id: &str) -> Result<(), ResourceConfigError> {
        if self.is_compiled() {
            return Err(ResourceConfigError::AlreadyCompiled {
                resource: self.options.name.clone(),
            });
        }
        if id.trim().is_empty() {
            return Err(ResourceConfigError::EmptyEndpointId {
                resource: self.options.name.clone(),
                operation,
            });
        }
        Ok(())
    }

    /// Declares or replaces the endpoint `id`.
    ///
    /// # Errors
    ///
    /// Fails after compile, on an empty id, or when the method or path is
    /// invalid.
    pub fn add_endpoint(
        &mut self,
        id: &str,
        spec: EndpointSpec,
    ) -> Result<&mut Self, ResourceConfigError> {
        self.ensure_mutable("add_endpoint", id)?;
        let endpoint = spec.validate(&self.options.name, id)?;
        self.endpoints.upsert(endpoint);
        Ok(self)
    }

    /// Appends middleware to endpoint `id`.
    ///
    /// # Errors
    ///
    /// Fails after compile or on an empty id.
    pub fn add_middleware(&mut self, id: &str, hook: Hook) -> Result<&mut Self, ResourceConfigError> {
        self.ensure_mutable("add_middleware", id)?;
        self.extensions.middleware.push(id, hook);
        Ok(self)
    }

    /// Appends a pre-hook to endpoint `id`.
    ///
    /// # Errors
    ///
    /// Fails after compile or on an empty id.
    pub fn add_pre_hook(&mut self, id: &str, hook: Hook) -> Result<&mut Self, ResourceConfigError> {
        self.ensure_mutable("add_pre_hook", id)?;
        self.extensions.pre_hooks.push(id, hook);
        Ok(self)
    }

    /// Appends a post-hook to endpoint `id`.
    ///
    /// # Errors
    ///
    /// Fails after compile or on an empty id.
    pub fn add_post_hook(
        &mut self,
        id: &str,
        hook: PostHook,
    ) -> Result<&mut Self, ResourceConfigError> {
        self.ensure_mutable("add_post_hook", id)?;
        self.extensions.post_hooks.push(id, hook);
        Ok(self)
    }

    /// Appends a permission predicate to endpoint `id`.
    ///
    /// # Errors
    ///
    /// Fails after compile or on an empty id.
    pub fn add_permission(
        &mut self,
        id: &str,
        permission: Permission,
    ) -> Result<&mut Self, ResourceConfigError> {
        self.ensure_mutable("add_permission", id)?;
        self.extensions.permissions.push(id, permission);
        Ok(self)
    }

    /// Scopes further registrations to endpoint `id`.
    ///
    /// ```
    /// use resourceful_resource::{access, Hook, Resource, ResourceOptions};
    ///
    /// let mut posts = Resource::new(ResourceOptions::new("Post"))?;
    /// posts
    ///     .route("find")
    ///     .permission(access::is_anyone())?
    ///     .pre_hook(Hook::from_fn(|_| Ok(())))?;
    /// assert_eq!(posts.extensions().pre_hooks.get("find").len(), 1);
    /// # Ok::<(), resourceful_resource::ResourceConfigError>(())
    /// ```
    pub fn route<'a>(&'a mut self, id: &'a str) -> EndpointRoute<'a> {
        EndpointRoute { resource: self, id }
    }

    /// Seals the resource and builds its router.
    ///
    /// Binds the model through `registry`, orders endpoints by path
    /// specificity and composes each endpoint's pipeline.
    ///
    /// # Errors
    ///
    /// Fails with [`ResourceConfigError::AlreadyCompiled`] on a second call.
    pub fn compile(&mut self, registry: &ModelRegistry) -> Result<&ResourceRouter, ResourceConfigError> {
        if self.is_compiled() {
            return Err(ResourceConfigError::AlreadyCompiled {
                resource: self.options.name.clone(),
            });
        }

        let model = registry.model(&self.options.name, self.model_options());
        let resource: Arc<str> = self.options.name.as_str().into();

        for id in self.extensions.dangling_ids(|id| self.endpoints.contains(id)) {
            debug!(resource = %resource, endpoint = id, "extensions attached to an undeclared endpoint are ignored");
        }

        let mut ordered: Vec<&Endpoint> = self.endpoints.iter().collect();
        order_by_specificity(&mut ordered, |endpoint| endpoint.path());

        let mut router = Router::new();
        for endpoint in ordered {
            let open = endpoint.open.unwrap_or(self.options.unsecure);
            let compiled = CompiledEndpoint {
                resource: Arc::clone(&resource),
                id: endpoint.id.as_str().into(),
                method: endpoint.method.clone(),
                path: endpoint.path.clone(),
                model: model.clone(),
                gate: PermissionGate::new(
                    open,
                    self.options.permission_mode,
                    self.extensions.permissions.cloned(&endpoint.id),
                ),
                middleware: self.extensions.middleware.cloned(&endpoint.id),
                pre_hooks: self.extensions.pre_hooks.cloned(&endpoint.id),
                handler: endpoint.handler.clone(),
                post_hooks: self.extensions.post_hooks.cloned(&endpoint.id),
                stage_timeout: self.options.stage_timeout,
            };
            debug!(
                resource = %resource,
                endpoint = %endpoint.id,
                method = %endpoint.method,
                path = %endpoint.path,
                open,
                "registered endpoint"
            );
            router.add_route(endpoint.method.clone(), &endpoint.path, Arc::new(compiled));
        }

        Ok(self.router.insert(router))
    }

    /// Compiles if needed and mounts the router at the resource address.
    ///
    /// Attaching twice mounts the routes twice.
    ///
    /// # Errors
    ///
    /// Propagates compile errors.
    pub fn attach(&mut self, host: &mut impl Host) -> Result<(), ResourceConfigError> {
        let router = match &self.router {
            Some(router) => router.clone(),
            None => self.compile(host.registry())?.clone(),
        };
        debug!(resource = %self.options.name, address = %self.address, routes = router.route_count(), "attached resource");
        host.mount(&self.address, router);
        Ok(())
    }
}

/// Registrations scoped to one endpoint id. See [`Resource::route`].
#[derive(Debug)]
pub struct EndpointRoute<'a> {
    resource: &'a mut Resource,
    id: &'a str,
}

impl EndpointRoute<'_> {
    /// Appends middleware.
    ///
    /// # Errors
    ///
    /// See [`Resource::add_middleware`].
    pub fn middleware(&mut self, hook: Hook) -> Result<&mut Self, ResourceConfigError> {
        self.resource.add_middleware(self.id, hook)?;
        Ok(self)
    }

    /// Appends a pre-hook.
    ///
    /// # Errors
    ///
    /// See [`Resource::add_pre_hook`].
    pub fn pre_hook(&mut self, hook: Hook) -> Result<&mut Self, ResourceConfigError> {
        self.resource.add_pre_hook(self.id, hook)?;
        Ok(self)
    }

    /// Appends a post-hook.
    ///
    /// # Errors
    ///
    /// See [`Resource::add_post_hook`].
    pub fn post_hook(&mut self, hook: PostHook) -> Result<&mut Self, ResourceConfigError> {
        self.resource.add_post_hook(self.id, hook)?;
        Ok(self)
    }

    /// Appends a permission predicate.
    ///
    /// # Errors
    ///
    /// See [`Resource::add_permission`].
    pub fn permission(&mut self, permission: Permission) -> Result<&mut Self, ResourceConfigError> {
        self.resource.add_permission(self.id, permission)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;
    use http::Method;
    use resourceful_store::MemoryStore;
    use serde_json::{json, Value};

    fn registry() -> ModelRegistry {
        ModelRegistry::new(MemoryStore::new())
    }

    fn noop() -> Handler {
        Handler::from_fn(|_| Ok(Value::Null))
    }

    struct TestHost {
        registry: ModelRegistry,
        router: ResourceRouter,
    }

    impl Host for TestHost {
        fn registry(&self) -> &ModelRegistry {
            &self.registry
        }

        fn mount(&mut self, prefix: &str, router: ResourceRouter) {
            self.router.mount(prefix, router);
        }
    }

    #[test]
    fn test_naming() {
        let resource = Resource::new(ResourceOptions::new("BlogPost")).unwrap();
        assert_eq!(resource.name(), "BlogPost");
        assert_eq!(resource.resource_name(), "blogPost");
        assert_eq!(resource.address(), "/blogPosts");
        assert_eq!(resource.endpoints().get("findById").unwrap().path(), "/:blogPostId");

        let resource = Resource::new(ResourceOptions::new("User").address("/people")).unwrap();
        assert_eq!(resource.address(), "/people");
    }

    #[test]
    fn test_rejects_bad_declarations() {
        assert_eq!(
            Resource::new(ResourceOptions::new("  ")).unwrap_err(),
            ResourceConfigError::EmptyName
        );
        assert!(matches!(
            Resource::new(ResourceOptions::new("Post").address("posts")).unwrap_err(),
            ResourceConfigError::InvalidAddress { .. }
        ));

        let mut resource = Resource::new(ResourceOptions::new("Post")).unwrap();
        assert!(matches!(
            resource.add_pre_hook("", Hook::from_fn(|_| Ok(()))).unwrap_err(),
            ResourceConfigError::EmptyEndpointId { operation: "add_pre_hook", .. }
        ));
        assert!(matches!(
            resource
                .add_endpoint("x", EndpointSpec::new("head", "/x", noop()))
                .unwrap_err(),
            ResourceConfigError::InvalidMethod { .. }
        ));
    }

    #[test]
    fn test_disable_removes_defaults() {
        let resource = Resource::new(ResourceOptions::new("Post").disable(["remove", "count"])).unwrap();
        let ids: Vec<_> = resource.endpoints().ids().collect();
        assert_eq!(ids, vec!["find", "findOne", "findById", "create", "update"]);
    }

    #[test]
    fn test_specific_routes_register_first() {
        let mut resource = Resource::new(ResourceOptions::new("Post").unsecure(true)).unwrap();
        resource
            .add_endpoint("latest", EndpointSpec::new("get", "/latest/:n", noop()))
            .unwrap();
        let router = resource.compile(&registry()).unwrap();

        let get_routes: Vec<_> = router
            .routes()
            .filter(|(method, _)| **method == Method::GET)
            .map(|(_, pattern)| pattern.to_string())
            .collect();
        assert_eq!(get_routes, vec!["/latest/:n", "/count", "/one", "/:postId", "/"]);

        let hit = router.match_route(&Method::GET, "/count").unwrap();
        assert_eq!(hit.value.id(), "count");
        let hit = router.match_route(&Method::GET, "/abc").unwrap();
        assert_eq!(hit.value.id(), "findById");
    }

    #[test]
    fn test_second_compile_fails_and_changes_nothing() {
        let registry = registry();
        let mut resource = Resource::new(ResourceOptions::new("Post")).unwrap();
        let before = resource.compile(&registry).unwrap().route_count();

        let err = resource.compile(&registry).unwrap_err();
        assert_eq!(
            err,
            ResourceConfigError::AlreadyCompiled {
                resource: "Post".to_string()
            }
        );
        assert_eq!(resource.router().unwrap().route_count(), before);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_mutation_after_compile_fails() {
        let mut resource = Resource::new(ResourceOptions::new("Post")).unwrap();
        resource.compile(&registry()).unwrap();

        let sealed = |err: ResourceConfigError| matches!(err, ResourceConfigError::AlreadyCompiled { .. });
        assert!(sealed(
            resource
                .add_endpoint("x", EndpointSpec::new("get", "/x", noop()))
                .unwrap_err()
        ));
        assert!(sealed(resource.add_middleware("find", Hook::from_fn(|_| Ok(()))).unwrap_err()));
        assert!(sealed(
            resource
                .add_post_hook("find", PostHook::from_fn(|_, _| Ok(())))
                .unwrap_err()
        ));
        assert!(sealed(
            resource
                .add_permission("find", Permission::from_fn(|_| true))
                .unwrap_err()
        ));
    }

    #[test]
    fn test_open_flag_overrides_resource_default() {
        let mut resource = Resource::new(ResourceOptions::new("Post")).unwrap();
        resource
            .add_endpoint("health", EndpointSpec::new("get", "/health", noop()).open(true))
            .unwrap();
        let router = resource.compile(&registry()).unwrap();
        assert!(router.match_route(&Method::GET, "/health").unwrap().value.is_open());
        assert!(!router.match_route(&Method::GET, "/").unwrap().value.is_open());

        let mut resource = Resource::new(ResourceOptions::new("Post").unsecure(true)).unwrap();
        resource
            .add_endpoint("secret", EndpointSpec::new("get", "/secret", noop()).open(false))
            .unwrap();
        let router = resource.compile(&registry()).unwrap();
        assert!(!router.match_route(&Method::GET, "/secret").unwrap().value.is_open());
        assert!(router.match_route(&Method::GET, "/").unwrap().value.is_open());
    }

    #[test]
    fn test_attach_mounts_at_address() {
        let mut host = TestHost {
            registry: registry(),
            router: Router::new(),
        };
        let mut resource = Resource::new(ResourceOptions::new("Post")).unwrap();
        resource.attach(&mut host).unwrap();
        assert!(resource.is_compiled());
        assert_eq!(host.router.route_count(), 7);

        let hit = host.router.match_route(&Method::GET, "/posts/count").unwrap();
        assert_eq!(hit.value.id(), "count");
        assert_eq!(hit.pattern, "/posts/count");

        resource.attach(&mut host).unwrap();
        assert_eq!(host.router.route_count(), 14);
    }

    #[tokio::test]
    async fn test_route_scoped_registration() {
        let mut resource = Resource::new(ResourceOptions::new("Post")).unwrap();
        resource
            .route("find")
            .permission(Permission::from_fn(|_| true))
            .unwrap()
            .post_hook(PostHook::from_fn(|ctx, _| {
                ctx.locals().insert("done", json!(true));
                Ok(())
            }))
            .unwrap();
        let router = resource.compile(&registry()).unwrap();
        let endpoint = Arc::clone(router.match_route(&Method::GET, "/").unwrap().value);

        let value = endpoint
            .run(resourceful_core::Request::new(Method::GET, "/posts"))
            .await
            .unwrap();
        assert_eq!(value, json!({ "posts": [] }));
    }
}
