//! # Resourceful Resource
//!
//! Declares resources and compiles them into request pipelines.
//!
//! A [`Resource`] starts with seven CRUD endpoints over a document model and
//! accepts custom endpoints, middleware, pre/post hooks and permission
//! predicates, each keyed by endpoint id. [`Resource::compile`] seals the
//! declaration and produces a router of [`CompiledEndpoint`]s.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Request → Permission → Middleware → PreHooks → Handler → PostHooks → Envelope
//! ```
//!
//! | Stage | Functions | On failure |
//! |-------|-----------|------------|
//! | Permission | [`Permission`] predicates | 401 `fail` |
//! | Middleware | [`Hook`]s | the hook's error |
//! | PreHook | [`Hook`]s | the hook's error, handler skipped |
//! | Handler | one [`Handler`] | the handler's error |
//! | PostHook | [`PostHook`]s | the hook's error, writes kept |
//!
//! ## Example
//!
//! ```
//! use resourceful_resource::prelude::*;
//! use resourceful_store::{MemoryStore, ModelRegistry};
//!
//! let mut posts = Resource::new(ResourceOptions::new("Post"))?;
//! posts
//!     .add_permission("find", access::is_anyone())?
//!     .add_permission("create", access::is_user())?;
//!
//! let registry = ModelRegistry::new(MemoryStore::new());
//! let router = posts.compile(&registry)?;
//! assert_eq!(router.route_count(), 7);
//!
//! let stages = Stage::all();
//! assert_eq!(stages[0].name(), "permission");
//! # Ok::<(), ResourceConfigError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/resourceful-resource/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod access;
mod context;
mod controller;
mod endpoint;
mod error;
mod extensions;
mod handler;
pub mod naming;
mod permission;
mod pipeline;
mod resource;
mod user;

pub use context::RequestContext;
pub use controller::DEFAULT_ENDPOINT_IDS;
pub use endpoint::{Endpoint, EndpointSpec, EndpointTable};
pub use error::ResourceConfigError;
pub use extensions::{ExtensionMap, Extensions};
pub use handler::{Handler, Hook, Permission, PostHook};
pub use permission::PermissionMode;
pub use pipeline::{CompiledEndpoint, Stage};
pub use resource::{EndpointRoute, Host, Resource, ResourceOptions, ResourceRouter};

/// Common imports for declaring resources.
pub mod prelude {
    pub use crate::access;
    pub use crate::{
        EndpointSpec, Handler, Hook, Permission, PermissionMode, PostHook, RequestContext,
        Resource, ResourceConfigError, ResourceOptions, Stage,
    };
}
