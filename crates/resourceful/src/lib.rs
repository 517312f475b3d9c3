//! # Resourceful
//!
//! Declare a named resource, a set of CRUD endpoints over a document
//! collection, then attach custom endpoints, middleware, pre/post hooks and
//! permission predicates. Connecting compiles every resource into a
//! deterministic pipeline per endpoint, mounted on an HTTP router:
//!
//! ```text
//! identities → permission gate → middleware → pre-hooks → handler → post-hooks → envelope
//! ```
//!
//! Routes are ordered so static segments register ahead of parameterized
//! ones, so `GET /posts/count` never lands on `GET /posts/:postId`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resourceful::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut posts = Resource::new(ResourceOptions::new("Post"))?;
//!     posts
//!         .add_permission("find", access::is_anyone())?
//!         .add_permission("create", access::is_user())?;
//!
//!     let users = Resource::user(ResourceOptions::new("User"))?;
//!
//!     let config = ConfigLoader::new()
//!         .with_optional_file("resourceful.toml")?
//!         .with_env_prefix("RESOURCEFUL")
//!         .load()?;
//!     resourceful::serve(config, vec![posts, users]).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Crates
//!
//! | Crate | Re-exported as |
//! |-------|----------------|
//! | `resourceful-core` | [`core`] |
//! | `resourceful-router` | [`router`] |
//! | `resourceful-store` | [`store`] |
//! | `resourceful-auth` | [`auth`] |
//! | `resourceful-resource` | [`resource`] |
//! | `resourceful-server` | [`server`] |
//! | `resourceful-config` | [`config`] |
//! | `resourceful-telemetry` | [`telemetry`] |

#![doc(html_root_url = "https://docs.rs/resourceful/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use resourceful_auth as auth;
pub use resourceful_config as config;
pub use resourceful_core as core;
pub use resourceful_resource as resource;
pub use resourceful_router as router;
pub use resourceful_server as server;
pub use resourceful_store as store;
pub use resourceful_telemetry as telemetry;

use resourceful_config::{ConfigError, ResourcefulConfig};
use resourceful_resource::Resource;
use resourceful_server::{App, ConnectError, Server, ServerError};
use resourceful_telemetry::{init_telemetry, TelemetryError};
use thiserror::Error;

/// Errors that stop [`serve`].
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging or metrics could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// A resource could not be connected.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// The server could not start.
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Connects `resources` with `config` and serves them until SIGINT or
/// SIGTERM.
///
/// Installs logging and metrics as configured, then runs the HTTP server.
///
/// # Errors
///
/// Fails if the configuration is invalid, telemetry cannot be installed, a
/// resource cannot be connected or the address cannot be bound.
pub async fn serve(config: ResourcefulConfig, resources: Vec<Resource>) -> Result<(), Error> {
    config.validate()?;
    init_telemetry(&config.logging, &config.metrics)?;

    let app = App::connect(config.connection, resources)?;
    tracing::info!(addr = %config.server.http_addr, "starting server");
    Server::new(app, config.server.to_server_config()).run().await?;
    Ok(())
}

/// Common imports.
pub mod prelude {
    pub use resourceful_config::{ConfigLoader, ResourcefulConfig};
    pub use resourceful_core::{
        EnvelopeStatus, Request, ResourceError, ResourceResult, ResponseEnvelope,
    };
    pub use resourceful_resource::prelude::*;
    pub use resourceful_server::{App, ConnectOptions, Server, ServerConfig};
    pub use resourceful_store::{Filter, MemoryStore, ModelRegistry};
}
