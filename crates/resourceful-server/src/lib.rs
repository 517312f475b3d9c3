//! # Resourceful Server
//!
//! Hosts compiled resources.
//!
//! - [`App`] mounts resources, wires token authentication, answers the
//!   health check and the 404 catch-all, and renders every outcome as a
//!   [`ResponseEnvelope`](resourceful_core::ResponseEnvelope)
//! - [`Server`] serves an `App` over HTTP/1.1 with hyper, bounded per-request
//!   time and graceful shutdown
//!
//! ## Example
//!
//! ```rust,ignore
//! use resourceful_resource::{Resource, ResourceOptions};
//! use resourceful_server::{App, ConnectOptions, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let posts = Resource::new(ResourceOptions::new("Post"))?;
//!     let app = App::connect(ConnectOptions::new("s3cr3t"), vec![posts])?;
//!
//!     Server::new(app, ServerConfig::default()).run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/resourceful-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod config;
mod server;
mod shutdown;

pub use app::{
    body_too_large, App, ConnectError, ConnectOptions, DEFAULT_ENVIRONMENT, DEFAULT_MAX_BODY_SIZE,
    ENVIRONMENT_VAR, MALFORMED_BODY_MESSAGE, MALFORMED_FORM_MESSAGE,
};
pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use server::{render, HttpResponse, Server, ServerError};
pub use shutdown::{ConnectionGuard, ConnectionTracker, ShutdownSignal};
