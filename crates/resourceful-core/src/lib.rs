//! # Resourceful Core
//!
//! Core types shared by every Resourceful crate:
//!
//! - [`ResourceError`] - request-time errors and their [`ErrorCategory`]
//! - [`ResponseEnvelope`] - the `success` / `fail` / `error` JSON envelope
//! - [`Request`] - the inbound request a resource pipeline runs against
//! - [`AuthIdentity`] / [`UserIdentity`] - caller identities
//! - [`Locals`] - per-request scratch map shared between pipeline stages
//! - [`RequestId`] - UUID v7 request identifier

#![doc(html_root_url = "https://docs.rs/resourceful-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod envelope;
mod error;
mod identity;
mod request;

use std::future::Future;
use std::pin::Pin;

pub use context::{Locals, RequestId};
pub use envelope::{EnvelopeStatus, ResponseEnvelope, ROUTE_NOT_FOUND_MESSAGE};
pub use error::{ErrorCategory, FieldErrors, ResourceError, ResourceResult};
pub use identity::{AuthIdentity, UserIdentity};
pub use request::Request;

/// Boxed future type used at every async seam.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
