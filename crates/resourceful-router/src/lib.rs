//! Routing primitives for Resourceful.
//!
//! This crate provides the small HTTP routing layer resources compile onto:
//!
//! - [`Router`] - first-match route table with `:param` / `{param}` patterns
//!   and prefix mounting
//! - [`Params`] - path parameters extracted from a match
//! - [`order_by_specificity`] - the registration order that keeps static
//!   segments ahead of parameterized siblings
//! - [`parse_method`] - the HTTP verbs an endpoint may declare
//!
//! # Example
//!
//! ```rust
//! use http::Method;
//! use resourceful_router::{order_by_specificity, Router};
//!
//! let mut declared = vec![("find", "/"), ("findById", "/:postId"), ("count", "/count")];
//! order_by_specificity(&mut declared, |(_, path)| *path);
//!
//! let mut posts = Router::new();
//! for (id, path) in declared {
//!     posts.add_route(Method::GET, path, id);
//! }
//!
//! let mut app = Router::new();
//! app.mount("/posts", posts);
//!
//! let hit = app.match_route(&Method::GET, "/posts/count").unwrap();
//! assert_eq!(*hit.value, "count");
//! ```

#![doc(html_root_url = "https://docs.rs/resourceful-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod method;
pub mod order;
mod params;
mod router;

pub use method::{is_supported, parse_method, SUPPORTED_METHODS};
pub use order::{order_by_specificity, Specificity};
pub use params::Params;
pub use router::{RouteMatch, Router};
