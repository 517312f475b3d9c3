//! Document store for Resourceful.
//!
//! Resources read and write documents through this crate:
//!
//! - [`Collection`] / [`Store`] - the storage backend seam
//! - [`MemoryStore`] - in-process backend
//! - [`Model`] - a collection plus timestamps and soft-delete rules
//! - [`ModelRegistry`] - binds exactly one model per resource name
//! - [`Filter`] - top-level equality filters built from query strings

#![doc(html_root_url = "https://docs.rs/resourceful-store/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod collection;
pub mod document;
mod error;
mod filter;
mod memory;
mod model;
mod registry;

pub use collection::{Collection, Edit, Store};
pub use document::Document;
pub use error::{StoreError, StoreResult};
pub use filter::Filter;
pub use memory::{MemoryCollection, MemoryStore};
pub use model::{Model, ModelOptions};
pub use registry::ModelRegistry;
