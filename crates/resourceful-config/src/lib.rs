//! Typed, layered configuration for Resourceful applications.
//!
//! - TOML and JSON files
//! - `RESOURCEFUL__SECTION__KEY` environment overrides and `.env` files
//! - strict parsing: unknown sections and keys are errors
//! - [`ResourcefulConfig::validate`] for the checks serde cannot express
//!
//! # Example
//!
//! ```no_run
//! use resourceful_config::{ConfigLoader, DEFAULT_ENV_PREFIX};
//!
//! # fn main() -> Result<(), resourceful_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("resourceful.toml")?
//!     .with_env_prefix(DEFAULT_ENV_PREFIX)
//!     .load()?;
//!
//! println!("listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/resourceful-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::ResourcefulConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::ServerSection;
