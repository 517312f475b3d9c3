//! Authentication for Resourceful.
//!
//! - [`TokenCodec`] - signs and verifies opaque bearer tokens
//! - [`TokenStore`] - token documents: issue on login, resolve per request,
//!   revoke on logout
//! - [`PasswordHasher`] - password hashing seam, with [`BcryptHasher`]
//! - [`Authenticator`] - fills a request's auth and user identities before
//!   the permission stage runs

#![doc(html_root_url = "https://docs.rs/resourceful-auth/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod authenticator;
mod codec;
mod password;
mod tokens;

pub use authenticator::Authenticator;
pub use codec::{CodecError, TokenCodec};
pub use password::{BcryptHasher, PasswordError, PasswordHasher};
pub use tokens::{TokenStore, TOKEN_FIELD};
