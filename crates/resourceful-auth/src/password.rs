//! Password hashing.
//!
//! [`PasswordHasher`] is the seam; [`BcryptHasher`] is the bundled
//! implementation. Hashing is deliberately slow, so callers on an async
//! runtime should run it on a blocking thread.

use thiserror::Error;

/// Errors hashing a password.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The hashing backend rejected the input or its parameters.
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hashes and checks passwords.
pub trait PasswordHasher: Send + Sync + 'static {
    /// Hashes `password` for storage.
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Returns `true` if `password` matches the stored `hash`.
    ///
    /// A malformed `hash` never matches.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// bcrypt password hasher.
///
/// # Example
///
/// ```
/// use resourceful_auth::{BcryptHasher, PasswordHasher};
///
/// let hasher = BcryptHasher::new(4);
/// let stored = hasher.hash("hunter2").unwrap();
///
/// assert!(stored.starts_with("$2b$04$"));
/// assert!(hasher.verify("hunter2", &stored));
/// assert!(!hasher.verify("hunter3", &stored));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// A hasher using `cost` rounds (log2). bcrypt accepts 4 to 31.
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// The configured cost.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        bcrypt::hash(password, self.cost).map_err(|e| PasswordError::Hash(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashes_are_salted() {
        let hasher = BcryptHasher::new(4);
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same", &a));
        assert!(hasher.verify("same", &b));
    }

    #[test]
    fn test_rejects_foreign_formats() {
        let hasher = BcryptHasher::new(4);
        assert!(!hasher.verify("pw", "pw"));
        assert!(!hasher.verify("pw", "sha1$salt$digest"));
        assert!(!hasher.verify("pw", ""));
    }

    #[test]
    fn test_invalid_cost_is_an_error() {
        assert!(BcryptHasher::new(99).hash("pw").is_err());
    }

    #[test]
    fn test_default_cost() {
        assert_eq!(BcryptHasher::default().cost(), bcrypt::DEFAULT_COST);
    }
}
