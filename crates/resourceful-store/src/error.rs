//! Store error types.

use resourceful_core::ResourceError;
use thiserror::Error;

/// Result type alias using [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The value handed to the store is not a JSON object.
    #[error("invalid document for collection '{collection}': {reason}")]
    InvalidDocument {
        /// Collection the write targeted.
        collection: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// The storage backend failed.
    #[error("store backend failed for collection '{collection}'")]
    Backend {
        /// Collection the operation targeted.
        collection: String,
        /// Underlying failure.
        #[source]
        source: anyhow::Error,
    },
}

impl StoreError {
    /// Creates an invalid-document error.
    pub fn invalid_document(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            collection: collection.into(),
            reason: reason.into(),
        }
    }

    /// Creates a backend error.
    pub fn backend(collection: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Backend {
            collection: collection.into(),
            source: source.into(),
        }
    }
}

impl From<StoreError> for ResourceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidDocument { reason, .. } => ResourceError::validation(reason),
            other @ StoreError::Backend { .. } => {
                ResourceError::internal_with_source("The document store failed.", other)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resourceful_core::ErrorCategory;

    #[test]
    fn test_invalid_document_is_a_client_error() {
        let err: ResourceError = StoreError::invalid_document("posts", "expected an object").into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.to_string(), "expected an object");
    }

    #[test]
    fn test_backend_failure_is_internal() {
        let err: ResourceError =
            StoreError::backend("posts", anyhow::anyhow!("connection refused")).into();
        assert_eq!(err.category(), ErrorCategory::Internal);
        let detail = err.detail().unwrap();
        assert!(detail.contains("posts"));
        assert!(detail.contains("connection refused"));
    }
}
