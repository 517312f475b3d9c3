//! Declaration-time errors.
//!
//! Everything here is raised synchronously while a resource is being
//! declared, compiled or attached; none of it ever reaches a client.

use thiserror::Error;

/// Errors raised while declaring, compiling or attaching a resource.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceConfigError {
    /// The resource name is empty.
    #[error("a resource must be given a non-empty name")]
    EmptyName,

    /// The explicit address does not start with `/`.
    #[error("address '{address}' of resource '{resource}' must start with '/'")]
    InvalidAddress {
        /// Resource name.
        resource: String,
        /// Offending address.
        address: String,
    },

    /// A mutation was attempted after `compile()`.
    #[error("resource '{resource}' has already been compiled")]
    AlreadyCompiled {
        /// Resource name.
        resource: String,
    },

    /// An endpoint or extension was registered with an empty id.
    #[error("{operation} on resource '{resource}' requires a non-empty endpoint id")]
    EmptyEndpointId {
        /// Resource name.
        resource: String,
        /// The registration method called.
        operation: &'static str,
    },

    /// The declared HTTP method is not supported.
    #[error("endpoint '{endpoint}' of resource '{resource}' declares unsupported method '{method}'")]
    InvalidMethod {
        /// Resource name.
        resource: String,
        /// Endpoint id.
        endpoint: String,
        /// Offending method.
        method: String,
    },

    /// The declared path does not start with `/`.
    #[error("endpoint '{endpoint}' of resource '{resource}' declares path '{path}', which must start with '/'")]
    InvalidPath {
        /// Resource name.
        resource: String,
        /// Endpoint id.
        endpoint: String,
        /// Offending path.
        path: String,
    },

    /// User-resource credentials were bound more than once, or on a
    /// resource that is not a user resource.
    #[error("resource '{resource}' cannot be bound to authentication: {reason}")]
    AuthBinding {
        /// Resource name.
        resource: String,
        /// What went wrong.
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_resource() {
        let err = ResourceConfigError::AlreadyCompiled {
            resource: "Post".to_string(),
        };
        assert_eq!(err.to_string(), "resource 'Post' has already been compiled");

        let err = ResourceConfigError::EmptyEndpointId {
            resource: "Post".to_string(),
            operation: "add_permission",
        };
        assert!(err.to_string().starts_with("add_permission"));
    }
}
