//! Endpoint declarations and the per-resource endpoint table.

use http::Method;
use indexmap::IndexMap;
use resourceful_router::parse_method;

use crate::error::ResourceConfigError;
use crate::handler::Handler;

/// An endpoint as declared by the caller, before validation.
///
/// # Example
///
/// ```
/// use resourceful_resource::{EndpointSpec, Handler};
/// use serde_json::json;
///
/// let spec = EndpointSpec::new("get", "/nice/talk", Handler::from_fn(|_| Ok(json!("hi"))))
///     .open(true);
/// # let _ = spec;
/// ```
#[derive(Debug, Clone)]
pub struct EndpointSpec {
    method: String,
    path: String,
    handler: Handler,
    open: Option<bool>,
}

impl EndpointSpec {
    /// Declares an endpoint. `method` is one of `get`, `post`, `patch`,
    /// `delete` or `put`, in any case; `path` must start with `/`.
    pub fn new(method: impl Into<String>, path: impl Into<String>, handler: Handler) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            handler,
            open: None,
        }
    }

    /// Marks the endpoint open (bypassing the permission gate) or secured,
    /// overriding the resource default.
    #[must_use]
    pub fn open(mut self, open: bool) -> Self {
        self.open = Some(open);
        self
    }

    pub(crate) fn validate(self, resource: &str, id: &str) -> Result<Endpoint, ResourceConfigError> {
        let method = parse_method(self.method.trim()).ok_or_else(|| ResourceConfigError::InvalidMethod {
            resource: resource.to_string(),
            endpoint: id.to_string(),
            method: self.method.clone(),
        })?;

        if !self.path.starts_with('/') {
            return Err(ResourceConfigError::InvalidPath {
                resource: resource.to_string(),
                endpoint: id.to_string(),
                path: self.path,
            });
        }

        Ok(Endpoint {
            id: id.to_string(),
            method,
            path: self.path,
            handler: self.handler,
            open: self.open,
        })
    }
}

/// A validated endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub(crate) id: String,
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) handler: Handler,
    pub(crate) open: Option<bool>,
}

impl Endpoint {
    /// Endpoint id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path pattern, relative to the resource address.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The explicit open flag, if one was declared.
    pub fn open(&self) -> Option<bool> {
        self.open
    }
}

/// Endpoints of a resource keyed by id, in declaration order.
///
/// Re-declaring an id replaces the endpoint but keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct EndpointTable {
    endpoints: IndexMap<String, Endpoint>,
}

impl EndpointTable {
    pub(crate) fn upsert(&mut self, endpoint: Endpoint) {
        self.endpoints.insert(endpoint.id.clone(), endpoint);
    }

    /// Returns the endpoint with `id`.
    pub fn get(&self, id: &str) -> Option<&Endpoint> {
        self.endpoints.get(id)
    }

    /// Returns `true` if an endpoint with `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.endpoints.contains_key(id)
    }

    /// Endpoint ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    /// Endpoints in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }

    /// Number of endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
