//! The inbound request as seen by a resource pipeline.
//!
//! A [`Request`] is built once by the host application from the raw HTTP
//! request: the query string is decoded, the body is parsed as JSON (when
//! body parsing is on), identities are resolved, and the router fills in the
//! path parameters. From then on the pipeline treats it as read-only.

use http::header::AUTHORIZATION;
use http::{HeaderMap, Method};
use resourceful_router::Params;
use serde_json::{Map, Value};

use crate::context::RequestId;
use crate::identity::{AuthIdentity, UserIdentity};

/// An inbound request.
///
/// # Example
///
/// ```
/// use http::Method;
/// use resourceful_core::Request;
/// use serde_json::json;
///
/// let request = Request::new(Method::GET, "/posts")
///     .with_query_string("title=hello%20world&limit=2");
///
/// assert_eq!(request.query().get("title"), Some(&json!("hello world")));
/// assert_eq!(request.query().get("limit"), Some(&json!("2")));
/// assert!(request.body().is_null());
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    request_id: RequestId,
    method: Method,
    path: String,
    params: Params,
    query: Map<String, Value>,
    headers: HeaderMap,
    body: Value,
    auth: Option<AuthIdentity>,
    user: Option<UserIdentity>,
}

impl Request {
    /// Creates a request with no query, headers, body or identities.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            params: Params::new(),
            query: Map::new(),
            headers: HeaderMap::new(),
            body: Value::Null,
            auth: None,
            user: None,
        }
    }

    /// Decodes `query` (`a=1&b=two+words`) into the query map.
    ///
    /// Every value is kept as a string; a key repeated later overwrites an
    /// earlier one.
    #[must_use]
    pub fn with_query_string(mut self, query: &str) -> Self {
        self.query = parse_query(query);
        self
    }

    /// Replaces the query map.
    #[must_use]
    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.query = query;
        self
    }

    /// Replaces the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Sets the path parameters extracted by the router.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// Sets the resolved auth identity.
    pub fn set_auth(&mut self, auth: Option<AuthIdentity>) {
        self.auth = auth;
    }

    /// Sets the resolved user identity.
    pub fn set_user(&mut self, user: Option<UserIdentity>) {
        self.user = user;
    }

    /// Returns the request id.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without query string).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the path parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Returns a single path parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Returns the decoded query map.
    #[must_use]
    pub const fn query(&self) -> &Map<String, Value> {
        &self.query
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the parsed body (`Value::Null` when absent or not parsed).
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the auth identity, if one was resolved.
    #[must_use]
    pub const fn auth(&self) -> Option<&AuthIdentity> {
        self.auth.as_ref()
    }

    /// Returns the user identity, if one was resolved.
    #[must_use]
    pub const fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    /// Returns the credential from an `Authorization: Bearer <token>` header.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.headers.get(AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or(spaced.clone(), |v| v.into_owned())
}

fn parse_query(query: &str) -> Map<String, Value> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), Value::String(decode_component(value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_parse_query() {
        let query = parse_query("?a=1&b=two+words&c&a=3");
        assert_eq!(query.get("a"), Some(&json!("3")));
        assert_eq!(query.get("b"), Some(&json!("two words")));
        assert_eq!(query.get("c"), Some(&json!("")));
        assert!(parse_query("").is_empty());
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        let request = Request::new(Method::GET, "/").with_headers(headers);
        assert_eq!(request.bearer_token(), Some("abc.def"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        let request = Request::new(Method::GET, "/").with_headers(headers);
        assert_eq!(request.bearer_token(), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        let request = Request::new(Method::GET, "/").with_headers(headers);
        assert_eq!(request.bearer_token(), None);

        assert_eq!(Request::new(Method::GET, "/").bearer_token(), None);
    }

    #[test]
    fn test_params_and_identities() {
        let mut request = Request::new(Method::PATCH, "/posts/1").with_body(json!({ "a": 1 }));
        let mut params = Params::new();
        params.push("postId", "1");
        request.set_params(params);
        request.set_user(UserIdentity::from_document(json!({ "id": "u1" })));

        assert_eq!(request.param("postId"), Some("1"));
        assert_eq!(request.user().map(UserIdentity::id), Some("u1"));
        assert!(request.auth().is_none());
        assert_eq!(request.body()["a"], json!(1));
        assert_eq!(request.method(), &Method::PATCH);
        assert_eq!(request.path(), "/posts/1");
    }
}
