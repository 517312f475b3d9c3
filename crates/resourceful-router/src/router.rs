//! First-match route table.
//!
//! Routes are tried in registration order and the first one whose method and
//! path pattern both match wins. Registration order therefore decides which
//! of two overlapping patterns (`/count` and `/:postId`) receives a request;
//! see [`crate::order`] for the ordering resources register with.

use http::Method;

use crate::params::Params;

/// A segment of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    /// A literal segment (e.g., "count")
    Literal(String),

    /// A parameter segment, declared as `:name` or `{name}`
    Param(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix(':') {
            return Self::Param(name.to_string());
        }
        if raw.len() > 2 && raw.starts_with('{') && raw.ends_with('}') {
            return Self::Param(raw[1..raw.len() - 1].to_string());
        }
        Self::Literal(raw.to_string())
    }

    pub(crate) const fn is_param(&self) -> bool {
        matches!(self, Self::Param(_))
    }
}

/// Splits a path pattern into segments, ignoring empty ones.
pub(crate) fn parse_segments(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(Segment::parse)
        .collect()
}

/// Joins a mount prefix and a route pattern into one normalized pattern.
fn join_paths(prefix: &str, pattern: &str) -> String {
    let joined = format!(
        "/{}/{}",
        prefix.trim_matches('/'),
        pattern.trim_matches('/')
    );
    let parts: Vec<&str> = joined.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", parts.join("/"))
}

/// A registered route.
#[derive(Debug, Clone)]
struct Route<T> {
    method: Method,
    pattern: String,
    segments: Vec<Segment>,
    value: T,
}

impl<T> Route<T> {
    fn match_path(&self, path_segments: &[&str]) -> Option<Params> {
        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, actual) in self.segments.iter().zip(path_segments) {
            match segment {
                Segment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = urlencoding::decode(actual)
                        .map_or_else(|_| (*actual).to_string(), |v| v.into_owned());
                    params.push(name.clone(), value);
                }
            }
        }
        Some(params)
    }
}

/// A matched route.
#[derive(Debug)]
pub struct RouteMatch<'a, T> {
    /// The value registered for the route
    pub value: &'a T,
    /// The pattern the route was registered under (including mount prefix)
    pub pattern: &'a str,
    /// Extracted path parameters
    pub params: Params,
}

/// First-match HTTP router over values of type `T`.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use resourceful_router::Router;
///
/// let mut router = Router::new();
/// router.add_route(Method::GET, "/count", "count");
/// router.add_route(Method::GET, "/:postId", "findById");
///
/// let hit = router.match_route(&Method::GET, "/count").unwrap();
/// assert_eq!(*hit.value, "count");
///
/// let hit = router.match_route(&Method::GET, "/17").unwrap();
/// assert_eq!(*hit.value, "findById");
/// assert_eq!(hit.params.get("postId"), Some("17"));
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    routes: Vec<Route<T>>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<T> Router<T> {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` under `(method, pattern)` after every existing route.
    pub fn add_route(&mut self, method: Method, pattern: impl AsRef<str>, value: T) {
        let pattern = join_paths("", pattern.as_ref());
        let segments = parse_segments(&pattern);
        self.routes.push(Route {
            method,
            pattern,
            segments,
            value,
        });
    }

    /// Appends every route of `router` under `prefix`, keeping its order.
    ///
    /// Mounting the same router twice registers its routes twice; the first
    /// copy shadows the second.
    pub fn mount(&mut self, prefix: &str, router: Router<T>) {
        for route in router.routes {
            let pattern = join_paths(prefix, &route.pattern);
            let segments = parse_segments(&pattern);
            self.routes.push(Route {
                method: route.method,
                pattern,
                segments,
                value: route.value,
            });
        }
    }

    /// Finds the first route matching `method` and `path`.
    ///
    /// Trailing slashes and empty segments in `path` are ignored.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| {
                route.match_path(&path_segments).map(|params| RouteMatch {
                    value: &route.value,
                    pattern: &route.pattern,
                    params,
                })
            })
    }

    /// Returns the registered `(method, pattern)` pairs in match order.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.routes.iter().map(|r| (&r.method, r.pattern.as_str()))
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_registered_route_wins() {
        let mut router = Router::new();
        router.add_route(Method::GET, "/:id", "byId");
        router.add_route(Method::GET, "/count", "count");

        let hit = router.match_route(&Method::GET, "/count").unwrap();
        assert_eq!(*hit.value, "byId");
        assert_eq!(hit.params.get("id"), Some("count"));
    }

    #[test]
    fn test_method_must_match() {
        let mut router = Router::new();
        router.add_route(Method::GET, "/", "find");
        router.add_route(Method::POST, "/", "create");

        assert_eq!(*router.match_route(&Method::POST, "/").unwrap().value, "create");
        assert!(router.match_route(&Method::DELETE, "/").is_none());
    }

    #[test]
    fn test_brace_parameters() {
        let mut router = Router::new();
        router.add_route(Method::GET, "/users/{userId}", "getUser");

        let hit = router.match_route(&Method::GET, "/users/abc").unwrap();
        assert_eq!(hit.params.get("userId"), Some("abc"));
    }

    #[test]
    fn test_parameters_are_percent_decoded() {
        let mut router = Router::new();
        router.add_route(Method::GET, "/tags/:tag", "tag");

        let hit = router.match_route(&Method::GET, "/tags/rust%20lang").unwrap();
        assert_eq!(hit.params.get("tag"), Some("rust lang"));
    }

    #[test]
    fn test_segment_count_must_match() {
        let mut router = Router::new();
        router.add_route(Method::GET, "/", "root");
        router.add_route(Method::GET, "/:id", "byId");

        assert_eq!(*router.match_route(&Method::GET, "/").unwrap().value, "root");
        assert_eq!(*router.match_route(&Method::GET, "").unwrap().value, "root");
        assert!(router.match_route(&Method::GET, "/a/b").is_none());
    }

    #[test]
    fn test_mount_under_prefix() {
        let mut posts = Router::new();
        posts.add_route(Method::GET, "/", "find");
        posts.add_route(Method::GET, "/:postId", "findById");

        let mut app = Router::new();
        app.add_route(Method::GET, "/", "health");
        app.mount("/posts", posts);

        assert_eq!(app.route_count(), 3);
        assert_eq!(*app.match_route(&Method::GET, "/").unwrap().value, "health");
        assert_eq!(*app.match_route(&Method::GET, "/posts").unwrap().value, "find");
        assert_eq!(*app.match_route(&Method::GET, "/posts/").unwrap().value, "find");

        let hit = app.match_route(&Method::GET, "/posts/9").unwrap();
        assert_eq!(*hit.value, "findById");
        assert_eq!(hit.pattern, "/posts/:postId");
    }

    #[test]
    fn test_routes_lists_patterns_in_order() {
        let mut router = Router::new();
        router.add_route(Method::GET, "/count/", 1);
        router.add_route(Method::PATCH, "/:id", 2);

        let routes: Vec<_> = router.routes().collect();
        assert_eq!(routes, vec![(&Method::GET, "/count"), (&Method::PATCH, "/:id")]);
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/posts", "/"), "/posts");
        assert_eq!(join_paths("/posts/", "/:id"), "/posts/:id");
        assert_eq!(join_paths("", ""), "/");
        assert_eq!(join_paths("/", "/count"), "/count");
    }
}
