//! HTTP method names accepted in endpoint declarations.

use http::Method;

/// Method names an endpoint may be declared with, in lowercase.
pub const SUPPORTED_METHODS: [&str; 5] = ["get", "post", "patch", "delete", "put"];

/// Parses a declared method name, case-insensitively.
///
/// Only the five verbs in [`SUPPORTED_METHODS`] are accepted; anything else
/// returns `None`.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use resourceful_router::parse_method;
///
/// assert_eq!(parse_method("PATCH"), Some(Method::PATCH));
/// assert_eq!(parse_method("options"), None);
/// ```
#[must_use]
pub fn parse_method(name: &str) -> Option<Method> {
    match name.to_ascii_lowercase().as_str() {
        "get" => Some(Method::GET),
        "post" => Some(Method::POST),
        "patch" => Some(Method::PATCH),
        "delete" => Some(Method::DELETE),
        "put" => Some(Method::PUT),
        _ => None,
    }
}

/// Returns `true` if `method` is one of the supported endpoint verbs.
#[must_use]
pub fn is_supported(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::POST | Method::PATCH | Method::DELETE | Method::PUT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        for name in SUPPORTED_METHODS {
            let lower = parse_method(name).unwrap();
            let upper = parse_method(&name.to_ascii_uppercase()).unwrap();
            assert_eq!(lower, upper);
            assert!(is_supported(&lower));
        }
    }

    #[test]
    fn test_rejects_unknown_methods() {
        assert_eq!(parse_method(""), None);
        assert_eq!(parse_method("head"), None);
        assert_eq!(parse_method("fetch"), None);
        assert!(!is_supported(&Method::OPTIONS));
    }
}
