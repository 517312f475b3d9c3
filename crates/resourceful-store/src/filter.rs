//! Equality filters over top-level document fields.
//!
//! Filters usually come straight from a query string, where every value is a
//! string. A string in the filter therefore also matches a number or boolean
//! whose textual form is equal, so `?comments=15` finds `{"comments": 15}`.

use serde_json::{Map, Value};

use crate::document::Document;

/// A conjunction of `field == value` conditions.
///
/// # Example
///
/// ```
/// use resourceful_store::Filter;
/// use serde_json::json;
///
/// let filter = Filter::new().where_eq("comments", json!("15"));
/// let doc = json!({ "id": "1", "comments": 15 });
///
/// assert!(filter.matches(doc.as_object().unwrap()));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Map<String, Value>,
}

impl Filter {
    /// Creates a filter that matches every document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `field == value` condition.
    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.conditions.insert(field.into(), value);
        self
    }

    /// Returns `true` if every condition holds for `document`.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| value_matches(expected, document.get(field)))
    }

    /// Returns `true` if the filter has no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl From<Map<String, Value>> for Filter {
    fn from(conditions: Map<String, Value>) -> Self {
        Self { conditions }
    }
}

fn value_matches(expected: &Value, actual: Option<&Value>) -> bool {
    match (expected, actual) {
        (Value::Null, None | Some(Value::Null)) => true,
        (_, None) => false,
        (Value::String(text), Some(Value::Number(n))) => n.to_string() == *text,
        (Value::String(text), Some(Value::Bool(b))) => b.to_string() == *text,
        (expected, Some(actual)) => expected == actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::new().is_empty());
        assert!(Filter::new().matches(&doc(json!({ "id": "1" }))));
    }

    #[test]
    fn test_exact_matches() {
        let post = doc(json!({ "title": "hello", "draft": false, "comments": 3 }));
        assert!(Filter::new().where_eq("title", json!("hello")).matches(&post));
        assert!(Filter::new().where_eq("comments", json!(3)).matches(&post));
        assert!(!Filter::new().where_eq("title", json!("bye")).matches(&post));
        assert!(!Filter::new().where_eq("author", json!("ada")).matches(&post));
    }

    #[test]
    fn test_strings_match_textual_form() {
        let post = doc(json!({ "draft": false, "comments": 3, "rating": 4.5 }));
        let filter = Filter::from(
            json!({ "draft": "false", "comments": "3", "rating": "4.5" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert!(filter.matches(&post));
        assert!(!Filter::new().where_eq("comments", json!("03")).matches(&post));
    }

    #[test]
    fn test_null_matches_missing_field() {
        let post = doc(json!({ "title": "x" }));
        assert!(Filter::new().where_eq("author", Value::Null).matches(&post));
        assert!(!Filter::new().where_eq("title", Value::Null).matches(&post));
    }
}
