//! Path parameter storage.
//!
//! Parameters extracted from a matched path are kept in declaration order in
//! a small vector; resources rarely declare more than one or two parameters
//! per route, so matching does not allocate for the common case.

use smallvec::SmallVec;

const INLINE_PARAMS: usize = 4;

/// Path parameters extracted from a route match.
///
/// # Example
///
/// ```rust
/// use resourceful_router::Params;
///
/// let mut params = Params::new();
/// params.push("postId", "42");
///
/// assert_eq!(params.get("postId"), Some("42"));
/// assert_eq!(params.get("userId"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter. A later value with the same name shadows nothing;
    /// [`get`](Self::get) returns the first one pushed.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over `(name, value)` pairs in match order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
