//! Middleware, hooks and permissions keyed by endpoint id.
//!
//! Every map is append-only: attaching a function pushes it onto the
//! sequence for its endpoint id, and execution follows attachment order. Ids
//! are not checked against the endpoint table; an id no endpoint carries at
//! compile time is simply never consulted.

use indexmap::IndexMap;

use crate::handler::{Hook, Permission, PostHook};

/// Ordered sequences of functions keyed by endpoint id.
#[derive(Debug, Clone)]
pub struct ExtensionMap<T> {
    entries: IndexMap<String, Vec<T>>,
}

impl<T> Default for ExtensionMap<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T> ExtensionMap<T> {
    pub(crate) fn push(&mut self, id: &str, value: T) {
        self.entries.entry(id.to_string()).or_default().push(value);
    }

    /// Functions attached to `id`, in attachment order.
    pub fn get(&self, id: &str) -> &[T] {
        self.entries.get(id).map_or(&[], Vec::as_slice)
    }

    /// Ids with at least one attached function.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<T: Clone> ExtensionMap<T> {
    pub(crate) fn cloned(&self, id: &str) -> Vec<T> {
        self.get(id).to_vec()
    }
}

/// The four extension maps of a resource.
#[derive(Debug, Clone, Default)]
pub struct Extensions {
    /// Middleware, run after the permission gate.
    pub middleware: ExtensionMap<Hook>,
    /// Pre-hooks, run before the handler.
    pub pre_hooks: ExtensionMap<Hook>,
    /// Post-hooks, run after the handler.
    pub post_hooks: ExtensionMap<PostHook>,
    /// Permission predicates.
    pub permissions: ExtensionMap<Permission>,
}

impl Extensions {
    /// Ids with attached functions for which `exists` returns `false`.
    pub fn dangling_ids<'a>(&'a self, exists: impl Fn(&str) -> bool + 'a) -> Vec<&'a str> {
        let mut ids: Vec<&str> = self
            .middleware
            .ids()
            .chain(self.pre_hooks.ids())
            .chain(self.post_hooks.ids())
            .chain(self.permissions.ids())
            .filter(|id| !exists(id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_appends_in_order() {
        let mut map: ExtensionMap<u8> = ExtensionMap::default();
        map.push("find", 1);
        map.push("create", 9);
        map.push("find", 2);

        assert_eq!(map.get("find"), &[1, 2]);
        assert_eq!(map.get("create"), &[9]);
        assert!(map.get("remove").is_empty());
        assert_eq!(map.cloned("find"), vec![1, 2]);
    }

    #[test]
    fn test_dangling_ids() {
        let mut extensions = Extensions::default();
        extensions.permissions.push("find", Permission::from_fn(|_| true));
        extensions.pre_hooks.push("ghost", Hook::from_fn(|_| Ok(())));
        extensions.middleware.push("ghost", Hook::from_fn(|_| Ok(())));

        assert_eq!(extensions.dangling_ids(|id| id == "find"), vec!["ghost"]);
    }
}
