//! Exactly-once model bindings keyed by resource name.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::collection::Store;
use crate::model::{Model, ModelOptions};

/// Registry of the models bound on a store.
///
/// The first call to [`model`](Self::model) for a name binds a [`Model`]
/// over the store's collection of that name; every later call returns the
/// same binding, even if it asks for different options. Cloning the registry
/// shares its bindings.
///
/// # Example
///
/// ```
/// use resourceful_store::{MemoryStore, ModelOptions, ModelRegistry};
///
/// let registry = ModelRegistry::new(MemoryStore::new());
/// let first = registry.model("Post", ModelOptions { timestamps: true, safe: true });
/// let second = registry.model("Post", ModelOptions::default());
///
/// assert_eq!(second.options(), first.options());
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Clone)]
pub struct ModelRegistry {
    store: Arc<dyn Store>,
    models: Arc<DashMap<String, Model>>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.names())
            .finish_non_exhaustive()
    }
}

impl ModelRegistry {
    /// Creates a registry over `store`.
    pub fn new(store: impl Store) -> Self {
        Self::from_arc(Arc::new(store))
    }

    /// Creates a registry over a shared store.
    pub fn from_arc(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            models: Arc::new(DashMap::new()),
        }
    }

    /// Returns the model bound to `name`, binding it on first access.
    pub fn model(&self, name: &str, options: ModelOptions) -> Model {
        self.models
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(model = %name, ?options, "binding model");
                Model::new(name, self.store.collection(name), options)
            })
            .value()
            .clone()
    }

    /// Returns the model bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<Model> {
        self.models.get(name).map(|m| m.value().clone())
    }

    /// Names of every bound model.
    pub fn names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.key().clone()).collect()
    }

    /// Number of bound models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if no model has been bound.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::Filter;
    use serde_json::json;

    #[tokio::test]
    async fn test_bindings_share_the_collection() {
        let registry = ModelRegistry::new(MemoryStore::new());
        let a = registry.model("Post", ModelOptions::default());
        a.create(json!({ "title": "x" })).await.unwrap();

        let b = registry.clone().model("Post", ModelOptions::default());
        assert_eq!(b.count(&Filter::new()).await.unwrap(), 1);
    }

    #[test]
    fn test_binding_happens_once_under_contention() {
        let registry = ModelRegistry::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let options = ModelOptions {
                        timestamps: i % 2 == 0,
                        safe: true,
                    };
                    registry.model("Post", options).options()
                })
            })
            .collect();

        let seen: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(seen.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_and_names() {
        let registry = ModelRegistry::new(MemoryStore::new());
        assert!(registry.is_empty());
        assert!(registry.get("User").is_none());

        registry.model("User", ModelOptions::default());
        assert!(registry.get("User").is_some());
        assert_eq!(registry.names(), vec!["User".to_string()]);
    }
}
