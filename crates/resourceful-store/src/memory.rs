//! In-process [`Store`] implementation.

use std::future::ready;
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::RwLock;
use resourceful_core::BoxFuture;

use crate::collection::{Collection, Edit, Store};
use crate::document::{document_id, Document};
use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;

/// A store that keeps every collection in memory.
///
/// Documents keep their insertion order. Cloning the store shares the
/// underlying collections.
///
/// # Example
///
/// ```
/// use resourceful_store::{MemoryStore, Store};
///
/// let store = MemoryStore::new();
/// let posts = store.collection("Post");
/// assert_eq!(posts.name(), "Post");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, Arc<MemoryCollection>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the collections created so far.
    #[must_use]
    pub fn collection_names(&self) -> Vec<String> {
        self.collections.iter().map(|c| c.key().clone()).collect()
    }
}

impl Store for MemoryStore {
    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryCollection::new(name)))
            .value()
            .clone()
    }
}

/// One in-memory collection.
#[derive(Debug)]
pub struct MemoryCollection {
    name: String,
    documents: RwLock<IndexMap<String, Document>>,
}

impl MemoryCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(IndexMap::new()),
        }
    }
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(&self, document: Document) -> BoxFuture<'_, StoreResult<Document>> {
        let result = match document_id(&document) {
            Some(id) => {
                self.documents
                    .write()
                    .insert(id.to_string(), document.clone());
                Ok(document)
            }
            None => Err(StoreError::invalid_document(
                &self.name,
                "Documents must carry a string id.",
            )),
        };
        Box::pin(ready(result))
    }

    fn get<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<Option<Document>>> {
        let found = self.documents.read().get(id).cloned();
        Box::pin(ready(Ok(found)))
    }

    fn insert_unless<'a>(
        &'a self,
        document: Document,
        conflict: &'a Filter,
    ) -> BoxFuture<'a, StoreResult<Option<Document>>> {
        let Some(id) = document_id(&document).map(str::to_string) else {
            return Box::pin(ready(Err(StoreError::invalid_document(
                &self.name,
                "Documents must carry a string id.",
            ))));
        };

        let mut documents = self.documents.write();
        let inserted = if documents.values().any(|doc| conflict.matches(doc)) {
            None
        } else {
            documents.insert(id, document.clone());
            Some(document)
        };
        drop(documents);
        Box::pin(ready(Ok(inserted)))
    }

    fn modify<'a>(&'a self, id: &'a str, edit: Edit<'a>) -> BoxFuture<'a, StoreResult<Option<Document>>> {
        let mut documents = self.documents.write();
        let modified = documents.get_mut(id).and_then(|slot| {
            let mut draft = slot.clone();
            edit(&mut draft).then(|| {
                *slot = draft;
                slot.clone()
            })
        });
        drop(documents);
        Box::pin(ready(Ok(modified)))
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<Option<Document>>> {
        let removed = self.documents.write().shift_remove(id);
        Box::pin(ready(Ok(removed)))
    }

    fn scan<'a>(&'a self, filter: &'a Filter) -> BoxFuture<'a, StoreResult<Vec<Document>>> {
        let matching = self
            .documents
            .read()
            .values()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();
        Box::pin(ready(Ok(matching)))
    }

    fn len(&self) -> BoxFuture<'_, StoreResult<usize>> {
        let len = self.documents.read().len();
        Box::pin(ready(Ok(len)))
    }
}
