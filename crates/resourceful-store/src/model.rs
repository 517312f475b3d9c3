//! Models: a collection plus the write and read rules of a resource.
//!
//! A [`Model`] is what resource handlers talk to. It layers two optional
//! behaviors on top of a raw [`Collection`]:
//!
//! - **timestamps**: `createdAt` is set on create, `updatedAt` on every write
//! - **safe** (soft delete): `remove` marks a document `deleted: true`
//!   instead of dropping it, and every read skips deleted documents
//!
//! Missing documents are reported as `None`, never as an error.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::collection::Collection;
use crate::document::{
    into_writable, is_soft_deleted, now_timestamp, Document, CREATED_AT, DELETED, DELETED_AT, ID,
    UPDATED_AT,
};
use crate::error::StoreResult;
use crate::filter::Filter;

/// Behavior switches for a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelOptions {
    /// Maintain `createdAt` / `updatedAt` (and `deletedAt` when `safe`).
    pub timestamps: bool,
    /// Soft-delete instead of physically removing documents.
    pub safe: bool,
}

/// Handle to the documents of one resource.
///
/// Cloning a model is cheap and shares the collection.
///
/// # Example
///
/// ```
/// # tokio_test::block_on(async {
/// use resourceful_store::{Filter, MemoryStore, Model, ModelOptions, Store};
/// use serde_json::json;
///
/// let store = MemoryStore::new();
/// let options = ModelOptions { timestamps: true, safe: true };
/// let posts = Model::new("Post", store.collection("Post"), options);
///
/// let post = posts.create(json!({ "title": "hello" })).await.unwrap();
/// let id = post["id"].as_str().unwrap().to_string();
///
/// posts.remove(&id).await.unwrap();
/// assert_eq!(posts.count(&Filter::new()).await.unwrap(), 0);
/// assert_eq!(posts.collection().len().await.unwrap(), 1);
/// # });
/// ```
#[derive(Clone)]
pub struct Model {
    name: String,
    collection: Arc<dyn Collection>,
    options: ModelOptions,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("collection", &self.collection.name())
            .field("options", &self.options)
            .finish()
    }
}

impl Model {
    /// Creates a model over `collection`.
    #[must_use]
    pub fn new(name: impl Into<String>, collection: Arc<dyn Collection>, options: ModelOptions) -> Self {
        Self {
            name: name.into(),
            collection,
            options,
        }
    }

    /// Model name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Behavior switches.
    #[must_use]
    pub const fn options(&self) -> ModelOptions {
        self.options
    }

    /// The raw collection, without soft-delete filtering.
    #[must_use]
    pub fn collection(&self) -> &Arc<dyn Collection> {
        &self.collection
    }

    fn visible(&self, document: &Document) -> bool {
        !(self.options.safe && is_soft_deleted(document))
    }

    /// Returns every visible document matching `filter`.
    pub async fn find_many(&self, filter: &Filter) -> StoreResult<Vec<Document>> {
        let mut documents = self.collection.scan(filter).await?;
        documents.retain(|doc| self.visible(doc));
        Ok(documents)
    }

    /// Counts visible documents matching `filter`.
    pub async fn count(&self, filter: &Filter) -> StoreResult<usize> {
        Ok(self.find_many(filter).await?.len())
    }

    /// Returns the first visible document matching `filter`.
    pub async fn find_one(&self, filter: &Filter) -> StoreResult<Option<Document>> {
        Ok(self.find_many(filter).await?.into_iter().next())
    }

    /// Returns the visible document with `id`.
    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<Document>> {
        Ok(self
            .collection
            .get(id)
            .await?
            .filter(|doc| self.visible(doc)))
    }

    /// Creates a document from a request body.
    ///
    /// Store-managed fields in `body` are ignored; a fresh UUID v7 `id` is
    /// assigned.
    pub async fn create(&self, body: Value) -> StoreResult<Document> {
        let document = self.new_document(body)?;
        let created = self.collection.insert(document).await?;
        debug!(model = %self.name, "document created");
        Ok(created)
    }

    /// Creates a document unless a visible document already has the same
    /// value for `field`.
    ///
    /// Returns `None` on a conflict. The uniqueness check and the insert are
    /// one atomic collection operation. A body without `field` never
    /// conflicts.
    pub async fn create_unique(&self, body: Value, field: &str) -> StoreResult<Option<Document>> {
        let document = self.new_document(body)?;
        let Some(value) = document.get(field).cloned() else {
            return self.collection.insert(document).await.map(Some);
        };

        let mut conflict = Filter::new().where_eq(field, value);
        if self.options.safe {
            conflict = conflict.where_eq(DELETED, Value::Bool(false));
        }
        let created = self.collection.insert_unless(document, &conflict).await?;
        if created.is_none() {
            debug!(model = %self.name, %field, "unique field already taken");
        }
        Ok(created)
    }

    fn new_document(&self, body: Value) -> StoreResult<Document> {
        let mut document = into_writable(&self.name, body)?;
        document.insert(ID.to_string(), Value::String(Uuid::now_v7().to_string()));

        if self.options.timestamps {
            let now = Value::String(now_timestamp());
            document.insert(CREATED_AT.to_string(), now.clone());
            document.insert(UPDATED_AT.to_string(), now);
        }
        if self.options.safe {
            document.insert(DELETED.to_string(), Value::Bool(false));
        }
        Ok(document)
    }

    /// Merges the top-level fields of `body` into the visible document `id`.
    ///
    /// Returns `None` if no visible document has that id. The visibility
    /// check and the merge happen in one atomic edit, so a concurrent
    /// soft delete is never undone.
    pub async fn update(&self, id: &str, body: Value) -> StoreResult<Option<Document>> {
        let changes = into_writable(&self.name, body)?;
        let safe = self.options.safe;
        let timestamps = self.options.timestamps;

        self.collection
            .modify(
                id,
                Box::new(move |document| {
                    if safe && is_soft_deleted(document) {
                        return false;
                    }
                    document.extend(changes);
                    if timestamps {
                        document.insert(UPDATED_AT.to_string(), Value::String(now_timestamp()));
                    }
                    true
                }),
            )
            .await
    }

    /// Removes the visible document `id`, returning it as it was removed.
    ///
    /// With `safe` on the document is only flagged deleted and stays in the
    /// collection.
    pub async fn remove(&self, id: &str) -> StoreResult<Option<Document>> {
        if !self.options.safe {
            return self.collection.delete(id).await;
        }

        let timestamps = self.options.timestamps;
        let removed = self
            .collection
            .modify(
                id,
                Box::new(move |document| {
                    if is_soft_deleted(document) {
                        return false;
                    }
                    document.insert(DELETED.to_string(), Value::Bool(true));
                    if timestamps {
                        let now = Value::String(now_timestamp());
                        document.insert(DELETED_AT.to_string(), now.clone());
                        document.insert(UPDATED_AT.to_string(), now);
                    }
                    true
                }),
            )
            .await?;
        if removed.is_some() {
            debug!(model = %self.name, %id, "document soft-deleted");
        }
        Ok(removed)
    }
}
