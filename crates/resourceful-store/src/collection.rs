//! Storage backend traits.
//!
//! A [`Collection`] is raw physical storage for one named set of documents:
//! it knows nothing about soft delete or timestamps, which live in
//! [`Model`](crate::Model). Keeping the two apart means the physical state of
//! a collection stays observable (a soft-deleted document is still counted by
//! [`Collection::len`]).

use std::sync::Arc;

use resourceful_core::BoxFuture;

use crate::document::Document;
use crate::error::StoreResult;
use crate::filter::Filter;

/// An in-place document edit, see [`Collection::modify`].
pub type Edit<'a> = Box<dyn FnOnce(&mut Document) -> bool + Send + 'a>;

/// Physical storage for one collection.
///
/// Implementations must be safe to share between concurrent requests.
pub trait Collection: Send + Sync + 'static {
    /// Collection name.
    fn name(&self) -> &str;

    /// Stores a new document. The document already carries its `id`.
    fn insert(&self, document: Document) -> BoxFuture<'_, StoreResult<Document>>;

    /// Fetches a document by id.
    fn get<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<Option<Document>>>;

    /// Stores `document` unless a stored document matches `conflict`.
    ///
    /// The check and the write happen under one lock. Returns `None` when a
    /// conflicting document exists.
    fn insert_unless<'a>(
        &'a self,
        document: Document,
        conflict: &'a Filter,
    ) -> BoxFuture<'a, StoreResult<Option<Document>>>;

    /// Edits the document stored under `id` atomically.
    ///
    /// `edit` receives a copy of the stored document and returns `false` to
    /// leave the stored value untouched. Returns the document as stored after
    /// the edit, or `None` when no document has that id or `edit` declined.
    fn modify<'a>(&'a self, id: &'a str, edit: Edit<'a>) -> BoxFuture<'a, StoreResult<Option<Document>>>;

    /// Physically deletes a document, returning it.
    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<Option<Document>>>;

    /// Returns every stored document matching `filter`, in insertion order.
    fn scan<'a>(&'a self, filter: &'a Filter) -> BoxFuture<'a, StoreResult<Vec<Document>>>;

    /// Number of physically stored documents.
    fn len(&self) -> BoxFuture<'_, StoreResult<usize>>;
}

/// A set of named collections.
pub trait Store: Send + Sync + 'static {
    /// Returns the collection called `name`, creating it if needed.
    fn collection(&self, name: &str) -> Arc<dyn Collection>;
}
