use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::{DbError, ObjectId};

/// A value stored in a collection, keyed by its `_id`.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The id assigned by the store, `None` before the first insert.
    fn id(&self) -> Option<ObjectId>;

    fn set_id(&mut self, id: ObjectId);
}

/// Persistence operations over a single collection of documents.
#[async_trait]
pub trait DocumentStore<T: Document>: Send + Sync {
    /// Every document in the collection, in id order.
    async fn find_all(&self) -> Result<Vec<T>, DbError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<T>, DbError>;

    /// Store a new document under a freshly generated id and return it.
    async fn insert(&self, doc: T) -> Result<T, DbError>;

    /// Replace an existing document. Fails with `NotFound` when the id is unknown.
    async fn save(&self, doc: T) -> Result<T, DbError>;

    /// Remove a document. Returns true if something was deleted.
    async fn delete(&self, id: &ObjectId) -> Result<bool, DbError>;
}
