use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{DbError, Document, DocumentStore, ObjectId};

/// Process-local collection. Contents are lost on restart.
pub struct MemoryStore<T> {
    collection: String,
    docs: RwLock<BTreeMap<ObjectId, T>>,
}

impl<T: Document> MemoryStore<T> {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            docs: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

/// Mutations shared by the in-memory and file backends.
pub(crate) fn insert_into<T: Document>(docs: &mut BTreeMap<ObjectId, T>, mut doc: T) -> T {
    let id = ObjectId::new();
    doc.set_id(id);
    docs.insert(id, doc.clone());
    doc
}

pub(crate) fn save_into<T: Document>(
    collection: &str,
    docs: &mut BTreeMap<ObjectId, T>,
    doc: T,
) -> Result<T, DbError> {
    let id = doc.id().ok_or_else(|| DbError::MissingId {
        collection: collection.to_string(),
    })?;

    match docs.get_mut(&id) {
        Some(slot) => {
            *slot = doc.clone();
            Ok(doc)
        }
        None => Err(DbError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }),
    }
}

#[async_trait]
impl<T: Document> DocumentStore<T> for MemoryStore<T> {
    async fn find_all(&self) -> Result<Vec<T>, DbError> {
        Ok(self.docs.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<T>, DbError> {
        Ok(self.docs.read().await.get(id).cloned())
    }

    async fn insert(&self, doc: T) -> Result<T, DbError> {
        let mut docs = self.docs.write().await;
        let stored = insert_into(&mut docs, doc);
        tracing::debug!(collection = %self.collection, id = ?stored.id(), "document inserted");
        Ok(stored)
    }

    async fn save(&self, doc: T) -> Result<T, DbError> {
        let mut docs = self.docs.write().await;
        save_into(&self.collection, &mut docs, doc)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, DbError> {
        Ok(self.docs.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub(crate) struct Note {
        #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
        pub id: Option<ObjectId>,
        pub body: String,
    }

    impl Note {
        pub(crate) fn new(body: &str) -> Self {
            Self {
                id: None,
                body: body.to_string(),
            }
        }
    }

    impl Document for Note {
        fn id(&self) -> Option<ObjectId> {
            self.id
        }

        fn set_id(&mut self, id: ObjectId) {
            self.id = Some(id);
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_find_returns_it() {
        let store = MemoryStore::new("notes");
        let stored = store.insert(Note::new("hello")).await.unwrap();
        let id = stored.id.expect("id assigned");

        let found = store.find_by_id(&id).await.unwrap();
        assert_eq!(found, Some(stored));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn find_all_keeps_insertion_order() {
        let store = MemoryStore::new("notes");
        for body in ["a", "b", "c"] {
            store.insert(Note::new(body)).await.unwrap();
        }

        let bodies: Vec<String> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.body)
            .collect();
        assert_eq!(bodies, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn save_replaces_existing_document() {
        let store = MemoryStore::new("notes");
        let mut note = store.insert(Note::new("draft")).await.unwrap();
        note.body = "final".to_string();

        store.save(note.clone()).await.unwrap();
        let found = store.find_by_id(&note.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(found.body, "final");
    }

    #[tokio::test]
    async fn save_unknown_or_unsaved_document_fails() {
        let store: MemoryStore<Note> = MemoryStore::new("notes");

        let err = store.save(Note::new("orphan")).await.unwrap_err();
        assert!(matches!(err, DbError::MissingId { .. }));

        let mut ghost = Note::new("ghost");
        ghost.set_id(ObjectId::new());
        let err = store.save(ghost).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_reports_whether_document_existed() {
        let store = MemoryStore::new("notes");
        let note = store.insert(Note::new("bye")).await.unwrap();
        let id = note.id.unwrap();

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert!(store.is_empty().await);
    }
}
