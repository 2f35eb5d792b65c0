use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::memory::{insert_into, save_into};
use crate::{DbError, Document, DocumentStore, ObjectId};

/// Collection persisted as a JSON array in `<dir>/<collection>.json`.
///
/// The whole collection lives in memory; every mutation rewrites the file
/// through a temporary sibling and a rename, so a crash leaves either the
/// old or the new snapshot on disk. A failed write leaves memory untouched.
pub struct FileStore<T> {
    collection: String,
    path: PathBuf,
    docs: RwLock<BTreeMap<ObjectId, T>>,
}

impl<T: Document> FileStore<T> {
    /// Open (or create) the collection file under `dir`.
    pub async fn open(dir: &Path, collection: impl Into<String>) -> Result<Self, DbError> {
        let collection = collection.into();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| DbError::Io {
                path: dir.to_path_buf(),
                source,
            })?;

        let path = dir.join(format!("{}.json", collection));
        let docs = match tokio::fs::read(&path).await {
            Ok(raw) => Self::decode(&collection, &raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(DbError::Io { path, source }),
        };

        tracing::info!(
            collection = %collection,
            path = %path.display(),
            documents = docs.len(),
            "file collection opened"
        );

        Ok(Self {
            collection,
            path,
            docs: RwLock::new(docs),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(collection: &str, raw: &[u8]) -> Result<BTreeMap<ObjectId, T>, DbError> {
        let list: Vec<T> = serde_json::from_slice(raw).map_err(|source| DbError::Serde {
            collection: collection.to_string(),
            source,
        })?;

        list.into_iter()
            .map(|doc| {
                doc.id()
                    .map(|id| (id, doc))
                    .ok_or_else(|| DbError::MissingId {
                        collection: collection.to_string(),
                    })
            })
            .collect()
    }

    async fn persist(&self, docs: &BTreeMap<ObjectId, T>) -> Result<(), DbError> {
        let list: Vec<&T> = docs.values().collect();
        let encoded = serde_json::to_vec_pretty(&list).map_err(|source| DbError::Serde {
            collection: self.collection.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, encoded)
            .await
            .map_err(|source| DbError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| DbError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

#[async_trait]
impl<T: Document> DocumentStore<T> for FileStore<T> {
    async fn find_all(&self) -> Result<Vec<T>, DbError> {
        Ok(self.docs.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<T>, DbError> {
        Ok(self.docs.read().await.get(id).cloned())
    }

    async fn insert(&self, doc: T) -> Result<T, DbError> {
        let mut docs = self.docs.write().await;
        let mut next = docs.clone();
        let stored = insert_into(&mut next, doc);
        self.persist(&next).await?;
        *docs = next;
        Ok(stored)
    }

    async fn save(&self, doc: T) -> Result<T, DbError> {
        let mut docs = self.docs.write().await;
        let mut next = docs.clone();
        let stored = save_into(&self.collection, &mut next, doc)?;
        self.persist(&next).await?;
        *docs = next;
        Ok(stored)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, DbError> {
        let mut docs = self.docs.write().await;
        if !docs.contains_key(id) {
            return Ok(false);
        }
        let mut next = docs.clone();
        next.remove(id);
        self.persist(&next).await?;
        *docs = next;
        Ok(true)
    }
}
