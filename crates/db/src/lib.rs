//! Document store abstraction for biblio.
//!
//! A [`Database`] hands out typed collections implementing [`DocumentStore`].
//! Two backends exist: [`MemoryStore`] for tests and throwaway runs, and
//! [`FileStore`] which keeps one JSON file per collection.

use std::any::Any;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

mod error;
mod file;
mod memory;
mod object_id;
mod store;

pub use error::{DbError, ParseObjectIdError};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use object_id::ObjectId;
pub use store::{Document, DocumentStore};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub backend: DatabaseBackend,
    /// Directory holding one `<collection>.json` file per collection.
    #[serde(default = "DatabaseSettings::default_data_dir")]
    pub data_dir: PathBuf,
}

impl DatabaseSettings {
    fn default_data_dir() -> PathBuf {
        PathBuf::from("data")
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            data_dir: Self::default_data_dir(),
        }
    }
}

type OpenCollections = HashMap<String, Arc<dyn Any + Send + Sync>>;

/// Handle to the configured storage backend.
///
/// Collections are opened once and shared, so two callers asking for the same
/// name see the same documents.
pub struct Database {
    settings: DatabaseSettings,
    open: Mutex<OpenCollections>,
}

impl Database {
    /// Prepare the configured backend.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, DbError> {
        if settings.backend == DatabaseBackend::File {
            tokio::fs::create_dir_all(&settings.data_dir)
                .await
                .map_err(|source| DbError::Io {
                    path: settings.data_dir.clone(),
                    source,
                })?;
        }

        tracing::info!(
            target: "biblio-db",
            backend = ?settings.backend,
            data_dir = %settings.data_dir.display(),
            "database ready"
        );

        Ok(Self {
            settings: settings.clone(),
            open: Mutex::new(HashMap::new()),
        })
    }

    /// Database with the in-memory backend.
    pub fn in_memory() -> Self {
        Self {
            settings: DatabaseSettings::default(),
            open: Mutex::new(HashMap::new()),
        }
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.settings.backend
    }

    /// Open the named collection for documents of type `T`.
    pub async fn collection<T: Document>(
        &self,
        name: &str,
    ) -> Result<Arc<dyn DocumentStore<T>>, DbError> {
        let mut open = self.open.lock().await;

        if let Some(existing) = open.get(name) {
            return existing
                .downcast_ref::<Arc<dyn DocumentStore<T>>>()
                .cloned()
                .ok_or_else(|| DbError::TypeMismatch {
                    collection: name.to_string(),
                });
        }

        let store: Arc<dyn DocumentStore<T>> = match self.settings.backend {
            DatabaseBackend::Memory => Arc::new(MemoryStore::<T>::new(name)),
            DatabaseBackend::File => {
                Arc::new(FileStore::<T>::open(&self.settings.data_dir, name).await?)
            }
        };

        open.insert(name.to_string(), Arc::new(store.clone()));
        Ok(store)
    }
}
