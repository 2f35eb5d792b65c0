use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by document store backends.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("document {id} not found in collection '{collection}'")]
    NotFound { collection: String, id: String },

    #[error("document in collection '{collection}' has no _id")]
    MissingId { collection: String },

    #[error("collection '{collection}' is already open with a different document type")]
    TypeMismatch { collection: String },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode collection '{collection}': {source}")]
    Serde {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Returned when a string is not a 24 character hexadecimal object id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid object id '{0}'")]
pub struct ParseObjectIdError(pub String);
