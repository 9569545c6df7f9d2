//! Errors raised by the persistence layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable for key `{key}`: {source}")]
    Unavailable {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode task collection: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StorageError {
    pub fn unavailable(key: &str, source: std::io::Error) -> Self {
        StorageError::Unavailable {
            key: key.to_string(),
            source,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
