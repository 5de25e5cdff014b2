//! Storage error types.

use std::path::PathBuf;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// No `.beads/` directory could be found starting from the given path.
    #[error("no .beads directory found")]
    BeadsDirNotFound,

    /// I/O error while reading or writing the store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The JSONL store is malformed.
    #[error("store error: {0}")]
    Jsonl(#[from] beads_core::jsonl::JsonlError),

    /// A structural validation constraint was violated.
    #[error("validation error: {0}")]
    Validation(#[from] beads_core::ValidationError),

    /// The advisory write lock could not be acquired.
    #[error("lock error: {0}")]
    Lock(#[from] beads_lockfile::LockError),

    /// The atomic rewrite's temp file could not be persisted to `path`.
    #[error("failed to persist rewritten store at {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the storage crate.
pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns `true` if this is a [`StorageError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
