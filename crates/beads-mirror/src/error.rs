//! Errors surfaced by the Mirror Orchestrator (C9).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed mapping record at line {line}: {source}")]
    MappingParse { line: usize, source: serde_json::Error },

    #[error("store error: {0}")]
    Storage(#[from] beads_storage::StorageError),

    #[error("unsafe user-supplied convention pattern: {0}")]
    PatternUnsafe(#[from] regex::Error),

    #[error("github api transport error: {0}")]
    Transport(#[from] ureq::Error),

    #[error("github api error: {0}")]
    ExternalApi(String),

    #[error("mapping already has an in-flight operation for local id {0}")]
    InFlight(String),
}

pub type Result<T> = std::result::Result<T, MirrorError>;
