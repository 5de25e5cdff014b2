//! Errors surfaced by template resolution and rendering.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("I/O error reading template at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("no template found: checked {0:?}")]
    NotFound(Vec<PathBuf>),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
