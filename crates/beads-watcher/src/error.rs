//! Errors surfaced by the Watcher (C6).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("failed to start file-system watch: {0}")]
    Notify(#[from] notify::Error),

    #[error("sync run failed: {0}")]
    Sync(#[from] beads_sync::SyncError),

    #[error("on_change callback failed: {0}")]
    Callback(Box<dyn std::error::Error + Send + Sync>),

    #[error("on_change callback panicked")]
    CallbackPanicked,
}

pub type Result<T> = std::result::Result<T, WatcherError>;
