//! Watcher (C6): coalesces file-system events into serialized, debounced
//! sync runs.

mod error;
mod state;
mod watcher;

pub use error::{Result, WatcherError};
pub use watcher::{ChangeCallback, ErrorCallback, SyncCallback, Watcher};
