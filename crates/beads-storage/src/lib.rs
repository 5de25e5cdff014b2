//! JSONL store adapter for the beads-sync system (C1).
//!
//! Replaces the teacher's SQLite-backed `Storage` trait with a direct
//! adapter over `.beads/issues.jsonl`, matching spec.md §1's treatment of
//! the canonical store as an opaque JSONL interface.

pub mod dir;
pub mod error;
pub mod store;

pub use error::{Result, StorageError};
pub use store::{find_dir, Store};
