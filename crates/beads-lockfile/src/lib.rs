//! Advisory single-writer locking around store mutation.
//!
//! Every operation that rewrites `.beads/issues.jsonl` (a store upsert, a
//! sync run, a mirror pull) takes this lock first, so two processes never
//! interleave writes to the same store. It is advisory, not mandatory --
//! a process that ignores it can still write -- which matches `fs2`'s
//! underlying OS file-lock semantics.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;

/// Error type for lock operations.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("lock at {0} is already held by another process")]
    AlreadyLocked(PathBuf),
}

/// Result alias for lock operations.
pub type Result<T> = std::result::Result<T, LockError>;

/// An acquired advisory lock. Released automatically when dropped.
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Blocks until the lock at `path` is acquired.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)?;
        file.lock_exclusive()?;
        Ok(Self { file, path })
    }

    /// Attempts to acquire the lock at `path` without blocking.
    ///
    /// Returns [`LockError::AlreadyLocked`] if another process currently
    /// holds it.
    pub fn try_acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self { file, path }),
            Err(_) => Err(LockError::AlreadyLocked(path)),
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

/// Returns the default lock file path for a `.beads` directory.
pub fn default_lock_path(beads_dir: impl AsRef<Path>) -> PathBuf {
    beads_dir.as_ref().join(".lock")
}
