//! Discovery of the `.beads/` metadata directory.
//!
//! Walks up the directory tree from a starting point looking for `.beads/`,
//! the same way the teacher's `beads-config::beads_dir` module does, with
//! `BEADS_DIR` taking priority over the filesystem walk.

use std::path::{Path, PathBuf};

use crate::error::{Result, StorageError};

const BEADS_DIR_NAME: &str = ".beads";
const BEADS_DIR_ENV: &str = "BEADS_DIR";

/// Walks up from `start` looking for a `.beads/` directory.
///
/// Returns `None` if the filesystem root is reached without finding one.
/// `BEADS_DIR` is checked first and wins outright if it names a directory
/// that exists.
pub fn find_dir(start: &Path) -> Option<PathBuf> {
    if let Ok(env_dir) = std::env::var(BEADS_DIR_ENV) {
        let env_path = PathBuf::from(&env_dir);
        if env_path.is_dir() {
            return Some(env_path);
        }
    }

    let start = start.canonicalize().ok()?;
    let mut current = start.as_path();
    loop {
        let candidate = current.join(BEADS_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => break,
        }
    }
    None
}

/// Like [`find_dir`], but returns [`StorageError::BeadsDirNotFound`] instead
/// of `None`.
pub fn find_dir_or_error(start: &Path) -> Result<PathBuf> {
    find_dir(start).ok_or(StorageError::BeadsDirNotFound)
}

/// Ensures a `.beads/` directory exists under (or at) `path`, creating it
/// and any missing parents as needed.
pub fn ensure_dir(path: &Path) -> Result<PathBuf> {
    let beads_dir = if path.ends_with(BEADS_DIR_NAME) {
        path.to_path_buf()
    } else {
        path.join(BEADS_DIR_NAME)
    };
    std::fs::create_dir_all(&beads_dir)?;
    Ok(beads_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_beads_dir_at_start() {
        let dir = tempfile::tempdir().unwrap();
        let beads = dir.path().join(".beads");
        std::fs::create_dir(&beads).unwrap();

        let found = find_dir(dir.path()).unwrap().canonicalize().unwrap();
        assert_eq!(found, beads.canonicalize().unwrap());
    }

    #[test]
    fn finds_beads_dir_from_child() {
        let dir = tempfile::tempdir().unwrap();
        let beads = dir.path().join(".beads");
        std::fs::create_dir(&beads).unwrap();
        let child = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&child).unwrap();

        let found = find_dir(&child).unwrap().canonicalize().unwrap();
        assert_eq!(found, beads.canonicalize().unwrap());
    }

    #[test]
    fn ensure_dir_creates_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let first = ensure_dir(dir.path()).unwrap();
        let second = ensure_dir(dir.path()).unwrap();
        assert!(first.is_dir());
        assert_eq!(first, second);
    }

    #[test]
    fn ensure_dir_already_named_beads() {
        let dir = tempfile::tempdir().unwrap();
        let beads = dir.path().join(".beads");
        let result = ensure_dir(&beads).unwrap();
        assert_eq!(result, beads);
    }
}
