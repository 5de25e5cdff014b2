//! JSONL-backed store adapter (C1).
//!
//! The canonical store is `.beads/issues.jsonl`: one JSON object per line,
//! rewritten atomically (write to a temp file, then rename) so a reader
//! never observes a partially-written file.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use beads_core::jsonl::{read_jsonl, write_jsonl};
use beads_core::{validate, Issue};
use beads_lockfile::StoreLock;
use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, StorageError};

const ISSUES_FILE: &str = "issues.jsonl";

/// Handle to the canonical JSONL issue store in a `.beads/` directory.
pub struct Store {
    beads_dir: PathBuf,
}

impl Store {
    /// Opens the store rooted at `beads_dir` (the `.beads/` directory
    /// itself, not its parent). Does not require `issues.jsonl` to exist
    /// yet -- [`Store::load`] treats a missing file as an empty store.
    pub fn open(beads_dir: impl Into<PathBuf>) -> Self {
        Self {
            beads_dir: beads_dir.into(),
        }
    }

    fn issues_path(&self) -> PathBuf {
        self.beads_dir.join(ISSUES_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        beads_lockfile::default_lock_path(&self.beads_dir)
    }

    /// Loads every issue currently in the store, tagged with
    /// `IssueSource::Store`.
    pub fn load(&self) -> Result<Vec<Issue>> {
        let path = self.issues_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let mut issues = Vec::new();
        for result in read_jsonl(reader) {
            issues.push(result?);
        }
        Ok(issues)
    }

    /// Looks up a single issue by id.
    pub fn find(&self, id: &str) -> Result<Option<Issue>> {
        Ok(self.load()?.into_iter().find(|i| i.id == id))
    }

    /// Inserts or replaces an issue (matched by id), validating it first,
    /// then atomically rewriting the whole store under the advisory lock.
    pub fn upsert(&self, issue: Issue) -> Result<()> {
        validate(&issue)?;
        let _lock = StoreLock::acquire(self.lock_path())?;
        let mut issues = self.load()?;
        match issues.iter_mut().find(|i| i.id == issue.id) {
            Some(existing) => *existing = issue,
            None => issues.push(issue),
        }
        self.rewrite(&issues)
    }

    /// Marks an issue closed, setting `status = closed` and `closed_at =
    /// now` if it was not already closed.
    pub fn close(&self, id: &str) -> Result<()> {
        let _lock = StoreLock::acquire(self.lock_path())?;
        let mut issues = self.load()?;
        let issue = issues
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StorageError::not_found("issue", id))?;
        issue.status = beads_core::Status::Closed;
        if issue.closed_at.is_none() {
            issue.closed_at = Some(Utc::now());
        }
        self.rewrite(&issues)
    }

    /// Rewrites `issues.jsonl` atomically: write to a sibling temp file,
    /// then rename over the original so a concurrent reader never sees a
    /// half-written file.
    fn rewrite(&self, issues: &[Issue]) -> Result<()> {
        std::fs::create_dir_all(&self.beads_dir)?;
        let mut tmp = NamedTempFile::new_in(&self.beads_dir)?;
        write_jsonl(tmp.as_file_mut(), issues)?;
        let path = self.issues_path();
        tmp.persist(&path).map_err(|e| StorageError::Persist {
            path: path.clone(),
            source: e.error,
        })?;
        debug!(path = %path.display(), count = issues.len(), "rewrote issue store");
        Ok(())
    }
}

/// Finds the `.beads/` directory starting from `start`.
pub fn find_dir(start: &Path) -> Option<PathBuf> {
    crate::dir::find_dir(start)
}
