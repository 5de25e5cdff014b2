//! Sync Engine (C5): resolves the Change Detector's classifications under a
//! conflict strategy and direction, then executes the writes.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use beads_config::{ConflictStrategy, SyncDirection};
use beads_core::Issue;
use beads_storage::Store;
use tracing::warn;

use crate::conflict::{Resolution, SyncConflict};
use crate::detector::{detect, DetectionResult};
use crate::error::Result;

/// The result of a sync run: what was created/updated in the store, which
/// files were (re)written, and any conflicts left unresolved.
#[derive(Debug, Default)]
pub struct SyncPlan {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub files_written: Vec<PathBuf>,
    pub conflicts: Vec<SyncConflict>,
}

pub struct SyncEngine {
    conflict_strategy: ConflictStrategy,
    direction: SyncDirection,
    dry_run: bool,
}

impl SyncEngine {
    pub fn new(conflict_strategy: ConflictStrategy, direction: SyncDirection, dry_run: bool) -> Self {
        Self {
            conflict_strategy,
            direction,
            dry_run,
        }
    }

    /// Runs one sync pass: loads both sides, detects changes, resolves
    /// conflicts under the configured strategy, and -- unless `dry_run` --
    /// writes the results. Store upserts always happen before file writes
    /// (spec.md §5's ordering guarantee).
    pub fn run(
        &self,
        store: &Store,
        todo_dir: &Path,
        pattern: &str,
        conflict_window: chrono::Duration,
    ) -> Result<SyncPlan> {
        let local = store.load()?;
        let file_issues = load_file_issues(todo_dir)?;

        let DetectionResult {
            mut to_store,
            mut to_files,
            mut conflicts,
        } = detect(&local, &file_issues, conflict_window);

        self.resolve_conflicts(&local, &file_issues, &mut to_store, &mut to_files, &mut conflicts);

        let (to_store, to_files) = self.apply_direction(to_store, to_files);

        let mut plan = SyncPlan {
            conflicts,
            ..Default::default()
        };

        if self.dry_run {
            plan.created = to_store
                .iter()
                .filter(|i| !local.iter().any(|l| l.id == i.id))
                .map(|i| i.id.clone())
                .collect();
            plan.updated = to_store
                .iter()
                .filter(|i| local.iter().any(|l| l.id == i.id))
                .map(|i| i.id.clone())
                .collect();
            let mut existing_filenames = list_filenames(todo_dir)?;
            for issue in &to_files {
                if let Ok(filename) = beads_markdown::apply_pattern(pattern, issue, &existing_filenames) {
                    existing_filenames.insert(filename.clone());
                    plan.files_written.push(todo_dir.join(filename));
                }
            }
            return Ok(plan);
        }

        for issue in to_store {
            let existed = store.find(&issue.id).ok().flatten().is_some();
            match store.upsert(issue.clone()) {
                Ok(()) => {
                    if existed {
                        plan.updated.push(issue.id);
                    } else {
                        plan.created.push(issue.id);
                    }
                }
                Err(err) => warn!(issue_id = %issue.id, error = %err, "store upsert failed"),
            }
        }

        let mut existing_filenames = list_filenames(todo_dir)?;
        for issue in to_files {
            match write_issue_file(todo_dir, pattern, &issue, &mut existing_filenames) {
                Ok(path) => plan.files_written.push(path),
                Err(err) => warn!(issue_id = %issue.id, error = %err, "file write failed"),
            }
        }

        Ok(plan)
    }

    fn resolve_conflicts(
        &self,
        local: &[Issue],
        file_issues: &[Issue],
        to_store: &mut Vec<Issue>,
        to_files: &mut Vec<Issue>,
        conflicts: &mut [SyncConflict],
    ) {
        let local_by_id: HashMap<&str, &Issue> = local.iter().map(|i| (i.id.as_str(), i)).collect();
        let file_by_id: HashMap<&str, &Issue> = file_issues.iter().map(|i| (i.id.as_str(), i)).collect();

        let conflict_ids: HashSet<String> = conflicts.iter().map(|c| c.issue_id.clone()).collect();

        for id in conflict_ids {
            let (Some(store_issue), Some(file_issue)) =
                (local_by_id.get(id.as_str()), file_by_id.get(id.as_str()))
            else {
                continue;
            };

            let resolution = match self.conflict_strategy {
                ConflictStrategy::Local => {
                    to_files.push((*store_issue).clone());
                    Resolution::LocalWins
                }
                ConflictStrategy::Remote => {
                    to_store.push((*file_issue).clone());
                    Resolution::RemoteWins
                }
                ConflictStrategy::Newest => {
                    match (store_issue.updated_at, file_issue.updated_at) {
                        (Some(s), Some(f)) if f > s => to_store.push((*file_issue).clone()),
                        (None, Some(_)) => to_store.push((*file_issue).clone()),
                        _ => to_files.push((*store_issue).clone()),
                    }
                    Resolution::Manual
                }
                ConflictStrategy::Manual => Resolution::Manual,
            };

            for conflict in conflicts.iter_mut().filter(|c| c.issue_id == id) {
                conflict.resolution = resolution;
            }
        }
    }

    fn apply_direction(&self, to_store: Vec<Issue>, to_files: Vec<Issue>) -> (Vec<Issue>, Vec<Issue>) {
        match self.direction {
            SyncDirection::Both => (to_store, to_files),
            SyncDirection::ToStore => (to_store, Vec::new()),
            SyncDirection::ToFile => (Vec::new(), to_files),
        }
    }
}

fn load_file_issues(todo_dir: &Path) -> Result<Vec<Issue>> {
    if !todo_dir.exists() {
        return Ok(Vec::new());
    }
    let mut issues = Vec::new();
    for entry in walk_markdown_files(todo_dir)? {
        let contents = std::fs::read_to_string(&entry)?;
        match beads_markdown::parse_file(&contents) {
            Ok(issue) => issues.push(issue),
            Err(err) => warn!(path = %entry.display(), error = %err, "skipping unparseable file"),
        }
    }
    Ok(issues)
}

fn walk_markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|e| e == "md") {
                files.push(path);
            }
        }
    }
    Ok(files)
}

fn list_filenames(dir: &Path) -> Result<HashSet<String>> {
    let mut names = HashSet::new();
    if dir.exists() {
        for entry in walk_markdown_files(dir)? {
            if let Some(name) = entry.file_name().and_then(|n| n.to_str()) {
                names.insert(name.to_string());
            }
        }
    }
    Ok(names)
}

fn write_issue_file(
    todo_dir: &Path,
    pattern: &str,
    issue: &Issue,
    existing_filenames: &mut HashSet<String>,
) -> Result<PathBuf> {
    let filename = beads_markdown::apply_pattern(pattern, issue, existing_filenames)?;
    existing_filenames.insert(filename.clone());
    let path = todo_dir.join(&filename);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, beads_markdown::serialize_file(issue))?;
    Ok(path)
}
