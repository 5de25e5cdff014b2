//! Change Detector (C4): diffs the store-side and file-side issue sets and
//! classifies every pair as add-local, add-remote, modified (no action), or
//! conflict.

use std::collections::{BTreeSet, HashMap};

use beads_core::Issue;
use chrono::{DateTime, Duration, Utc};

use crate::conflict::{Resolution, SyncConflict};

/// Output of [`detect`]: issues to write into the store, issues to write
/// into the file tree, and conflicts that fall within the conflict window.
#[derive(Debug, Default)]
pub struct DetectionResult {
    pub to_store: Vec<Issue>,
    pub to_files: Vec<Issue>,
    pub conflicts: Vec<SyncConflict>,
}

/// Compares `local` (store-sourced) and `files` (file-sourced) issue sets.
///
/// `conflict_window` is the interval within which two differing timestamps
/// are treated as ambiguous (ties, near-ties, or both missing) rather than
/// a clean newer-wins.
pub fn detect(local: &[Issue], files: &[Issue], conflict_window: Duration) -> DetectionResult {
    let local_by_id: HashMap<&str, &Issue> = local.iter().map(|i| (i.id.as_str(), i)).collect();
    let file_by_id: HashMap<&str, &Issue> = files.iter().map(|i| (i.id.as_str(), i)).collect();

    let ids: BTreeSet<&str> = local_by_id
        .keys()
        .chain(file_by_id.keys())
        .copied()
        .collect();

    let mut result = DetectionResult::default();

    for id in ids {
        match (local_by_id.get(id), file_by_id.get(id)) {
            (None, Some(file_issue)) => result.to_store.push((*file_issue).clone()),
            (Some(store_issue), None) => result.to_files.push((*store_issue).clone()),
            (Some(store_issue), Some(file_issue)) => {
                if store_issue.canonical_projection() == file_issue.canonical_projection() {
                    continue;
                }
                if within_conflict_window(store_issue.updated_at, file_issue.updated_at, conflict_window) {
                    for (field, local_value, external_value) in diff_fields(store_issue, file_issue) {
                        result.conflicts.push(SyncConflict {
                            issue_id: id.to_string(),
                            field,
                            local_value,
                            external_value,
                            resolution: Resolution::Manual,
                        });
                    }
                } else if is_newer(file_issue.updated_at, store_issue.updated_at) {
                    result.to_store.push((*file_issue).clone());
                } else {
                    result.to_files.push((*store_issue).clone());
                }
            }
            (None, None) => unreachable!("id only present in the union of both key sets"),
        }
    }

    result
}

fn is_newer(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a > b,
        (Some(_), None) => true,
        _ => false,
    }
}

/// `true` when the two timestamps are close enough (or ambiguous enough --
/// both missing, or one missing) that a clean newer-wins routing can't be
/// trusted, per spec.md §4.4.
fn within_conflict_window(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>, window: Duration) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(_), None) | (None, Some(_)) => true,
        (Some(a), Some(b)) => a == b || beads_timeparsing::within_window(Some(a), Some(b), window),
    }
}

/// Field-by-field comparison between the store-side and file-side copies,
/// excluding `updated_at` and `source` per spec.md §4.4. Relational lists
/// are canonicalized (sorted) before comparison and before formatting into
/// the conflict's display value.
fn diff_fields(store_issue: &Issue, file_issue: &Issue) -> Vec<(String, String, String)> {
    let mut diffs = Vec::new();

    macro_rules! diff_scalar {
        ($field:literal, $a:expr, $b:expr) => {
            if $a != $b {
                diffs.push(($field.to_string(), format!("{:?}", $a), format!("{:?}", $b)));
            }
        };
    }

    diff_scalar!("title", store_issue.title, file_issue.title);
    diff_scalar!("description", store_issue.description, file_issue.description);
    diff_scalar!("status", store_issue.status.as_str(), file_issue.status.as_str());
    diff_scalar!(
        "type",
        store_issue.issue_type.as_str(),
        file_issue.issue_type.as_str()
    );
    diff_scalar!("priority", store_issue.priority, file_issue.priority);
    diff_scalar!("assignee", store_issue.assignee, file_issue.assignee);
    diff_scalar!("parent", store_issue.parent, file_issue.parent);

    diff_relation("labels", &store_issue.labels, &file_issue.labels, &mut diffs);
    diff_relation(
        "depends_on",
        &store_issue.depends_on,
        &file_issue.depends_on,
        &mut diffs,
    );
    diff_relation("blocks", &store_issue.blocks, &file_issue.blocks, &mut diffs);
    diff_relation("children", &store_issue.children, &file_issue.children, &mut diffs);

    diffs
}

fn diff_relation(field: &str, a: &[String], b: &[String], diffs: &mut Vec<(String, String, String)>) {
    let mut a_sorted = a.to_vec();
    let mut b_sorted = b.to_vec();
    a_sorted.sort();
    b_sorted.sort();
    if a_sorted != b_sorted {
        diffs.push((field.to_string(), a_sorted.join(", "), b_sorted.join(", ")));
    }
}
