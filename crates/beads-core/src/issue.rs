//! Issue struct -- the central domain model for the beads-sync system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{IssueSource, IssueType, Status};

fn is_empty_vec<T>(v: &Vec<T>) -> bool {
    v.is_empty()
}

/// A trackable work item, shared between the canonical JSONL store and the
/// per-issue Markdown files the sync engine keeps in lockstep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Status::is_default")]
    pub status: Status,

    #[serde(rename = "type", default, skip_serializing_if = "IssueType::is_default")]
    pub issue_type: IssueType,

    /// Priority 0 (highest) -- 4 (lowest). No skip: 0 is a valid value.
    #[serde(default)]
    pub priority: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub labels: Vec<String>,

    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub depends_on: Vec<String>,

    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub blocks: Vec<String>,

    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub children: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    /// Which side this in-memory copy was read from. Never persisted.
    #[serde(skip, default = "default_source")]
    pub source: IssueSource,
}

fn default_source() -> IssueSource {
    IssueSource::Store
}

/// The subset of an [`Issue`]'s fields the Change Detector compares.
///
/// Excludes `updated_at` (a side effect of the write, not content) and
/// `source` (provenance, not content). Relational id lists are sorted so
/// that two issues differing only in insertion order of an unordered
/// relationship compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalProjection {
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub issue_type: IssueType,
    pub priority: i32,
    pub assignee: Option<String>,
    pub parent: Option<String>,
    pub labels: Vec<String>,
    pub depends_on: Vec<String>,
    pub blocks: Vec<String>,
    pub children: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

impl Issue {
    /// Projects this issue down to the fields that determine whether two
    /// copies carry the same content, per the Change Detector's definition
    /// of "modified".
    pub fn canonical_projection(&self) -> CanonicalProjection {
        CanonicalProjection {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            issue_type: self.issue_type,
            priority: self.priority,
            assignee: self.assignee.clone(),
            parent: self.parent.clone(),
            labels: sorted(self.labels.clone()),
            depends_on: sorted(self.depends_on.clone()),
            blocks: sorted(self.blocks.clone()),
            children: sorted(self.children.clone()),
            created_at: self.created_at,
            closed_at: self.closed_at,
        }
    }
}

impl Default for Issue {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: None,
            status: Status::Open,
            issue_type: IssueType::Task,
            priority: 2,
            assignee: None,
            parent: None,
            labels: Vec::new(),
            depends_on: Vec::new(),
            blocks: Vec::new(),
            children: Vec::new(),
            created_at: None,
            updated_at: None,
            closed_at: None,
            source: IssueSource::Store,
        }
    }
}

/// Builder for constructing an [`Issue`] with a fluent API.
pub struct IssueBuilder {
    issue: Issue,
}

impl IssueBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        let mut issue = Issue::default();
        issue.title = title.into();
        Self { issue }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.issue.id = id.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.issue.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.issue.status = status;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.issue.priority = priority;
        self
    }

    pub fn issue_type(mut self, issue_type: IssueType) -> Self {
        self.issue.issue_type = issue_type;
        self
    }

    pub fn assignee(mut self, assignee: impl Into<String>) -> Self {
        self.issue.assignee = Some(assignee.into());
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.issue.parent = Some(parent.into());
        self
    }

    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.issue.labels = labels;
        self
    }

    pub fn depends_on(mut self, ids: Vec<String>) -> Self {
        self.issue.depends_on = ids;
        self
    }

    pub fn blocks(mut self, ids: Vec<String>) -> Self {
        self.issue.blocks = ids;
        self
    }

    pub fn children(mut self, ids: Vec<String>) -> Self {
        self.issue.children = ids;
        self
    }

    pub fn created_at(mut self, t: DateTime<Utc>) -> Self {
        self.issue.created_at = Some(t);
        self
    }

    pub fn updated_at(mut self, t: DateTime<Utc>) -> Self {
        self.issue.updated_at = Some(t);
        self
    }

    pub fn closed_at(mut self, t: DateTime<Utc>) -> Self {
        self.issue.closed_at = Some(t);
        self
    }

    pub fn source(mut self, source: IssueSource) -> Self {
        self.issue.source = source;
        self
    }

    pub fn build(self) -> Issue {
        self.issue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_issue() {
        let issue = Issue::default();
        assert_eq!(issue.status, Status::Open);
        assert_eq!(issue.issue_type, IssueType::Task);
        assert_eq!(issue.priority, 2);
    }

    #[test]
    fn builder_basic() {
        let issue = IssueBuilder::new("Fix the bug")
            .priority(1)
            .status(Status::InProgress)
            .issue_type(IssueType::Bug)
            .assignee("alice")
            .build();

        assert_eq!(issue.title, "Fix the bug");
        assert_eq!(issue.priority, 1);
        assert_eq!(issue.status, Status::InProgress);
        assert_eq!(issue.issue_type, IssueType::Bug);
        assert_eq!(issue.assignee.as_deref(), Some("alice"));
    }

    #[test]
    fn issue_serde_roundtrip() {
        let issue = IssueBuilder::new("Test issue")
            .id("bd-abc123")
            .priority(1)
            .description("A test description")
            .build();

        let json = serde_json::to_string(&issue).unwrap();
        let back: Issue = serde_json::from_str(&json).unwrap();

        assert_eq!(back.title, "Test issue");
        assert_eq!(back.id, "bd-abc123");
        assert_eq!(back.priority, 1);
        assert_eq!(back.description.as_deref(), Some("A test description"));
    }

    #[test]
    fn source_is_never_serialized() {
        let issue = IssueBuilder::new("x").source(IssueSource::File).build();
        let json = serde_json::to_string(&issue).unwrap();
        assert!(!json.contains("source"));
        // Round-tripping through JSON loses provenance -- that's expected,
        // since readers attach `source` themselves as they load an issue.
        let back: Issue = serde_json::from_str(&json).unwrap();
        assert_eq!(back.source, IssueSource::Store);
    }

    #[test]
    fn canonical_projection_ignores_updated_at_and_source() {
        let mut a = IssueBuilder::new("Same content").id("bd-1").build();
        let mut b = a.clone();
        a.updated_at = Some(Utc::now());
        b.updated_at = None;
        a.source = IssueSource::Store;
        b.source = IssueSource::File;
        assert_eq!(a.canonical_projection(), b.canonical_projection());
    }

    #[test]
    fn canonical_projection_is_order_independent_for_relations() {
        let mut a = IssueBuilder::new("x").build();
        let mut b = a.clone();
        a.depends_on = vec!["bd-2".into(), "bd-1".into()];
        b.depends_on = vec!["bd-1".into(), "bd-2".into()];
        assert_eq!(a.canonical_projection(), b.canonical_projection());
    }

    #[test]
    fn canonical_projection_detects_real_changes() {
        let a = IssueBuilder::new("Title A").build();
        let b = IssueBuilder::new("Title B").build();
        assert_ne!(a.canonical_projection(), b.canonical_projection());
    }
}
