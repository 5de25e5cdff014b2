//! Enum types for the beads-sync system.
//!
//! Each enum has a custom `Serialize`/`Deserialize` (plain lowercase string),
//! an `as_str()`, and a `Display` impl, following the pattern the rest of
//! this workspace uses for its status/type enums.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ===========================================================================
// Status
// ===========================================================================

/// Current state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Open,
    InProgress,
    Closed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Normalises an input string to a known [`Status`], accepting the
    /// aliases the Markdown codec's frontmatter must tolerate. Unknown
    /// strings normalise to [`Status::Open`] rather than being rejected --
    /// malformed input should never prevent an issue from loading.
    pub fn normalize(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "open" => Self::Open,
            "in_progress" | "in-progress" | "working" => Self::InProgress,
            "closed" | "done" | "completed" => Self::Closed,
            _ => Self::Open,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Open
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::normalize(&s))
    }
}

// ===========================================================================
// IssueType
// ===========================================================================

/// Categorises the kind of work an issue tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueType {
    Task,
    Bug,
    Feature,
    Epic,
    Chore,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Epic => "epic",
            Self::Chore => "chore",
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Task)
    }

    /// Unknown type strings normalise to [`IssueType::Task`], matching
    /// [`Status::normalize`]'s tolerant-input policy.
    pub fn normalize(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "task" => Self::Task,
            "bug" => Self::Bug,
            "feature" | "enhancement" | "feat" => Self::Feature,
            "epic" => Self::Epic,
            "chore" => Self::Chore,
            _ => Self::Task,
        }
    }
}

impl Default for IssueType {
    fn default() -> Self {
        Self::Task
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for IssueType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IssueType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::normalize(&s))
    }
}

// ===========================================================================
// IssueSource
// ===========================================================================

/// Which side of the sync pair an in-memory [`crate::Issue`] was read from.
///
/// Never serialized to the JSONL store or Markdown frontmatter -- it is
/// provenance attached by the reader, not part of an issue's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueSource {
    Store,
    File,
}

impl IssueSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::File => "file",
        }
    }
}

impl fmt::Display for IssueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_default_is_open() {
        assert_eq!(Status::default(), Status::Open);
        assert!(Status::Open.is_default());
        assert!(!Status::Closed.is_default());
    }

    #[test]
    fn status_roundtrip_serde() {
        let s = Status::InProgress;
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#""in_progress""#);
        let back: Status = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn status_normalizes_aliases() {
        assert_eq!(Status::normalize("in-progress"), Status::InProgress);
        assert_eq!(Status::normalize("working"), Status::InProgress);
        assert_eq!(Status::normalize("done"), Status::Closed);
        assert_eq!(Status::normalize("completed"), Status::Closed);
        assert_eq!(Status::normalize("COMPLETED"), Status::Closed);
    }

    #[test]
    fn status_unknown_falls_back_to_open() {
        assert_eq!(Status::normalize("banana"), Status::Open);
        assert_eq!(Status::normalize(""), Status::Open);
    }

    #[test]
    fn issue_type_normalizes_aliases() {
        assert_eq!(IssueType::normalize("enhancement"), IssueType::Feature);
        assert_eq!(IssueType::normalize("feat"), IssueType::Feature);
        assert_eq!(IssueType::normalize("bug"), IssueType::Bug);
    }

    #[test]
    fn issue_type_unknown_falls_back_to_task() {
        assert_eq!(IssueType::normalize("spike"), IssueType::Task);
    }

    #[test]
    fn issue_source_not_serializable() {
        // IssueSource is provenance only; it deliberately has no serde impl.
        assert_eq!(IssueSource::Store.as_str(), "store");
        assert_eq!(IssueSource::File.as_str(), "file");
    }
}
