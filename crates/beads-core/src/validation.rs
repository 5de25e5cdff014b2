//! Issue validation and normalization rules.

use crate::enums::Status;
use crate::issue::Issue;

/// Error type for validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,

    #[error("id must not be empty or whitespace")]
    IdRequired,

    #[error("id must not contain a path separator: {0:?}")]
    IdContainsPathSeparator(String),

    #[error("closed issues must have closed_at set")]
    ClosedWithoutTimestamp,

    #[error("non-closed issues must not have closed_at set")]
    NotClosedWithTimestamp,
}

/// Validates an issue against the structural invariants every issue must
/// satisfy before it can be written back to the store or a Markdown file.
///
/// Priority is not checked here -- out-of-range priority is corrected by
/// [`clamp_priority`] during parsing rather than rejected, per the "warning,
/// not a hard error" policy for malformed numeric input.
pub fn validate(issue: &Issue) -> Result<(), ValidationError> {
    if issue.title.trim().is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    if !issue.id.is_empty() {
        if issue.id.trim().is_empty() {
            return Err(ValidationError::IdRequired);
        }
        if issue.id.contains('/') || issue.id.contains('\\') {
            return Err(ValidationError::IdContainsPathSeparator(issue.id.clone()));
        }
    }
    if issue.status == Status::Closed && issue.closed_at.is_none() {
        return Err(ValidationError::ClosedWithoutTimestamp);
    }
    if issue.status != Status::Closed && issue.closed_at.is_some() {
        return Err(ValidationError::NotClosedWithTimestamp);
    }
    Ok(())
}

/// Clamps a raw priority value to the valid `0..=4` range.
///
/// Non-integer input is floored first (matching the way the Markdown and
/// JSONL codecs hand this function a parsed `f64`), then range-checked: a
/// floored value outside `0..=4` snaps to the default priority `2` rather
/// than being rejected, since an out-of-range priority is a hygiene issue,
/// not a reason to refuse to load an issue.
pub fn clamp_priority(raw: f64) -> i32 {
    let floored = raw.floor() as i64;
    if !(0..=4).contains(&floored) {
        2
    } else {
        floored as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueBuilder;

    #[test]
    fn valid_issue_passes() {
        let issue = IssueBuilder::new("Valid issue").priority(2).build();
        assert!(validate(&issue).is_ok());
    }

    #[test]
    fn empty_title_fails() {
        let issue = IssueBuilder::new("").build();
        assert!(matches!(validate(&issue), Err(ValidationError::TitleRequired)));
    }

    #[test]
    fn whitespace_only_title_fails() {
        let issue = IssueBuilder::new("   ").build();
        assert!(matches!(validate(&issue), Err(ValidationError::TitleRequired)));
    }

    #[test]
    fn id_with_path_separator_fails() {
        let issue = IssueBuilder::new("Test").id("../evil").build();
        assert!(matches!(
            validate(&issue),
            Err(ValidationError::IdContainsPathSeparator(_))
        ));
    }

    #[test]
    fn closed_without_timestamp_fails() {
        let issue = IssueBuilder::new("Test").status(Status::Closed).build();
        assert!(matches!(
            validate(&issue),
            Err(ValidationError::ClosedWithoutTimestamp)
        ));
    }

    #[test]
    fn closed_with_timestamp_passes() {
        let issue = IssueBuilder::new("Test")
            .status(Status::Closed)
            .closed_at(chrono::Utc::now())
            .build();
        assert!(validate(&issue).is_ok());
    }

    #[test]
    fn not_closed_with_timestamp_fails() {
        let issue = IssueBuilder::new("Test")
            .status(Status::Open)
            .closed_at(chrono::Utc::now())
            .build();
        assert!(matches!(
            validate(&issue),
            Err(ValidationError::NotClosedWithTimestamp)
        ));
    }

    #[test]
    fn clamp_priority_in_range_floors() {
        assert_eq!(clamp_priority(2.9), 2);
        assert_eq!(clamp_priority(0.0), 0);
        assert_eq!(clamp_priority(4.0), 4);
    }

    #[test]
    fn clamp_priority_out_of_range_snaps_to_default() {
        assert_eq!(clamp_priority(7.4), 2);
        assert_eq!(clamp_priority(-1.2), 2);
        assert_eq!(clamp_priority(100.0), 2);
    }
}
