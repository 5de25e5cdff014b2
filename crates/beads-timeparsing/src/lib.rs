//! Timestamp parsing and comparison helpers shared across the workspace.
//!
//! Every timestamp that crosses a boundary (Markdown frontmatter, the
//! GitHub REST API, a webhook payload) passes through here so malformed
//! input is handled once, consistently: a timestamp that fails to parse is
//! treated as absent rather than propagated as a value that could compare
//! as NaN or panic downstream.

use chrono::{DateTime, Duration, Utc};

/// Parses an ISO-8601 / RFC-3339 timestamp string.
///
/// Returns `None` on any parse failure. Callers that need to surface this
/// to a human use [`display`], which renders `None` as `"unknown"`.
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Formats a timestamp as RFC-3339, or `"unknown"` if absent.
pub fn display(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(t) => t.to_rfc3339(),
        None => "unknown".to_string(),
    }
}

/// Returns `true` if `a` and `b` fall within `window` of each other.
///
/// A missing timestamp on either side never compares as "within window" --
/// an absent value is not close to anything, it is simply unknown.
pub fn within_window(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>, window: Duration) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() <= window,
        _ => false,
    }
}

/// The default conflict-detection window used by the Sync Engine (C5):
/// local and external edits within 24 hours of each other are treated as a
/// conflict rather than a clean "newer wins".
pub fn default_conflict_window() -> Duration {
    Duration::hours(24)
}
