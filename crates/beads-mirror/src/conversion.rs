//! `to_local`/`to_external` conversion between the canonical `Issue` and
//! the external tracker's issue shape, under a set of [`Conventions`]
//! (spec.md §4.9). Round-trip safe under the default conventions.

use beads_core::{Issue, IssueBuilder, IssueSource, IssueType, Status};

use crate::conventions::Conventions;
use crate::error::Result;
use crate::github::{ExternalIssue, ExternalIssuePatch};

/// Converts an external-tracker issue into a canonical [`Issue`]. The
/// caller is responsible for assigning `id` (this function has no access
/// to id-allocation policy); `source` is always stamped `Store` since a
/// mirrored issue is reconciled through the store like any other.
pub fn to_local(external: &ExternalIssue, conventions: &Conventions) -> Result<Issue> {
    let mut issue_type = IssueType::Task;
    let mut priority = 2;
    let mut status = if external.state == "closed" {
        Status::Closed
    } else {
        Status::Open
    };

    for label in &external.labels {
        if let Some(local_type) = conventions.labels.r#type.get(label) {
            issue_type = IssueType::normalize(local_type);
        }
        if let Some(local_priority) = conventions.labels.priority.get(label) {
            priority = *local_priority;
        }
        if conventions.labels.status.in_progress.as_deref() == Some(label.as_str()) {
            status = Status::InProgress;
        }
    }

    let depends_on = extract_dependency_ids(external.body.as_deref(), conventions)?;
    let parent = extract_parent_id(external.body.as_deref(), &external.labels, conventions)?;

    let mut builder = IssueBuilder::new(external.title.clone())
        .issue_type(issue_type)
        .priority(priority)
        .status(status)
        .depends_on(depends_on)
        .updated_at(external.updated_at)
        .source(IssueSource::Store);

    if status == Status::Closed {
        builder = builder.closed_at(external.closed_at.unwrap_or(external.updated_at));
    }

    if let Some(body) = &external.body {
        builder = builder.description(body.clone());
    }

    if let Some(parent) = parent {
        builder = builder.parent(parent);
    }

    Ok(builder.build())
}

/// Converts a canonical [`Issue`] into the patch shape used to
/// create/update an external issue.
pub fn to_external(local: &Issue, conventions: &Conventions) -> ExternalIssuePatch {
    let mut labels: Vec<String> = conventions
        .labels
        .r#type
        .iter()
        .filter(|(_, local_type)| IssueType::normalize(local_type) == local.issue_type)
        .map(|(ext_label, _)| ext_label.clone())
        .collect();

    labels.extend(
        conventions
            .labels
            .priority
            .iter()
            .filter(|(_, p)| **p == local.priority)
            .map(|(ext_label, _)| ext_label.clone()),
    );

    if local.status == Status::InProgress {
        if let Some(label) = &conventions.labels.status.in_progress {
            labels.push(label.clone());
        }
    }

    let mut body = local.description.clone().unwrap_or_default();

    if let Some(parent) = &local.parent {
        if let Some(prefix) = &conventions.epics.label_prefix {
            labels.push(format!("{prefix}{parent}"));
        } else if conventions.epics.body_pattern.is_some() {
            if !body.is_empty() {
                body.push_str("\n\n");
            }
            body.push_str(&format!("Epic: #{parent}"));
        }
    }

    labels.sort();
    labels.dedup();

    if !local.depends_on.is_empty() {
        if !body.is_empty() {
            body.push_str("\n\n");
        }
        let refs: Vec<String> = local.depends_on.iter().map(|id| format!("#{id}")).collect();
        body.push_str(&format!("Depends on: {}", refs.join(&conventions.dependencies.separator)));
    }

    ExternalIssuePatch {
        title: local.title.clone(),
        body,
        labels,
        state: if local.status == Status::Closed { "closed" } else { "open" }.to_string(),
    }
}

fn extract_dependency_ids(body: Option<&str>, conventions: &Conventions) -> Result<Vec<String>> {
    let Some(body) = body else {
        return Ok(Vec::new());
    };
    let pattern = conventions.compiled_dependency_pattern()?;
    let Some(caps) = pattern.captures(body) else {
        return Ok(Vec::new());
    };
    let Some(list) = caps.get(1) else {
        return Ok(Vec::new());
    };
    Ok(list
        .as_str()
        .split(&conventions.dependencies.separator)
        .map(|s| s.trim().trim_start_matches('#').to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// Extracts the epic/parent id, preferring a `labelPrefix` match (e.g. a
/// label `epic:bd-7` under prefix `epic:`) and falling back to the
/// `bodyPattern` capture when no prefixed label is present.
fn extract_parent_id(body: Option<&str>, labels: &[String], conventions: &Conventions) -> Result<Option<String>> {
    if let Some(prefix) = &conventions.epics.label_prefix {
        if let Some(id) = labels.iter().find_map(|l| l.strip_prefix(prefix.as_str())) {
            if !id.is_empty() {
                return Ok(Some(id.to_string()));
            }
        }
    }

    let Some(pattern) = conventions.compiled_epic_body_pattern()? else {
        return Ok(None);
    };
    let Some(body) = body else {
        return Ok(None);
    };
    let Some(caps) = pattern.captures(body) else {
        return Ok(None);
    };
    let Some(m) = caps.get(1) else {
        return Ok(None);
    };
    let id = m.as_str().trim().trim_start_matches('#').to_string();
    Ok(if id.is_empty() { None } else { Some(id) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn external(title: &str, body: Option<&str>, labels: &[&str], state: &str) -> ExternalIssue {
        ExternalIssue {
            number: 1,
            title: title.to_string(),
            body: body.map(str::to_string),
            state: state.to_string(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            html_url: "https://github.com/o/r/issues/1".to_string(),
            updated_at: Utc::now(),
            closed_at: None,
        }
    }

    fn conventions() -> Conventions {
        let mut c = Conventions::default();
        c.labels.r#type.insert("bug".to_string(), "bug".to_string());
        c.labels.priority.insert("p0".to_string(), 0);
        c.labels.status.in_progress = Some("in-progress".to_string());
        c
    }

    #[test]
    fn maps_labels_to_local_type_and_priority() {
        let issue = to_local(&external("Broken", None, &["bug", "p0"], "open"), &conventions()).unwrap();
        assert_eq!(issue.issue_type, IssueType::Bug);
        assert_eq!(issue.priority, 0);
        assert_eq!(issue.status, Status::Open);
    }

    #[test]
    fn in_progress_label_maps_to_in_progress_status() {
        let issue = to_local(&external("Working", None, &["in-progress"], "open"), &conventions()).unwrap();
        assert_eq!(issue.status, Status::InProgress);
    }

    #[test]
    fn closed_state_maps_to_closed_status() {
        let issue = to_local(&external("Done", None, &[], "closed"), &conventions()).unwrap();
        assert_eq!(issue.status, Status::Closed);
    }

    #[test]
    fn closed_issue_gets_a_closed_at_timestamp_and_passes_validation() {
        let mut ext = external("Done", None, &[], "closed");
        ext.closed_at = Some(Utc::now());
        let issue = to_local(&ext, &conventions()).unwrap();
        assert_eq!(issue.closed_at, ext.closed_at);
        assert!(beads_core::validate(&issue).is_ok());
    }

    #[test]
    fn closed_issue_without_api_closed_at_falls_back_to_updated_at() {
        let ext = external("Done", None, &[], "closed");
        let issue = to_local(&ext, &conventions()).unwrap();
        assert_eq!(issue.closed_at, Some(ext.updated_at));
        assert!(beads_core::validate(&issue).is_ok());
    }

    #[test]
    fn extracts_dependency_ids_from_body() {
        let issue = to_local(
            &external("Has deps", Some("Depends on: #bd-1, #bd-2"), &[], "open"),
            &conventions(),
        )
        .unwrap();
        assert_eq!(issue.depends_on, vec!["bd-1".to_string(), "bd-2".to_string()]);
    }

    #[test]
    fn type_priority_and_dependencies_round_trip_under_default_conventions() {
        let conventions = conventions();
        let local = IssueBuilder::new("Broken")
            .issue_type(IssueType::Bug)
            .priority(0)
            .depends_on(vec!["bd-1".to_string(), "bd-2".to_string()])
            .build();

        let patch = to_external(&local, &conventions);
        let external = ExternalIssue {
            number: 1,
            title: patch.title,
            body: Some(patch.body),
            state: patch.state,
            labels: patch.labels,
            html_url: "https://github.com/o/r/issues/1".to_string(),
            updated_at: Utc::now(),
            closed_at: None,
        };
        let round_tripped = to_local(&external, &conventions).unwrap();

        assert_eq!(round_tripped.issue_type, local.issue_type);
        assert_eq!(round_tripped.priority, local.priority);
        assert_eq!(round_tripped.depends_on, local.depends_on);
    }

    #[test]
    fn label_prefix_extracts_parent_id() {
        let mut c = conventions();
        c.epics.label_prefix = Some("epic:".to_string());
        let issue = to_local(&external("Child", None, &["epic:bd-7"], "open"), &c).unwrap();
        assert_eq!(issue.parent.as_deref(), Some("bd-7"));
    }

    #[test]
    fn body_pattern_extracts_parent_id_when_no_label_prefix_configured() {
        let mut c = conventions();
        c.epics.body_pattern = Some(r"(?i)Epic:\s*#?(\S+)".to_string());
        let issue = to_local(&external("Child", Some("Epic: #bd-7"), &[], "open"), &c).unwrap();
        assert_eq!(issue.parent.as_deref(), Some("bd-7"));
    }

    #[test]
    fn parent_round_trips_through_label_prefix() {
        let mut c = conventions();
        c.epics.label_prefix = Some("epic:".to_string());
        let local = IssueBuilder::new("Child").parent("bd-7").build();

        let patch = to_external(&local, &c);
        assert!(patch.labels.contains(&"epic:bd-7".to_string()));

        let external = ExternalIssue {
            number: 1,
            title: patch.title,
            body: Some(patch.body),
            state: patch.state,
            labels: patch.labels,
            html_url: "https://github.com/o/r/issues/1".to_string(),
            updated_at: Utc::now(),
            closed_at: None,
        };
        let round_tripped = to_local(&external, &c).unwrap();
        assert_eq!(round_tripped.parent, local.parent);
    }
}
