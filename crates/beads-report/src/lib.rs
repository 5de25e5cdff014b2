//! Report Compiler (C7): renders the union of store- and file-sourced
//! issues into a single Markdown status report.

use beads_config::ReportConfig;
use beads_core::{Issue, IssueType, Status};
use chrono::{DateTime, Utc};

/// Renders `issues` into the fixed `# TODO` report layout from spec.md
/// §4.7. Callers are expected to have already merged the store- and
/// file-sourced issue sets (e.g. via the Change Detector) before calling
/// this -- the compiler itself does no merging.
pub fn compile(issues: &[Issue], config: &ReportConfig) -> String {
    let mut out = String::from("# TODO\n");

    render_in_progress(&mut out, issues);
    render_open(&mut out, issues);
    if config.include_completed {
        render_recently_completed(&mut out, issues, config.completed_limit);
    }

    out
}

fn render_in_progress(out: &mut String, issues: &[Issue]) {
    let mut items: Vec<&Issue> = issues.iter().filter(|i| i.status == Status::InProgress).collect();
    if items.is_empty() {
        return;
    }
    items.sort_by_key(|i| i.priority);

    out.push_str("## In Progress\n");
    for issue in items {
        out.push_str(&format_open_item(issue));
        out.push('\n');
    }
}

fn render_open(out: &mut String, issues: &[Issue]) {
    let open: Vec<&Issue> = issues.iter().filter(|i| i.status == Status::Open).collect();
    if open.is_empty() {
        return;
    }

    out.push_str("## Open\n");

    let sections: [(&str, fn(&Issue) -> bool); 4] = [
        ("Epics", |i| i.issue_type == IssueType::Epic),
        ("Bugs", |i| i.issue_type == IssueType::Bug),
        ("Features", |i| i.issue_type == IssueType::Feature),
        ("Tasks", |i| matches!(i.issue_type, IssueType::Task | IssueType::Chore)),
    ];

    for (heading, predicate) in sections {
        let mut items: Vec<&&Issue> = open.iter().filter(|i| predicate(i)).collect();
        if items.is_empty() {
            continue;
        }
        items.sort_by_key(|i| i.priority);

        out.push_str(&format!("### {heading}\n"));
        for issue in items {
            out.push_str(&format_open_item(issue));
            out.push('\n');
        }
    }
}

fn render_recently_completed(out: &mut String, issues: &[Issue], limit: usize) {
    let mut closed: Vec<&Issue> = issues.iter().filter(|i| i.status == Status::Closed).collect();
    if closed.is_empty() {
        return;
    }
    closed.sort_by(|a, b| b.closed_at.cmp(&a.closed_at));
    closed.truncate(limit);

    out.push_str("## Recently Completed\n");
    for issue in closed {
        out.push_str(&format_closed_item(issue));
        out.push('\n');
    }
}

fn format_open_item(issue: &Issue) -> String {
    let mut meta = format!("{}, P{}", issue.issue_type.as_str(), issue.priority);
    if let Some(assignee) = &issue.assignee {
        meta.push_str(&format!(", @{assignee}"));
    }
    for label in &issue.labels {
        meta.push_str(&format!(" #{label}"));
    }
    format!("- [ ] [#{}] {} - *{}*", issue.id, issue.title, meta)
}

fn format_closed_item(issue: &Issue) -> String {
    format!(
        "- [x] [#{}] {} - *closed {}*",
        issue.id,
        issue.title,
        format_date(issue.closed_at),
    )
}

fn format_date(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use beads_core::IssueBuilder;
    use chrono::Duration;

    fn config() -> ReportConfig {
        ReportConfig::default()
    }

    #[test]
    fn empty_report_has_only_the_heading() {
        assert_eq!(compile(&[], &config()), "# TODO\n");
    }

    #[test]
    fn in_progress_items_sorted_by_priority() {
        let issues = vec![
            IssueBuilder::new("Low priority")
                .id("bd-1")
                .status(Status::InProgress)
                .priority(3)
                .build(),
            IssueBuilder::new("High priority")
                .id("bd-2")
                .status(Status::InProgress)
                .priority(0)
                .build(),
        ];
        let report = compile(&issues, &config());
        let high_pos = report.find("High priority").unwrap();
        let low_pos = report.find("Low priority").unwrap();
        assert!(high_pos < low_pos);
    }

    #[test]
    fn open_items_grouped_by_type_with_chore_folded_into_tasks() {
        let issues = vec![
            IssueBuilder::new("An epic")
                .id("bd-e1")
                .issue_type(IssueType::Epic)
                .build(),
            IssueBuilder::new("A chore")
                .id("bd-c1")
                .issue_type(IssueType::Chore)
                .build(),
        ];
        let report = compile(&issues, &config());
        assert!(report.contains("### Epics"));
        assert!(report.contains("### Tasks"));
        assert!(!report.contains("### Bugs"));
        assert!(!report.contains("### Features"));
        let tasks_pos = report.find("### Tasks").unwrap();
        assert!(report[tasks_pos..].contains("A chore"));
    }

    #[test]
    fn open_item_format_includes_labels_and_assignee() {
        let mut issue = IssueBuilder::new("Styled").id("bd-3").priority(2).build();
        issue.assignee = Some("ada".to_string());
        issue.labels = vec!["urgent".to_string(), "infra".to_string()];
        let report = compile(&[issue], &config());
        assert!(report.contains("- [ ] [#bd-3] Styled - *task, P2, @ada #urgent #infra*"));
    }

    #[test]
    fn recently_completed_sorted_descending_and_truncated() {
        let now = Utc::now();
        let issues: Vec<Issue> = (0..15)
            .map(|i| {
                IssueBuilder::new(format!("Closed {i}"))
                    .id(format!("bd-{i}"))
                    .status(Status::Closed)
                    .closed_at(now - Duration::days(i))
                    .build()
            })
            .collect();
        let report = compile(&issues, &config());
        let pos0 = report.find("Closed 0").unwrap();
        let pos1 = report.find("Closed 1").unwrap();
        assert!(pos0 < pos1);
        assert!(!report.contains("Closed 10"));
    }

    #[test]
    fn completed_section_suppressed_when_disabled() {
        let issue = IssueBuilder::new("Done")
            .id("bd-4")
            .status(Status::Closed)
            .closed_at(Utc::now())
            .build();
        let cfg = ReportConfig {
            include_completed: false,
            ..ReportConfig::default()
        };
        let report = compile(&[issue], &cfg);
        assert!(!report.contains("Recently Completed"));
    }

    #[test]
    fn closed_item_format_matches_spec() {
        let issue = IssueBuilder::new("Ship it")
            .id("bd-5")
            .status(Status::Closed)
            .closed_at(DateTime::parse_from_rfc3339("2026-01-02T00:00:00Z").unwrap().with_timezone(&Utc))
            .build();
        let report = compile(&[issue], &config());
        assert!(report.contains("- [x] [#bd-5] Ship it - *closed 2026-01-02*"));
    }
}
