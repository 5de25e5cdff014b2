//! The fixed component set (spec.md §4.10): literal tag replacement over a
//! Markdown table or list, not a general HTML/MDX parser. Each tag is
//! replaced independently and may appear zero or more times in a template.

use std::collections::HashMap;

use beads_core::{Issue, Status};

/// Expands every occurrence of the fixed component tags in `template`.
/// `issues` is the full issue set the `<Issues.*/>` tags draw from;
/// `current` is the issue the `<Issue.*/>` tags render, when rendering a
/// single-issue template (absent for an issue-set-only template, in which
/// case those tags expand to nothing).
pub fn expand(template: &str, issues: &[Issue], current: Option<&Issue>) -> String {
    let mut out = template.to_string();

    out = out.replace("<Issues/>", &issue_table(issues));
    out = out.replace("<Issues.Ready/>", &issue_table(&ready(issues)));
    out = out.replace("<Issues.Blocked/>", &issue_table(&blocked(issues)));
    out = out.replace("<Issues.Closed/>", &issue_table(&closed(issues)));

    let labels = current.map(|i| bullet_list(&i.labels)).unwrap_or_default();
    let dependencies = current.map(|i| bullet_list(&i.depends_on)).unwrap_or_default();
    let dependents = current.map(|i| bullet_list(&dependent_ids(issues, &i.id))).unwrap_or_default();

    out = out.replace("<Issue.Labels/>", &labels);
    out = out.replace("<Issue.Dependencies/>", &dependencies);
    out = out.replace("<Issue.Dependents/>", &dependents);

    out
}

fn issue_table(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return String::new();
    }
    let mut table = String::from("| ID | Title | Status | Priority |\n|---|---|---|---|\n");
    for issue in issues {
        table.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            issue.id, issue.title, issue.status, issue.priority
        ));
    }
    table.trim_end().to_string()
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    items.iter().map(|item| format!("- {item}")).collect::<Vec<_>>().join("\n")
}

/// Open issues with every dependency closed.
fn ready(issues: &[Issue]) -> Vec<Issue> {
    let by_id = index(issues);
    issues
        .iter()
        .filter(|issue| {
            issue.status == Status::Open
                && issue
                    .depends_on
                    .iter()
                    .all(|dep| by_id.get(dep.as_str()).map(|d| d.status == Status::Closed).unwrap_or(true))
        })
        .cloned()
        .collect()
}

/// Open issues with at least one dependency still open or in progress.
fn blocked(issues: &[Issue]) -> Vec<Issue> {
    let by_id = index(issues);
    issues
        .iter()
        .filter(|issue| {
            issue.status == Status::Open
                && issue
                    .depends_on
                    .iter()
                    .any(|dep| by_id.get(dep.as_str()).map(|d| d.status != Status::Closed).unwrap_or(false))
        })
        .cloned()
        .collect()
}

fn closed(issues: &[Issue]) -> Vec<Issue> {
    issues.iter().filter(|i| i.status == Status::Closed).cloned().collect()
}

fn dependent_ids(issues: &[Issue], id: &str) -> Vec<String> {
    issues.iter().filter(|i| i.depends_on.iter().any(|d| d == id)).map(|i| i.id.clone()).collect()
}

fn index(issues: &[Issue]) -> HashMap<&str, &Issue> {
    issues.iter().map(|i| (i.id.as_str(), i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use beads_core::IssueBuilder;

    fn issue(id: &str, status: Status, depends_on: Vec<&str>) -> Issue {
        IssueBuilder::new(format!("Issue {id}"))
            .id(id)
            .status(status)
            .depends_on(depends_on.into_iter().map(String::from).collect())
            .build()
    }

    #[test]
    fn issues_tag_renders_a_table_row_per_issue() {
        let issues = vec![issue("bd-1", Status::Open, vec![])];
        let rendered = expand("<Issues/>", &issues, None);
        assert!(rendered.contains("bd-1"));
        assert!(rendered.contains("| ID | Title"));
    }

    #[test]
    fn ready_excludes_issues_with_open_dependencies() {
        let issues = vec![
            issue("bd-1", Status::Open, vec!["bd-2"]),
            issue("bd-2", Status::Open, vec![]),
        ];
        let rendered = expand("<Issues.Ready/>", &issues, None);
        assert!(!rendered.contains("bd-1"));
        assert!(rendered.contains("bd-2"));
    }

    #[test]
    fn blocked_includes_issues_with_open_dependencies() {
        let issues = vec![
            issue("bd-1", Status::Open, vec!["bd-2"]),
            issue("bd-2", Status::Open, vec![]),
        ];
        let rendered = expand("<Issues.Blocked/>", &issues, None);
        assert!(rendered.contains("bd-1"));
        assert!(!rendered.contains("bd-2"));
    }

    #[test]
    fn closed_only_includes_closed_issues() {
        let issues = vec![issue("bd-1", Status::Closed, vec![]), issue("bd-2", Status::Open, vec![])];
        let rendered = expand("<Issues.Closed/>", &issues, None);
        assert!(rendered.contains("bd-1"));
        assert!(!rendered.contains("bd-2"));
    }

    #[test]
    fn issue_dependents_lists_issues_that_depend_on_current() {
        let issues = vec![
            issue("bd-1", Status::Open, vec!["bd-2"]),
            issue("bd-2", Status::Open, vec![]),
        ];
        let current = issue("bd-2", Status::Open, vec![]);
        let rendered = expand("<Issue.Dependents/>", &issues, Some(&current));
        assert_eq!(rendered, "- bd-1");
    }

    #[test]
    fn empty_issue_set_renders_tags_as_empty_string() {
        assert_eq!(expand("before <Issues/> after", &[], None), "before  after");
    }
}
