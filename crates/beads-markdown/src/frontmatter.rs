//! Parses and serializes `.todo/*.md` files: `---\n<frontmatter>\n---\n\n<body>`.

use beads_core::{Issue, IssueBuilder, IssueSource, IssueType, Status};

use crate::error::{MarkdownError, Result};
use crate::scalar::{encode_string, parse_scalar, Scalar};

const RELATED_HEADING: &str = "### Related Issues";
const TITLE_MAX_LEN: usize = 100;

/// Parses the contents of a `.todo/*.md` file into an [`Issue`].
///
/// `source` is always set to [`IssueSource::File`] regardless of what (if
/// anything) the frontmatter's own `source` key says -- provenance is
/// assigned by the reader, not trusted content.
pub fn parse_file(contents: &str) -> Result<Issue> {
    let (frontmatter_block, body) = split_frontmatter(contents)?;
    let fields = parse_frontmatter_block(frontmatter_block);

    let id = fields
        .get("id")
        .and_then(Scalar::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(MarkdownError::MissingId)?;

    let mut builder = IssueBuilder::new(
        fields
            .get("title")
            .and_then(Scalar::as_str)
            .unwrap_or_default()
            .to_string(),
    )
    .id(id)
    .status(
        fields
            .get("state")
            .and_then(Scalar::as_str)
            .map(Status::normalize)
            .unwrap_or_default(),
    )
    .issue_type(
        fields
            .get("type")
            .and_then(Scalar::as_str)
            .map(IssueType::normalize)
            .unwrap_or_default(),
    )
    .priority(
        fields
            .get("priority")
            .map(priority_from_scalar)
            .unwrap_or(2),
    )
    .labels(string_list(&fields, "labels"))
    .depends_on(string_list(&fields, "dependsOn"))
    .blocks(string_list(&fields, "blocks"))
    .children(string_list(&fields, "children"));

    if let Some(assignee) = fields.get("assignee").and_then(Scalar::as_str) {
        builder = builder.assignee(assignee);
    }
    if let Some(parent) = fields.get("parent").and_then(Scalar::as_str) {
        builder = builder.parent(parent);
    }
    if let Some(t) = fields.get("createdAt").and_then(Scalar::as_str).and_then(beads_timeparsing::parse) {
        builder = builder.created_at(t);
    }
    if let Some(t) = fields.get("updatedAt").and_then(Scalar::as_str).and_then(beads_timeparsing::parse) {
        builder = builder.updated_at(t);
    }
    if let Some(t) = fields.get("closedAt").and_then(Scalar::as_str).and_then(beads_timeparsing::parse) {
        builder = builder.closed_at(t);
    }

    let mut issue = builder.source(IssueSource::File).build();
    issue.description = extract_description(body, &issue.title);
    Ok(issue)
}

fn priority_from_scalar(s: &Scalar) -> i32 {
    let raw = match s {
        Scalar::Number(n) => *n,
        Scalar::String(s) => s.parse().unwrap_or(2.0),
        _ => 2.0,
    };
    beads_core::validation::clamp_priority(raw)
}

fn string_list(fields: &std::collections::HashMap<String, Scalar>, key: &str) -> Vec<String> {
    fields
        .get(key)
        .cloned()
        .map(Scalar::into_string_vec)
        .unwrap_or_default()
}

/// Splits `---\n<frontmatter>\n---\n\n<body>` into the frontmatter block and
/// the remaining body text.
fn split_frontmatter(contents: &str) -> Result<(&str, &str)> {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
    let rest = contents
        .strip_prefix("---\n")
        .or_else(|| contents.strip_prefix("---\r\n"))
        .ok_or(MarkdownError::MissingFrontmatter)?;
    let end = rest
        .find("\n---")
        .ok_or(MarkdownError::MissingFrontmatter)?;
    let frontmatter = &rest[..end];
    let after = &rest[end + 4..];
    let body = after.strip_prefix("\r\n").or_else(|| after.strip_prefix('\n')).unwrap_or(after);
    Ok((frontmatter, body))
}

fn parse_frontmatter_block(block: &str) -> std::collections::HashMap<String, Scalar> {
    let mut fields = std::collections::HashMap::new();
    let mut lines = block.lines().peekable();
    while let Some(line) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(colon) = line.find(':') else {
            continue;
        };
        let key = line[..colon].trim().to_string();
        let mut value = line[colon + 1..].trim().to_string();
        // A bracketed array may span lines if it contains an embedded
        // newline inside a quoted element; in practice our own serializer
        // never emits that, so a single line is always enough here.
        while value.starts_with('[') && !value.ends_with(']') {
            if let Some(next) = lines.next() {
                value.push(' ');
                value.push_str(next.trim());
            } else {
                break;
            }
        }
        fields.insert(key, parse_scalar(&value));
    }
    fields
}

/// Recovers the original `description` from a serialized body: strips the
/// leading `# <title>` heading and the generated `### Related Issues`
/// section, so that `parse(serialize(x)).description == x.description`.
fn extract_description(body: &str, title: &str) -> Option<String> {
    let mut rest = body.trim_start();
    let heading = format!("# {title}");
    if let Some(stripped) = rest.strip_prefix(&heading) {
        rest = stripped.trim_start_matches(['\n', '\r']);
    } else if let Some(stripped) = rest.strip_prefix('#') {
        rest = match stripped.find('\n') {
            Some(idx) => &stripped[idx + 1..],
            None => "",
        };
    }
    let before_related = match rest.find(RELATED_HEADING) {
        Some(idx) => &rest[..idx],
        None => rest,
    };
    let trimmed = before_related.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Serializes an [`Issue`] to the bytes of a `.todo/*.md` file.
pub fn serialize_file(issue: &Issue) -> String {
    let mut fm = String::from("---\n");
    write_string(&mut fm, "id", &issue.id);
    write_string(&mut fm, "title", &issue.title);
    write_string(&mut fm, "state", issue.status.as_str());
    write_number(&mut fm, "priority", issue.priority);
    write_string(&mut fm, "type", issue.issue_type.as_str());
    write_array(&mut fm, "labels", &issue.labels);
    write_optional_string(&mut fm, "assignee", issue.assignee.as_deref());
    write_optional_timestamp(&mut fm, "createdAt", issue.created_at);
    write_optional_timestamp(&mut fm, "updatedAt", issue.updated_at);
    write_optional_timestamp(&mut fm, "closedAt", issue.closed_at);
    write_optional_string(&mut fm, "parent", issue.parent.as_deref());
    write_string(&mut fm, "source", IssueSource::File.as_str());
    write_array(&mut fm, "dependsOn", &issue.depends_on);
    write_array(&mut fm, "blocks", &issue.blocks);
    write_array(&mut fm, "children", &issue.children);
    fm.push_str("---\n\n");

    let mut body = format!("# {}\n\n", issue.title);
    if let Some(description) = &issue.description {
        body.push_str(description);
        body.push_str("\n\n");
    }
    let related = related_section(issue);
    if !related.is_empty() {
        body.push_str(&related);
    }

    fm.push_str(&body);
    fm
}

fn related_section(issue: &Issue) -> String {
    let mut out = String::new();
    let groups: [(&str, &[String]); 3] = [
        ("Depends On", &issue.depends_on),
        ("Blocks", &issue.blocks),
        ("Children", &issue.children),
    ];
    let any = groups.iter().any(|(_, ids)| !ids.is_empty());
    if !any {
        return out;
    }
    out.push_str(RELATED_HEADING);
    out.push('\n');
    for (label, ids) in groups {
        if ids.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(&format!("**{label}**\n\n"));
        for id in ids {
            out.push_str(&format!("- [{id}](./{id}.md)\n"));
        }
    }
    out.push('\n');
    out
}

fn write_string(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": \"");
    out.push_str(&encode_string(value));
    out.push_str("\"\n");
}

fn write_optional_string(out: &mut String, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        write_string(out, key, v);
    }
}

fn write_optional_timestamp(out: &mut String, key: &str, value: Option<chrono::DateTime<chrono::Utc>>) {
    if let Some(t) = value {
        write_string(out, key, &beads_timeparsing::display(Some(t)));
    }
}

fn write_number(out: &mut String, key: &str, value: i32) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(&value.to_string());
    out.push('\n');
}

fn write_array(out: &mut String, key: &str, values: &[String]) {
    out.push_str(key);
    out.push_str(": [");
    if !values.is_empty() {
        out.push(' ');
        let encoded: Vec<String> = values
            .iter()
            .map(|v| format!("\"{}\"", encode_string(v)))
            .collect();
        out.push_str(&encoded.join(", "));
        out.push(' ');
    }
    out.push_str("]\n");
}

/// Truncates `title` to `TITLE_MAX_LEN` characters, preferring the nearest
/// earlier word boundary (space or dash) once that boundary lies past 70%
/// of the limit.
pub fn truncate_title(title: &str) -> String {
    truncate_title_to(title, TITLE_MAX_LEN)
}

fn truncate_title_to(title: &str, limit: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= limit {
        return title.trim_end_matches(['-', ' ']).to_string();
    }
    let truncated: String = chars[..limit].iter().collect();
    let min_boundary = ((limit as f64) * 0.7) as usize;
    let boundary = truncated
        .char_indices()
        .rev()
        .find(|&(idx, c)| idx >= min_boundary && (c == ' ' || c == '-'))
        .map(|(idx, _)| idx);
    let cut = match boundary {
        Some(idx) => &truncated[..idx],
        None => &truncated,
    };
    cut.trim_end_matches(['-', ' ']).to_string()
}
