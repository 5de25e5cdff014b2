//! `{a.b.c}` slot substitution over a `serde_json::Value` (spec.md §4.10).

use serde_json::Value;

/// Replaces every `{a.b.c}` slot in `template` by resolving the dotted path
/// against `data` and formatting the result; `{{…}}` is a literal escape
/// that passes through as `{…}` without being resolved.
pub fn render(template: &str, data: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }

        if chars.peek() == Some(&'{') {
            chars.next();
            let mut literal = String::new();
            let mut closed = false;
            while let Some(&next) = chars.peek() {
                if next == '}' {
                    chars.next();
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        closed = true;
                        break;
                    }
                    literal.push(next);
                } else {
                    literal.push(chars.next().unwrap());
                }
            }
            out.push('{');
            out.push_str(&literal);
            if closed {
                out.push('}');
            }
            continue;
        }

        let mut path = String::new();
        let mut closed = false;
        for next in chars.by_ref() {
            if next == '}' {
                closed = true;
                break;
            }
            path.push(next);
        }

        if closed {
            out.push_str(&format_value(resolve_path(data, &path)));
        } else {
            out.push('{');
            out.push_str(&path);
        }
    }

    out
}

/// Walks `data` along a dotted path (`"a.b.c"`), returning `None` at any
/// missing segment or non-object intermediate value.
fn resolve_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |value, segment| value.get(segment))
}

fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| format_value(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_a_dotted_path() {
        let data = json!({"issue": {"title": "Fix it"}});
        assert_eq!(render("# {issue.title}", &data), "# Fix it");
    }

    #[test]
    fn missing_path_renders_empty() {
        let data = json!({});
        assert_eq!(render("[{issue.title}]", &data), "[]");
    }

    #[test]
    fn null_value_renders_empty() {
        let data = json!({"description": null});
        assert_eq!(render("[{description}]", &data), "[]");
    }

    #[test]
    fn array_values_are_comma_joined() {
        let data = json!({"labels": ["bug", "p0"]});
        assert_eq!(render("{labels}", &data), "bug, p0");
    }

    #[test]
    fn number_and_bool_use_their_string_form() {
        let data = json!({"priority": 2, "closed": false});
        assert_eq!(render("{priority}/{closed}", &data), "2/false");
    }

    #[test]
    fn double_brace_is_a_literal_escape() {
        let data = json!({"title": "X"});
        assert_eq!(render("{{title}} vs {title}", &data), "{title} vs X");
    }

    #[test]
    fn unterminated_slot_is_passed_through_literally() {
        let data = json!({});
        assert_eq!(render("open {brace", &data), "open {brace");
    }
}
