//! Minimal YAML-ish scalar grammar: the strict subset spec.md §4.2 actually
//! needs (booleans, decimal numbers, `null`, JSON-style arrays, quoted and
//! bare strings) -- not a general YAML parser.

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Scalar>),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_string_vec(self) -> Vec<String> {
        match self {
            Scalar::Array(items) => items
                .into_iter()
                .filter_map(|s| match s {
                    Scalar::String(s) => Some(s),
                    Scalar::Null => None,
                    other => Some(other.to_display_string()),
                })
                .collect(),
            Scalar::String(s) => vec![s],
            Scalar::Null => Vec::new(),
            other => vec![other.to_display_string()],
        }
    }

    pub fn to_display_string(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::String(s) => s.clone(),
            Scalar::Array(items) => items
                .iter()
                .map(Scalar::to_display_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Escapes a string for frontmatter output. Order matters: backslash first,
/// then double-quote, then newline, so later insertions are never
/// re-escaped.
pub fn encode_string(s: &str) -> String {
    let s = s.replace('\\', "\\\\");
    let s = s.replace('"', "\\\"");
    s.replace('\n', "\\n")
}

/// Reverses [`encode_string`]; the decode order is the mirror image of the
/// encode order.
fn decode_escapes(s: &str) -> String {
    let s = s.replace("\\n", "\n");
    let s = s.replace("\\\"", "\"");
    s.replace("\\\\", "\\")
}

/// Parses one scalar value, as it would appear to the right of `key:` in a
/// frontmatter line (already trimmed of the key and colon).
pub fn parse_scalar(raw: &str) -> Scalar {
    let s = raw.trim();
    if s.is_empty() || s == "null" || s == "~" {
        return Scalar::Null;
    }
    if s == "true" {
        return Scalar::Bool(true);
    }
    if s == "false" {
        return Scalar::Bool(false);
    }
    if let Ok(n) = s.parse::<f64>() {
        return Scalar::Number(n);
    }
    if s.starts_with('[') && s.ends_with(']') {
        let inner = &s[1..s.len() - 1];
        let items = split_top_level(inner)
            .into_iter()
            .filter(|i| !i.trim().is_empty())
            .map(|i| parse_scalar(&i))
            .collect();
        return Scalar::Array(items);
    }
    if s.len() >= 2 && (s.starts_with('"') && s.ends_with('"')) {
        return Scalar::String(decode_escapes(&s[1..s.len() - 1]));
    }
    if s.len() >= 2 && (s.starts_with('\'') && s.ends_with('\'')) {
        return Scalar::String(s[1..s.len() - 1].to_string());
    }
    Scalar::String(s.to_string())
}

/// Splits a comma-separated list, ignoring commas that appear inside a
/// quoted substring.
fn split_top_level(s: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_quotes: Option<char> = None;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match in_quotes {
            Some(q) => {
                current.push(c);
                if c == '\\' {
                    if let Some(&next) = chars.peek() {
                        current.push(next);
                        chars.next();
                    }
                } else if c == q {
                    in_quotes = None;
                }
            }
            None => match c {
                '"' | '\'' => {
                    in_quotes = Some(c);
                    current.push(c);
                }
                ',' => {
                    items.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            },
        }
    }
    if !current.trim().is_empty() {
        items.push(current);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bool_and_null() {
        assert_eq!(parse_scalar("true"), Scalar::Bool(true));
        assert_eq!(parse_scalar("false"), Scalar::Bool(false));
        assert_eq!(parse_scalar("null"), Scalar::Null);
        assert_eq!(parse_scalar(""), Scalar::Null);
    }

    #[test]
    fn parses_number() {
        assert_eq!(parse_scalar("3"), Scalar::Number(3.0));
        assert_eq!(parse_scalar("7.4"), Scalar::Number(7.4));
    }

    #[test]
    fn parses_quoted_string_with_escapes() {
        let parsed = parse_scalar("\"line one\\nline two\"");
        assert_eq!(parsed, Scalar::String("line one\nline two".to_string()));
    }

    #[test]
    fn parses_bare_string() {
        assert_eq!(parse_scalar("open"), Scalar::String("open".to_string()));
    }

    #[test]
    fn parses_array_of_strings() {
        let parsed = parse_scalar(r#"[ "a", "b" ]"#);
        assert_eq!(
            parsed,
            Scalar::Array(vec![
                Scalar::String("a".to_string()),
                Scalar::String("b".to_string())
            ])
        );
    }

    #[test]
    fn encode_decode_roundtrip_with_backslash() {
        let original = "path\\to\\file with \"quotes\"\nand a newline";
        let encoded = encode_string(original);
        let decoded = decode_escapes(&encoded);
        assert_eq!(decoded, original);
    }
}
