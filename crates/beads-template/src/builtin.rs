//! Embedded built-in templates, the last link in the resolution chain.

/// The only built-in preset today. `minimal` renders a single issue's
/// title, status, and description -- just enough to be useful with no
/// project-supplied template at all.
const MINIMAL: &str = "\
# {title}

- Status: {status}
- Type: {type}
- Priority: {priority}

{description}
";

pub fn lookup(preset: &str) -> Option<&'static str> {
    match preset {
        "minimal" => Some(MINIMAL),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_is_the_only_builtin() {
        assert!(lookup("minimal").is_some());
        assert!(lookup("detailed").is_none());
    }
}
