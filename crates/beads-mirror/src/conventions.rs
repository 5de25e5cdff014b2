//! Per-installation conventions: how external labels map to the canonical
//! `type`/`priority`/`status`, and the user-supplied regexes used to parse
//! dependency and epic markers out of an issue body (spec.md §4.9, §6).

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};

/// A compiled pattern is capped at this program size. `regex`'s automaton
/// can't backtrack catastrophically, but an adversarial pattern can still
/// blow up compile-time memory -- this bounds that, per spec.md §4.9.
const MAX_COMPILED_PROGRAM_SIZE: usize = 1 << 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conventions {
    #[serde(default)]
    pub labels: LabelConventions,
    #[serde(default)]
    pub dependencies: DependencyConventions,
    #[serde(default)]
    pub epics: EpicConventions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelConventions {
    /// External label -> local `type`.
    #[serde(default, rename = "type")]
    pub r#type: HashMap<String, String>,
    /// External label -> local `priority`.
    #[serde(default)]
    pub priority: HashMap<String, i32>,
    #[serde(default)]
    pub status: StatusLabelConventions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusLabelConventions {
    #[serde(default, rename = "inProgress")]
    pub in_progress: Option<String>,
    #[serde(default)]
    pub blocked: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyConventions {
    /// Regex capturing the dependency-id list, e.g. `Depends on: #123, #456`.
    #[serde(default = "default_dependency_pattern")]
    pub pattern: String,
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for DependencyConventions {
    fn default() -> Self {
        Self {
            pattern: default_dependency_pattern(),
            separator: default_separator(),
        }
    }
}

fn default_dependency_pattern() -> String {
    r"(?i)Depends on:\s*(.+)".to_string()
}

fn default_separator() -> String {
    ", ".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpicConventions {
    #[serde(default, rename = "labelPrefix")]
    pub label_prefix: Option<String>,
    #[serde(default, rename = "bodyPattern")]
    pub body_pattern: Option<String>,
}

impl Conventions {
    pub fn compiled_dependency_pattern(&self) -> Result<Regex> {
        compile_user_pattern(&self.dependencies.pattern)
    }

    pub fn compiled_epic_body_pattern(&self) -> Result<Option<Regex>> {
        self.epics
            .body_pattern
            .as_deref()
            .map(compile_user_pattern)
            .transpose()
    }
}

fn compile_user_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .size_limit(MAX_COMPILED_PROGRAM_SIZE)
        .dfa_size_limit(MAX_COMPILED_PROGRAM_SIZE)
        .build()
        .map_err(MirrorError::PatternUnsafe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dependency_pattern_compiles() {
        let conventions = Conventions::default();
        assert!(conventions.compiled_dependency_pattern().is_ok());
    }

    #[test]
    fn no_epic_body_pattern_is_not_an_error() {
        let conventions = Conventions::default();
        assert!(conventions.compiled_epic_body_pattern().unwrap().is_none());
    }

    #[test]
    fn malformed_user_pattern_is_rejected() {
        let mut conventions = Conventions::default();
        conventions.dependencies.pattern = "(unclosed".to_string();
        assert!(conventions.compiled_dependency_pattern().is_err());
    }
}
