//! Resolution chain for the Template Renderer (spec.md §4.10):
//!
//! 1. `<template_dir>/[Issue].mdx` or `<template_dir>/TODO.mdx` -- a
//!    project's own override, checked in that order.
//! 2. `<template_dir>/presets/<preset>.mdx` -- a named preset the project
//!    ships alongside its own template directory.
//! 3. An embedded built-in for `preset`, currently only `"minimal"`.

use std::path::{Path, PathBuf};

use crate::builtin;
use crate::error::{Result, TemplateError};

const CUSTOM_CANDIDATES: [&str; 2] = ["[Issue].mdx", "TODO.mdx"];

/// Resolves the template text to render with, following the chain above.
pub fn resolve(template_dir: &Path, preset: &str) -> Result<String> {
    let mut checked = Vec::new();

    for candidate in CUSTOM_CANDIDATES {
        let path = template_dir.join(candidate);
        checked.push(path.clone());
        if let Some(text) = try_read(&path)? {
            return Ok(text);
        }
    }

    let preset_path = template_dir.join("presets").join(format!("{preset}.mdx"));
    checked.push(preset_path.clone());
    if let Some(text) = try_read(&preset_path)? {
        return Ok(text);
    }

    builtin::lookup(preset).map(str::to_string).ok_or(TemplateError::NotFound(checked))
}

fn try_read(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(TemplateError::Io { path: path.to_path_buf(), source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn falls_back_to_builtin_minimal_when_nothing_on_disk() {
        let dir = tempdir().unwrap();
        let text = resolve(dir.path(), "minimal").unwrap();
        assert!(text.contains("{title}"));
    }

    #[test]
    fn unknown_preset_with_nothing_on_disk_is_not_found() {
        let dir = tempdir().unwrap();
        let err = resolve(dir.path(), "nonexistent").unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }

    #[test]
    fn custom_issue_override_wins_over_preset_and_builtin() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("[Issue].mdx"), "custom: {title}").unwrap();
        assert_eq!(resolve(dir.path(), "minimal").unwrap(), "custom: {title}");
    }

    #[test]
    fn todo_override_is_used_when_issue_override_is_absent() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("TODO.mdx"), "todo: {title}").unwrap();
        assert_eq!(resolve(dir.path(), "minimal").unwrap(), "todo: {title}");
    }

    #[test]
    fn preset_file_wins_over_builtin() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("presets")).unwrap();
        std::fs::write(dir.path().join("presets").join("minimal.mdx"), "preset: {title}").unwrap();
        assert_eq!(resolve(dir.path(), "minimal").unwrap(), "preset: {title}");
    }
}
