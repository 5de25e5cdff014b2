//! Template Renderer (C10): resolves a project's `.mdx` template by a fixed
//! chain, then renders it against an issue set (spec.md §4.10).

mod builtin;
mod components;
mod error;
mod render;
mod resolve;

use std::path::Path;

use beads_core::Issue;

pub use error::{Result, TemplateError};

/// Resolves the template for `preset` under `template_dir`, then renders it
/// against `issues`. `current`, when set, is the single issue the
/// `<Issue.*/>` tags and the `{a.b.c}` slots resolve against; `<Issues.*/>`
/// tags always draw from the full `issues` set.
pub fn render(template_dir: &Path, preset: &str, issues: &[Issue], current: Option<&Issue>) -> Result<String> {
    let template = resolve::resolve(template_dir, preset)?;
    let expanded = components::expand(&template, issues, current);
    let data = current.map(|issue| serde_json::to_value(issue).unwrap_or(serde_json::Value::Null)).unwrap_or(serde_json::Value::Null);
    Ok(render::render(&expanded, &data))
}
