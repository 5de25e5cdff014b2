//! `bd build` -- compiles the Markdown report from the current store
//! (§4.7) and writes it to `--output` (default `REPORT.md`).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use beads_config::load_config;
use beads_storage::Store;

use crate::cli::BuildArgs;
use crate::context::RuntimeContext;

const DEFAULT_OUTPUT: &str = "REPORT.md";

pub fn run(ctx: &RuntimeContext, args: &BuildArgs) -> Result<()> {
    let beads_dir = ctx.require_beads_dir()?;
    let config = load_config(beads_dir)?;

    let store = Store::open(beads_dir);
    let issues = store.load().context("failed to load issue store")?;

    let report = beads_report::compile(&issues, &config.report);

    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let requested = args.output.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let output_path = resolve_output_path(&cwd, &requested)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&output_path, &report)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    if !ctx.quiet {
        println!("wrote {}", output_path.display());
    }

    Ok(())
}

/// Resolves `requested` against `cwd`, rejecting anything that would
/// escape it -- spec §6's "`--output` must be validated to resolve
/// strictly inside the current working directory (reject path
/// traversal)". The file itself need not exist yet, so this normalizes
/// `..`/`.` components lexically rather than calling `canonicalize`,
/// which would require the path (or its parent) to already exist.
fn resolve_output_path(cwd: &Path, requested: &Path) -> Result<PathBuf> {
    let joined = if requested.is_absolute() { requested.to_path_buf() } else { cwd.join(requested) };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        use std::path::Component;
        match component {
            Component::ParentDir => {
                if !normalized.pop() {
                    bail!("--output path escapes the current working directory: {}", requested.display());
                }
            }
            Component::CurDir => {}
            other => normalized.push(other),
        }
    }

    if !normalized.starts_with(cwd) {
        bail!("--output path escapes the current working directory: {}", requested.display());
    }

    Ok(normalized)
}
