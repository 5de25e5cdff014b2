//! `bd init` -- initialize a `.beads` directory and `.todo` tree in the
//! current directory.

use std::env;
use std::fs;

use anyhow::{bail, Context, Result};
use beads_config::{save_config, BeadsConfig};

use crate::cli::InitArgs;
use crate::context::RuntimeContext;

const GITIGNORE_CONTENT: &str = "# Beads advisory lock\n*.lock\n";

pub fn run(ctx: &RuntimeContext, args: &InitArgs) -> Result<()> {
    let cwd = env::current_dir().context("failed to get current directory")?;
    let beads_dir = cwd.join(".beads");
    let todo_dir = cwd.join(".todo");

    if !args.force && beads_dir.join("issues.jsonl").exists() {
        bail!(
            "Found an existing store at {}\n\nThis directory is already initialized. Use --force to \
             re-initialize (existing data is kept, only missing files are created).",
            beads_dir.display()
        );
    }

    let prefix = args.prefix.clone().unwrap_or_else(|| {
        cwd.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "bd".to_string())
    });
    let prefix = prefix.trim_end_matches('-').to_string();

    fs::create_dir_all(&beads_dir)
        .with_context(|| format!("failed to create directory: {}", beads_dir.display()))?;
    fs::create_dir_all(&todo_dir)
        .with_context(|| format!("failed to create directory: {}", todo_dir.display()))?;

    let gitignore_path = beads_dir.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(&gitignore_path, GITIGNORE_CONTENT)?;
    }

    let issues_path = beads_dir.join("issues.jsonl");
    if !issues_path.exists() {
        fs::write(&issues_path, "")
            .with_context(|| format!("failed to create {}", issues_path.display()))?;
    }

    let mut config = BeadsConfig::default();
    config.prefix = Some(prefix.clone());
    save_config(&beads_dir, &config).context("failed to write .beads/config.yaml")?;

    if !ctx.quiet {
        println!();
        println!("bd initialized successfully!");
        println!();
        println!("  Store: {}", issues_path.display());
        println!("  Markdown tree: {}", todo_dir.display());
        println!("  Issue prefix: {prefix}");
        println!();
        println!("Run `bd sync` to write any store issues out as Markdown, or add a file under");
        println!("{} and run `bd sync` to bring it into the store.", todo_dir.display());
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ctx() -> RuntimeContext {
        RuntimeContext { beads_dir: None, json: false, verbose: false, quiet: true }
    }

    #[test]
    fn creates_store_and_todo_tree() {
        let dir = tempdir().unwrap();
        let original = env::current_dir().unwrap();
        env::set_current_dir(dir.path()).unwrap();

        let result = run(&ctx(), &InitArgs { prefix: Some("bd".to_string()), force: false });

        env::set_current_dir(original).unwrap();
        result.unwrap();

        assert!(dir.path().join(".beads/issues.jsonl").exists());
        assert!(dir.path().join(".beads/config.yaml").exists());
        assert!(dir.path().join(".todo").is_dir());
    }

    #[test]
    fn refuses_to_reinitialize_without_force() {
        let dir = tempdir().unwrap();
        let original = env::current_dir().unwrap();
        env::set_current_dir(dir.path()).unwrap();

        run(&ctx(), &InitArgs { prefix: None, force: false }).unwrap();
        let second = run(&ctx(), &InitArgs { prefix: None, force: false });

        env::set_current_dir(original).unwrap();
        assert!(second.is_err());
    }
}
