//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds the state every command handler needs: the
//! resolved `.beads` directory and the global flags. Built once in `main`
//! after CLI parsing, before command dispatch.

use std::env;
use std::path::PathBuf;

use crate::cli::GlobalArgs;

#[derive(Debug)]
pub struct RuntimeContext {
    /// The resolved `.beads` directory, if one could be found or was given
    /// explicitly. `None` only for `init` running in a fresh directory.
    pub beads_dir: Option<PathBuf>,

    pub json: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl RuntimeContext {
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        let beads_dir = global
            .beads_dir
            .clone()
            .or_else(|| env::current_dir().ok().and_then(|cwd| beads_storage::find_dir(&cwd)));

        Self {
            beads_dir,
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        }
    }

    /// The `.beads` directory, or the error every command but `init` should
    /// raise when run outside a beads project.
    pub fn require_beads_dir(&self) -> anyhow::Result<&std::path::Path> {
        self.beads_dir
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no .beads directory found; run `bd init` first"))
    }

    /// The Markdown tree root, sibling to `.beads`.
    pub fn todo_dir(&self) -> anyhow::Result<PathBuf> {
        Ok(self.require_beads_dir()?.parent().unwrap_or(std::path::Path::new(".")).join(".todo"))
    }
}
