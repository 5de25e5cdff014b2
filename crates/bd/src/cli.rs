//! Clap CLI definitions for the `bd` command.
//!
//! Four commands, matching spec §6 exactly: `build`, `sync`, `watch`,
//! `init`. Argument-parsing polish beyond what each command needs is an
//! explicit non-goal.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// bd -- dependency-aware issue tracker, synced between a JSONL store and
/// per-issue Markdown files.
#[derive(Parser, Debug)]
#[command(name = "bd", about = "Dependency-aware issue tracker", version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Global flags available to every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to the `.beads` directory (default: auto-discover by walking up
    /// from the current directory).
    #[arg(long, global = true)]
    pub beads_dir: Option<PathBuf>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug logging.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile the Markdown report from the current store (§4.7).
    Build(BuildArgs),

    /// Run one sync pass between the store and the Markdown files (§4.5).
    Sync(SyncArgs),

    /// Watch the Markdown tree and sync on every quiescent change (§4.6).
    Watch,

    /// Initialize a `.beads` directory in the current directory.
    Init(InitArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Where to write the compiled report. Must resolve strictly inside
    /// the current working directory -- path traversal is rejected.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Compute and report the sync plan without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Which direction(s) to write during this run.
    #[arg(long, value_enum)]
    pub direction: Option<CliSyncDirection>,
}

/// Mirrors `beads_config::SyncDirection`, but spelled the way spec §6
/// names it on the command line (`bidirectional`/`store-to-files`/
/// `files-to-store`) rather than the internal enum's variant names.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CliSyncDirection {
    Bidirectional,
    StoreToFiles,
    FilesToStore,
}

impl From<CliSyncDirection> for beads_config::SyncDirection {
    fn from(value: CliSyncDirection) -> Self {
        match value {
            CliSyncDirection::Bidirectional => beads_config::SyncDirection::Both,
            CliSyncDirection::StoreToFiles => beads_config::SyncDirection::ToFile,
            CliSyncDirection::FilesToStore => beads_config::SyncDirection::ToStore,
        }
    }
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Issue prefix for generated ids (default: current directory name).
    #[arg(short = 'p', long)]
    pub prefix: Option<String>,

    /// Re-initialize even if a `.beads` directory already exists.
    #[arg(long)]
    pub force: bool,
}
