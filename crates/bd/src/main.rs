//! `bd` -- dependency-aware issue tracker CLI.
//!
//! This is the entry point: parses CLI arguments with clap, resolves the
//! runtime context, and dispatches to command handlers.

mod cli;
mod commands;
mod context;

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

use cli::{Cli, Commands};
use context::RuntimeContext;

/// Tracks whether a Ctrl+C has already been received.
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Argument/usage error, per spec §6.
const EXIT_ARGUMENT_ERROR: i32 = 1;
/// Everything else that fails at runtime, per spec §6.
const EXIT_RUNTIME_ERROR: i32 = 2;

fn main() {
    // Install signal handlers for graceful shutdown.
    // First Ctrl+C: exit cleanly. Second: force exit.
    let _ = ctrlc::set_handler(|| {
        if CTRLC_RECEIVED.swap(true, Ordering::SeqCst) {
            // Second signal: force exit
            std::process::exit(EXIT_RUNTIME_ERROR);
        }
        // First signal: exit cleanly
        std::process::exit(0);
    });

    // clap's own default exit code for a parse failure is 2; spec §6
    // reserves that for runtime errors and wants 1 for argument errors,
    // so parse errors are handled here instead of via `Cli::parse()`.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().ok();
            let code = match e.kind() {
                clap::error::ErrorKind::DisplayHelp
                | clap::error::ErrorKind::DisplayVersion
                | clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
                _ => EXIT_ARGUMENT_ERROR,
            };
            std::process::exit(code);
        }
    };

    let ctx = RuntimeContext::from_global_args(&cli.global);

    if ctx.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("bd=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Build(args) => commands::build::run(&ctx, &args),
        Commands::Sync(args) => commands::sync::run(&ctx, &args),
        Commands::Watch => commands::watch::run(&ctx),
        Commands::Init(args) => commands::init::run(&ctx, &args),
    };

    if let Err(e) = result {
        if cli.global.json {
            let err_json = serde_json::json!({ "error": format!("{:#}", e) });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{s}");
            }
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(EXIT_RUNTIME_ERROR);
    }
}
