//! `bd sync` -- runs one pass of the Sync Engine (§4.5) between the store
//! and the Markdown tree.

use anyhow::{Context, Result};
use beads_config::load_config;
use beads_storage::Store;
use beads_sync::engine::{SyncEngine, SyncPlan};

use crate::cli::SyncArgs;
use crate::context::RuntimeContext;

pub fn run(ctx: &RuntimeContext, args: &SyncArgs) -> Result<()> {
    let beads_dir = ctx.require_beads_dir()?;
    let todo_dir = ctx.todo_dir()?;
    let config = load_config(beads_dir)?;

    let direction = args.direction.map(Into::into).unwrap_or(config.sync.direction);
    let engine = SyncEngine::new(config.sync.conflict_strategy, direction, args.dry_run);

    let store = Store::open(beads_dir);
    let plan = engine
        .run(&store, &todo_dir, &config.pattern.pattern, config.sync.conflict_window())
        .context("sync run failed")?;

    if ctx.json {
        print_json(&plan)?;
    } else if !ctx.quiet {
        print_human(&plan, args.dry_run);
    }

    if !plan.conflicts.is_empty() {
        anyhow::bail!("{} unresolved conflict(s); see output above", plan.conflicts.len());
    }

    Ok(())
}

fn print_json(plan: &SyncPlan) -> Result<()> {
    let value = serde_json::json!({
        "created": plan.created,
        "updated": plan.updated,
        "files_written": plan.files_written.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
        "conflicts": plan.conflicts.len(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_human(plan: &SyncPlan, dry_run: bool) {
    if dry_run {
        println!("dry run -- no changes written");
    }
    println!("created: {}", plan.created.len());
    for id in &plan.created {
        println!("  + {id}");
    }
    println!("updated: {}", plan.updated.len());
    for id in &plan.updated {
        println!("  ~ {id}");
    }
    println!("files written: {}", plan.files_written.len());
    if !plan.conflicts.is_empty() {
        println!("conflicts: {}", plan.conflicts.len());
        for conflict in &plan.conflicts {
            println!("  ! {:?}", conflict);
        }
    }
}
