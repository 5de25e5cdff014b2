//! `bd watch` -- runs the Watcher (§4.6) against the Markdown tree,
//! syncing on every quiescent burst of changes. When a GitHub mirror is
//! configured and its credentials are present in the environment, also
//! starts the Webhook Ingestor and a periodic mirror pull -- the two
//! schedulers spec.md §5 describes sharing one process.

use std::env;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use beads_config::{load_config, BeadsConfig};
use beads_core::idgen::generate_id;
use beads_mirror::{Conventions, GithubClient, MappingStore, MirrorOrchestrator};
use beads_storage::Store;
use beads_sync::engine::SyncEngine;
use beads_watcher::{ChangeCallback, ErrorCallback, SyncCallback, Watcher};
use beads_webhook::{EventHandler, WebhookServer};
use tracing::{error, info, warn};

use crate::context::RuntimeContext;

/// How often the mirror pulls external issues in the background, absent
/// any webhook delivery to prompt an earlier sync.
const MIRROR_PULL_INTERVAL: Duration = Duration::from_secs(5 * 60);

const WEBHOOK_WORKER_COUNT: usize = 4;

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let beads_dir = ctx.require_beads_dir()?.to_path_buf();
    let todo_dir = ctx.todo_dir()?;
    let config = load_config(&beads_dir)?;
    let prefix = config.prefix.clone().unwrap_or_else(|| "bd".to_string());

    let watcher = spawn_file_watcher(&beads_dir, &todo_dir, &config)?;

    let mirror_handle = spawn_mirror(&beads_dir, &config, prefix.clone());
    if mirror_handle.is_none() && !ctx.quiet {
        info!("no GitHub mirror configured (set mirror.owner/repo and GITHUB_TOKEN/GITHUB_WEBHOOK_SECRET to enable)");
    }

    if !ctx.quiet {
        println!("watching {} for changes (Ctrl+C to stop)", todo_dir.display());
    }

    // ctrlc's handler exits the process directly (see main.rs), so this
    // thread just needs to stay alive to keep the watcher and mirror
    // threads running.
    loop {
        thread::sleep(Duration::from_secs(3600));
        let _ = &watcher;
    }
}

fn spawn_file_watcher(beads_dir: &std::path::Path, todo_dir: &std::path::Path, config: &BeadsConfig) -> Result<Watcher> {
    std::fs::create_dir_all(todo_dir)
        .with_context(|| format!("failed to create {}", todo_dir.display()))?;

    let store = Store::open(beads_dir.to_path_buf());
    let todo_dir_owned = todo_dir.to_path_buf();
    let pattern = config.pattern.pattern.clone();
    let conflict_window = config.sync.conflict_window();
    let engine = SyncEngine::new(config.sync.conflict_strategy, config.sync.direction, false);

    let on_change: ChangeCallback = Box::new(|| Ok(()));
    let sync_fn: SyncCallback = Box::new(move || engine.run(&store, &todo_dir_owned, &pattern, conflict_window));
    let on_error: ErrorCallback = Box::new(|err| error!(error = %err, "sync run failed"));

    Watcher::spawn(&[todo_dir], config.sync.debounce(), on_change, sync_fn, on_error)
        .context("failed to start file watcher")
}

/// Starts the webhook server and the periodic pull loop if a mirror is
/// configured and its credentials are present. Returns `None` (and logs
/// nothing louder than info) when the mirror is simply not set up --
/// that's the common case for a repo that doesn't sync to GitHub.
fn spawn_mirror(beads_dir: &std::path::Path, config: &BeadsConfig, prefix: String) -> Option<thread::JoinHandle<()>> {
    let owner = config.mirror.owner.clone()?;
    let repo = config.mirror.repo.clone()?;
    let token = env::var("GITHUB_TOKEN").ok()?;
    let webhook_secret = env::var("GITHUB_WEBHOOK_SECRET").ok()?;
    let bind_addr = env::var("BD_WEBHOOK_ADDR").unwrap_or_else(|_| "127.0.0.1:8088".to_string());

    let mut conventions = Conventions::default();
    if let Some(pattern) = &config.mirror.dependencies_pattern {
        conventions.dependencies.pattern = pattern.clone();
    }
    if let Some(pattern) = &config.mirror.epics_body_pattern {
        conventions.epics.body_pattern = Some(pattern.clone());
    }

    let build_orchestrator = {
        let beads_dir = beads_dir.to_path_buf();
        let owner = owner.clone();
        let repo = repo.clone();
        let token = token.clone();
        let conventions = conventions.clone();
        let conflict_strategy = config.mirror.conflict_strategy;
        move || {
            MirrorOrchestrator::new(
                Store::open(beads_dir.clone()),
                MappingStore::open(beads_dir.clone()),
                GithubClient::new(owner.clone(), repo.clone(), token.clone()),
                conventions.clone(),
                conflict_strategy,
            )
        }
    };

    let webhook_orchestrator = build_orchestrator();
    let handler: EventHandler = Box::new(move |event| {
        let local_prefix = prefix.clone();
        webhook_orchestrator
            .handle_webhook_event(&event, || generate_id(&local_prefix))
            .map_err(|err| Box::new(err) as Box<dyn std::error::Error + Send + Sync>)
    });

    let server = match WebhookServer::bind(&bind_addr, webhook_secret.into_bytes(), handler) {
        Ok(server) => server,
        Err(err) => {
            warn!(error = %err, %bind_addr, "failed to bind webhook server, mirror disabled");
            return None;
        }
    };
    info!(%bind_addr, "webhook server listening");

    let pull_orchestrator = build_orchestrator();
    let pull_prefix = config.prefix.clone().unwrap_or_else(|| "bd".to_string());

    Some(thread::spawn(move || {
        thread::spawn(move || server.run(WEBHOOK_WORKER_COUNT));

        loop {
            thread::sleep(MIRROR_PULL_INTERVAL);
            if let Err(err) = pull_orchestrator.pull(|| generate_id(&pull_prefix)) {
                error!(error = %err, "mirror pull failed");
            }
        }
    }))
}
