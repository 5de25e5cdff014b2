//! Watcher (C6): the concurrency core. Coalesces bursts of file-system
//! events into at most one in-flight sync run, per spec.md §4.6.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};

use crate::error::{Result, WatcherError};
use crate::state::WatcherState;

/// Invoked once per coalesced burst of events, before the Sync Engine runs.
/// Errors are caught (including panics) and routed to `on_error`; they never
/// leak out of the watcher.
pub type ChangeCallback =
    Box<dyn Fn() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

/// Runs the Sync Engine for one pass. Errors are routed to `on_error`.
pub type SyncCallback = Box<dyn Fn() -> beads_sync::Result<beads_sync::SyncPlan> + Send + Sync>;

/// Receives every error the watcher would otherwise swallow.
pub type ErrorCallback = Box<dyn Fn(WatcherError) + Send + Sync>;

/// A time spent idle between events; long enough to never fire spuriously,
/// short enough to re-check `debounce_deadline` promptly once it's armed.
const IDLE_POLL: Duration = Duration::from_secs(3600);

/// Watches a set of paths and serializes the resulting sync runs.
///
/// `close()` is the only cancellation point: it is the one place `is_ready`
/// is cleared, and it blocks until any in-flight sync run finishes.
pub struct Watcher {
    state: Arc<Mutex<WatcherState>>,
    fs_watcher: Option<RecommendedWatcher>,
    debounce_handle: Option<JoinHandle<()>>,
}

impl Watcher {
    /// Starts watching `paths` recursively. `debounce` is the coalescing
    /// window from [`beads_config::SyncConfig::debounce`].
    pub fn spawn(
        paths: &[impl AsRef<Path>],
        debounce: Duration,
        on_change: ChangeCallback,
        sync_fn: SyncCallback,
        on_error: ErrorCallback,
    ) -> Result<Self> {
        let state = Arc::new(Mutex::new(WatcherState {
            is_ready: true,
            ..Default::default()
        }));

        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let mut fs_watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        for path in paths {
            fs_watcher.watch(path.as_ref(), RecursiveMode::Recursive)?;
        }

        let debounce_state = Arc::clone(&state);
        let handle = thread::spawn(move || {
            debounce_loop(rx, debounce_state, debounce, on_change, sync_fn, on_error);
        });

        Ok(Self {
            state,
            fs_watcher: Some(fs_watcher),
            debounce_handle: Some(handle),
        })
    }

    /// Stops the watcher. Sets `is_ready = false` first so no queued event
    /// can start a new run, then tears down the timer and both watchers.
    /// Blocks until any sync already in flight completes.
    pub fn close(mut self) {
        {
            let mut s = self.state.lock().unwrap();
            s.is_ready = false;
            s.debounce_deadline = None;
            s.pending_event = false;
        }
        // Dropping the fs watcher drops its event-channel sender, which
        // unblocks the debounce thread's recv_timeout once it next polls.
        self.fs_watcher.take();
        if let Some(handle) = self.debounce_handle.take() {
            let _ = handle.join();
        }
    }
}

fn debounce_loop(
    rx: mpsc::Receiver<notify::Result<Event>>,
    state: Arc<Mutex<WatcherState>>,
    debounce: Duration,
    on_change: ChangeCallback,
    sync_fn: SyncCallback,
    on_error: ErrorCallback,
) {
    loop {
        let wait = {
            let s = state.lock().unwrap();
            match s.debounce_deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => IDLE_POLL,
            }
        };

        match rx.recv_timeout(wait) {
            Ok(_event) => {
                let mut s = state.lock().unwrap();
                s.debounce_deadline = Some(Instant::now() + debounce);
            }
            Err(RecvTimeoutError::Timeout) => {
                let fired = {
                    let mut s = state.lock().unwrap();
                    match s.debounce_deadline {
                        Some(deadline) if Instant::now() >= deadline => {
                            s.debounce_deadline = None;
                            true
                        }
                        _ => false,
                    }
                };
                if fired {
                    fire(&state, on_change.as_ref(), sync_fn.as_ref(), on_error.as_ref());
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

type OnChangeFn = dyn Fn() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> + Send + Sync;
type SyncFn = dyn Fn() -> beads_sync::Result<beads_sync::SyncPlan> + Send + Sync;
type OnErrorFn = dyn Fn(WatcherError) + Send + Sync;

/// One debounce-timer firing: invokes the callback and the Sync Engine
/// while `is_syncing` is held, then loops once more if an event arrived
/// mid-run (the `pending_event` reschedule in spec.md §4.6 step 4).
fn fire(state: &Arc<Mutex<WatcherState>>, on_change: &OnChangeFn, sync_fn: &SyncFn, on_error: &OnErrorFn) {
    loop {
        {
            let mut s = state.lock().unwrap();
            if s.is_syncing {
                s.pending_event = true;
                return;
            }
            if !s.is_ready {
                return;
            }
            s.is_syncing = true;
        }

        match catch_unwind(AssertUnwindSafe(on_change)) {
            Ok(Ok(())) => {
                if let Err(err) = sync_fn() {
                    on_error(WatcherError::Sync(err));
                }
            }
            Ok(Err(err)) => on_error(WatcherError::Callback(err)),
            Err(_) => on_error(WatcherError::CallbackPanicked),
        }

        let reschedule = {
            let mut s = state.lock().unwrap();
            s.is_syncing = false;
            let pending = s.pending_event;
            s.pending_event = false;
            pending
        };

        if !reschedule {
            return;
        }
    }
}
