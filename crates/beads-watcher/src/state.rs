//! Shared watcher state (spec.md §4.6), mutated by the OS event callback and
//! the debounce-timer callback running on different threads.

use std::time::Instant;

#[derive(Debug, Default)]
pub(crate) struct WatcherState {
    /// Deadline at which the debounce timer fires. `None` means no timer is
    /// currently armed.
    pub(crate) debounce_deadline: Option<Instant>,
    pub(crate) pending_event: bool,
    pub(crate) is_ready: bool,
    pub(crate) is_syncing: bool,
}
