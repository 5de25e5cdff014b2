//! Three-way sync between the local store and an external tracker
//! (spec.md §4.9).
//!
//! For a mapped issue, resolution compares each side's `updated_at` against
//! the mapping's `last_synced_at`:
//!
//! | local vs synced | external vs synced | action                      |
//! |------------------|--------------------|------------------------------|
//! | unchanged         | unchanged          | no-op                        |
//! | changed           | unchanged          | push local -> external       |
//! | unchanged         | changed            | pull external -> local       |
//! | changed           | changed            | conflict, resolve by strategy |

use std::collections::HashSet;
use std::sync::Mutex;

use beads_config::MirrorConflictStrategy;
use beads_storage::Store;
use beads_webhook::WebhookEvent;
use chrono::Utc;

use crate::conventions::Conventions;
use crate::conversion::{to_external, to_local};
use crate::error::{MirrorError, Result};
use crate::github::GithubClient;
use crate::mapping::{IssueMapping, MappingStore};

/// Coordinates a local [`Store`] with a [`GithubClient`] through a
/// [`MappingStore`], guaranteeing at most one in-flight sync operation per
/// local issue id at a time.
pub struct MirrorOrchestrator {
    store: Store,
    mappings: MappingStore,
    github: GithubClient,
    conventions: Conventions,
    conflict_strategy: MirrorConflictStrategy,
    in_flight: Mutex<HashSet<String>>,
}

/// Which side actually changed, relative to the mapping's
/// `last_synced_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    NoOp,
    PushLocal,
    PullExternal,
    Conflict,
}

impl MirrorOrchestrator {
    pub fn new(
        store: Store,
        mappings: MappingStore,
        github: GithubClient,
        conventions: Conventions,
        conflict_strategy: MirrorConflictStrategy,
    ) -> Self {
        Self {
            store,
            mappings,
            github,
            conventions,
            conflict_strategy,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Acquires the in-flight guard for `local_id`, or returns
    /// [`MirrorError::InFlight`] if another sync for the same id is already
    /// running.
    fn acquire(&self, local_id: &str) -> Result<InFlightGuard<'_>> {
        let mut guard = self.in_flight.lock().expect("in-flight set poisoned");
        if !guard.insert(local_id.to_string()) {
            return Err(MirrorError::InFlight(local_id.to_string()));
        }
        drop(guard);
        Ok(InFlightGuard { set: &self.in_flight, local_id: local_id.to_string() })
    }

    /// Brings one mapped local issue into agreement with its external
    /// counterpart, resolving any conflict by the installation's configured
    /// [`MirrorConflictStrategy`].
    pub fn sync_issue(&self, local_id: &str) -> Result<()> {
        let _guard = self.acquire(local_id)?;

        let mapping = self
            .mappings
            .by_local_id(local_id)?
            .ok_or_else(|| MirrorError::ExternalApi(format!("no mapping for local id {local_id}")))?;
        let local = self
            .store
            .find(local_id)?
            .ok_or_else(|| beads_storage::StorageError::not_found("issue", local_id))?;
        let external = self.github.list_issues()?.into_iter().find(|i| i.number == mapping.external_number);
        let Some(external) = external else {
            return Err(MirrorError::ExternalApi(format!(
                "external issue #{} no longer exists",
                mapping.external_number
            )));
        };

        let local_changed = local.updated_at.map(|t| t > mapping.last_synced_at).unwrap_or(false);
        let external_changed = external.updated_at > mapping.last_synced_at;

        let resolution = match (local_changed, external_changed) {
            (false, false) => Resolution::NoOp,
            (true, false) => Resolution::PushLocal,
            (false, true) => Resolution::PullExternal,
            (true, true) => Resolution::Conflict,
        };

        let direction = match resolution {
            Resolution::NoOp => return Ok(()),
            Resolution::PushLocal => Resolution::PushLocal,
            Resolution::PullExternal => Resolution::PullExternal,
            Resolution::Conflict => match self.conflict_strategy {
                MirrorConflictStrategy::GithubWins => Resolution::PullExternal,
                MirrorConflictStrategy::LocalWins => Resolution::PushLocal,
                MirrorConflictStrategy::NewestWins => {
                    let local_ts = local.updated_at.unwrap_or(mapping.last_synced_at);
                    if local_ts >= external.updated_at {
                        Resolution::PushLocal
                    } else {
                        Resolution::PullExternal
                    }
                }
            },
        };

        match direction {
            Resolution::PushLocal => {
                let patch = to_external(&local, &self.conventions);
                let updated = self.github.update_issue(mapping.external_number, &patch)?;
                self.record_synced(local_id, mapping.external_number, &updated.html_url, &local, &updated)
            }
            Resolution::PullExternal => {
                let mut incoming = to_local(&external, &self.conventions)?;
                incoming.id = local_id.to_string();
                self.store.upsert(incoming)?;
                let written = self
                    .store
                    .find(local_id)?
                    .ok_or_else(|| beads_storage::StorageError::not_found("issue", local_id))?;
                self.record_synced(local_id, mapping.external_number, &mapping.external_url, &written, &external)
            }
            _ => unreachable!("NoOp handled above"),
        }
    }

    /// Records the mapping's three timestamps from the state that was
    /// actually written, not the pre-write snapshot -- reusing the snapshot
    /// here is the known-bad pattern that causes re-sync loops, since the
    /// write may have normalized fields (e.g. a timestamp bump on upsert)
    /// that the snapshot didn't reflect.
    fn record_synced(
        &self,
        local_id: &str,
        external_number: u64,
        external_url: &str,
        written_local: &beads_core::Issue,
        written_external: &crate::github::ExternalIssue,
    ) -> Result<()> {
        let now = Utc::now();
        self.mappings.upsert(IssueMapping {
            local_id: local_id.to_string(),
            external_number,
            external_url: external_url.to_string(),
            last_synced_at: now,
            local_updated_at: written_local.updated_at.unwrap_or(now),
            external_updated_at: written_external.updated_at,
        })?;
        Ok(())
    }

    /// Imports one external issue that has no mapping yet: creates a local
    /// issue and records the mapping.
    fn import(&self, external: &crate::github::ExternalIssue, next_local_id: impl FnOnce() -> String) -> Result<()> {
        let local_id = next_local_id();
        let _guard = self.acquire(&local_id)?;

        let mut issue = to_local(external, &self.conventions)?;
        issue.id = local_id.clone();
        self.store.upsert(issue)?;
        let written = self
            .store
            .find(&local_id)?
            .ok_or_else(|| beads_storage::StorageError::not_found("issue", &local_id))?;
        self.record_synced(&local_id, external.number, &external.html_url, &written, external)
    }

    /// Pulls every issue from the external tracker, importing anything
    /// unmapped and resolving everything already mapped (spec.md §4.9's
    /// "periodic reconciliation pass"). `next_local_id` allocates a fresh
    /// local id for a newly-imported issue.
    pub fn pull(&self, next_local_id: impl Fn() -> String) -> Result<()> {
        for external in self.github.list_issues()? {
            match self.mappings.by_external_number(external.number)? {
                Some(mapping) => self.sync_issue(&mapping.local_id)?,
                None => self.import(&external, || next_local_id())?,
            }
        }
        Ok(())
    }

    /// Applies an inbound webhook event (spec.md §4.8/§4.9): an `issues`
    /// event for a mapped issue triggers the same three-way resolution a
    /// reconciliation pass would. An event for an unmapped issue number is
    /// imported as a new local issue. Any other event is ignored -- it
    /// carries no issue state this orchestrator tracks.
    pub fn handle_webhook_event(
        &self,
        event: &WebhookEvent,
        next_local_id: impl Fn() -> String,
    ) -> Result<()> {
        let Some(number) = issue_number(event) else {
            return Ok(());
        };

        match self.mappings.by_external_number(number)? {
            Some(mapping) => self.sync_issue(&mapping.local_id),
            None => {
                let external = self
                    .github
                    .list_issues()?
                    .into_iter()
                    .find(|i| i.number == number)
                    .ok_or_else(|| MirrorError::ExternalApi(format!("webhook referenced unknown issue #{number}")))?;
                self.import(&external, next_local_id)
            }
        }
    }
}

/// Pulls the GitHub issue number out of an `issues`/`issue_comment` webhook
/// payload's `issue.number` field. Other event kinds (installation events,
/// unrecognized events) carry no issue reference.
fn issue_number(event: &WebhookEvent) -> Option<u64> {
    let payload = match event {
        WebhookEvent::Issues { payload, .. } | WebhookEvent::IssueComment { payload, .. } => payload,
        WebhookEvent::Installation { .. } | WebhookEvent::Unknown { .. } => return None,
    };
    payload.get("issue")?.get("number")?.as_u64()
}

/// RAII guard releasing a local id's in-flight marker on drop, including on
/// the unwinding/early-return paths of [`MirrorOrchestrator::sync_issue`].
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    local_id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().expect("in-flight set poisoned").remove(&self.local_id);
    }
}
