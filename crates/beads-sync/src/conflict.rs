//! `SyncConflict` -- emitted by the Change Detector, resolved by the Sync
//! Engine (spec.md §3).

/// How a [`SyncConflict`] was (or wasn't) resolved.
///
/// `Manual` carries the counter-intuitive-but-intentional meaning spec.md
/// §9 calls out: a conflict resolved deterministically by `newest-wins` is
/// still tagged `Manual`, preserving the source system's behavior rather
/// than inventing a new label for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    LocalWins,
    RemoteWins,
    Manual,
}

/// A single differing field between the store-side and file-side copies of
/// an issue, within the 24-hour (configurable) conflict window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConflict {
    pub issue_id: String,
    pub field: String,
    pub local_value: String,
    pub external_value: String,
    pub resolution: Resolution,
}
