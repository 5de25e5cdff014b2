//! Change Detector (C4) and Sync Engine (C5) for the beads-sync system.

pub mod conflict;
pub mod detector;
pub mod engine;
pub mod error;

pub use conflict::{Resolution, SyncConflict};
pub use detector::{detect, DetectionResult};
pub use engine::{SyncEngine, SyncPlan};
pub use error::{Result, SyncError};
