//! Configuration for the beads-sync system.
//!
//! Loads and saves `.beads/config.yaml`, giving the Sync Engine, Pattern
//! Engine, Report Compiler, and Mirror Orchestrator typed access to their
//! user-configurable settings.

pub mod config;

pub use config::{
    BeadsConfig, ConflictStrategy, ConfigError, MirrorConfig, MirrorConflictStrategy, PatternConfig,
    ReportConfig, Result, SyncConfig, SyncDirection,
};
