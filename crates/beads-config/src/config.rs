//! Configuration types and loading for the beads-sync system.
//!
//! The entry point is [`BeadsConfig`], the contents of `.beads/config.yaml`.
//! Loaded with [`load_config`], saved with [`save_config`]. Every field uses
//! a serde default so a partially-specified (or missing) file still yields
//! sensible behavior.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which direction(s) the Sync Engine writes during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SyncDirection {
    #[default]
    Both,
    ToFile,
    ToStore,
}

/// How the Sync Engine resolves a detected conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    #[default]
    Newest,
    Local,
    Remote,
    Manual,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_conflict_window_secs() -> u64 {
    24 * 60 * 60
}

/// Sync Engine (C5) configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub direction: SyncDirection,

    #[serde(default)]
    pub conflict_strategy: ConflictStrategy,

    /// Window within which a local and an external edit are treated as a
    /// conflict rather than a clean "newer wins" (spec.md §9 redesign note).
    #[serde(default = "default_conflict_window_secs", rename = "conflict-window-secs")]
    pub conflict_window_secs: u64,

    /// Debounce window the Watcher (C6) waits after the last filesystem
    /// event before triggering a sync run.
    #[serde(default = "default_debounce_ms", rename = "debounce-ms")]
    pub debounce_ms: u64,
}

impl SyncConfig {
    /// The Change Detector's conflict window, as a `chrono::Duration` so it
    /// can be compared directly against `beads_timeparsing::within_window`.
    pub fn conflict_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.conflict_window_secs as i64)
    }

    /// The Watcher's debounce window, as a `std::time::Duration` for use
    /// with OS timers.
    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            direction: SyncDirection::default(),
            conflict_strategy: ConflictStrategy::default(),
            conflict_window_secs: default_conflict_window_secs(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_pattern() -> String {
    "[yyyy-mm-dd] [Title].md".to_string()
}

fn default_closed_subdir() -> String {
    "closed".to_string()
}

/// Pattern Engine (C3) configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(default = "default_pattern")]
    pub pattern: String,

    #[serde(default = "default_closed_subdir", rename = "closed-subdir")]
    pub closed_subdir: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            closed_subdir: default_closed_subdir(),
        }
    }
}

fn default_completed_limit() -> usize {
    10
}

/// Report Compiler (C7) configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_completed_limit", rename = "completed-limit")]
    pub completed_limit: usize,

    #[serde(default = "default_true", rename = "include-completed")]
    pub include_completed: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            completed_limit: default_completed_limit(),
            include_completed: true,
        }
    }
}

/// How the Mirror Orchestrator resolves a three-way conflict where both
/// the local issue and the external issue moved since `last_synced_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MirrorConflictStrategy {
    #[default]
    NewestWins,
    GithubWins,
    LocalWins,
}

/// Mirror Orchestrator (C9) configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MirrorConfig {
    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub repo: Option<String>,

    /// Regex matched against a comment body to extract a dependency issue
    /// reference, e.g. `depends on #(\d+)`.
    #[serde(default, rename = "dependencies-pattern")]
    pub dependencies_pattern: Option<String>,

    /// Regex matched against an epic's body to extract its child issue
    /// numbers.
    #[serde(default, rename = "epics-body-pattern")]
    pub epics_body_pattern: Option<String>,

    /// This installation's three-way conflict resolution strategy.
    #[serde(default, rename = "conflict-strategy")]
    pub conflict_strategy: MirrorConflictStrategy,
}

/// The full beads-sync configuration, corresponding to `.beads/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BeadsConfig {
    #[serde(default, rename = "issue-prefix")]
    pub prefix: Option<String>,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub pattern: PatternConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub mirror: MirrorConfig,
}

const CONFIG_FILE: &str = "config.yaml";

/// Loads `.beads/config.yaml`, returning [`BeadsConfig::default`] if the
/// file does not exist or is empty.
pub fn load_config(beads_dir: &Path) -> Result<BeadsConfig> {
    let path = beads_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(BeadsConfig::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Ok(BeadsConfig::default());
    }
    Ok(serde_yaml::from_str(&contents)?)
}

/// Writes `config` to `.beads/config.yaml`, creating the directory if
/// necessary.
pub fn save_config(beads_dir: &Path, config: &BeadsConfig) -> Result<()> {
    std::fs::create_dir_all(beads_dir)?;
    let yaml = serde_yaml::to_string(config).expect("BeadsConfig always serializes");
    std::fs::write(beads_dir.join(CONFIG_FILE), yaml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_has_expected_values() {
        let config = BeadsConfig::default();
        assert_eq!(config.sync.direction, SyncDirection::Both);
        assert_eq!(config.sync.conflict_strategy, ConflictStrategy::Newest);
        assert_eq!(config.sync.conflict_window(), chrono::Duration::hours(24));
        assert_eq!(config.pattern.pattern, "[yyyy-mm-dd] [Title].md");
        assert_eq!(config.pattern.closed_subdir, "closed");
        assert_eq!(config.report.completed_limit, 10);
        assert!(config.report.include_completed);
    }

    #[test]
    fn load_missing_config_returns_default() {
        let dir = tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.sync.direction, SyncDirection::Both);
    }

    #[test]
    fn roundtrip_config() {
        let dir = tempdir().unwrap();
        let mut config = BeadsConfig::default();
        config.prefix = Some("bd".to_string());
        config.sync.conflict_strategy = ConflictStrategy::Manual;
        save_config(dir.path(), &config).unwrap();

        let loaded = load_config(dir.path()).unwrap();
        assert_eq!(loaded.prefix.as_deref(), Some("bd"));
        assert_eq!(loaded.sync.conflict_strategy, ConflictStrategy::Manual);
    }

    #[test]
    fn deserialize_partial_yaml() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "issue-prefix: bd\nsync:\n  direction: to-file\n",
        )
        .unwrap();

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.prefix.as_deref(), Some("bd"));
        assert_eq!(config.sync.direction, SyncDirection::ToFile);
        assert_eq!(config.pattern.pattern, "[yyyy-mm-dd] [Title].md");
    }
}
