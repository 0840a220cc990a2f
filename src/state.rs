/// Persisted history state
///
/// The CLI runs one command per process, so the history store is loaded
/// from `<data_dir>/history.json` and written back afterwards. An exclusive
/// lock on `<data_dir>/history.lock` is held for the whole
/// load -> mutate -> save cycle, which serializes concurrent invocations
/// the same way the per-owner mutex serializes threads.
use crate::error::{Error, Result};
use crate::history::{HistorySnapshot, HistoryStore};
use crate::storage::BlobStore;
use fs2::FileExt;
use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const STATE_FILE: &str = "history.json";
pub const LOCK_FILE: &str = "history.lock";

/// Exclusive handle on the persisted state; the lock is released on drop
#[derive(Debug)]
pub struct StateFile {
    path: PathBuf,
    _lock: File,
}

impl StateFile {
    /// Create the data directory if needed and block until the lock is ours
    pub fn lock(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;

        let lock_path = data_dir.join(LOCK_FILE);
        let lock = OpenOptions::new().create(true).truncate(false).write(true).open(&lock_path)?;
        lock.lock_exclusive()?;
        debug!("acquired state lock {:?}", lock_path);

        Ok(Self { path: data_dir.join(STATE_FILE), _lock: lock })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store, or start empty when nothing has been saved yet
    pub fn load(&self, blobs: Arc<dyn BlobStore>) -> Result<HistoryStore> {
        if !self.path.exists() {
            debug!("no state at {:?}, starting empty", self.path);
            return Ok(HistoryStore::new(blobs));
        }

        let content = fs::read(&self.path)?;
        let snapshot: HistorySnapshot = serde_json::from_slice(&content)
            .map_err(|e| Error::State(format!("failed to parse {}: {}", self.path.display(), e)))?;

        debug!("loaded history for {} owners from {:?}", snapshot.owners.len(), self.path);
        HistoryStore::from_snapshot(blobs, snapshot)
    }

    /// Write the store back, replacing the previous file atomically
    pub fn save(&self, store: &HistoryStore) -> Result<()> {
        let snapshot = store.snapshot();
        let tmp_path = self.path.with_extension("json.tmp");

        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, &snapshot)
                .map_err(|e| Error::State(format!("failed to serialize history: {}", e)))?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        debug!("saved history for {} owners to {:?}", snapshot.owners.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::*;
    use chrono::Utc;

    #[test]
    fn test_missing_state_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::lock(&dir.path().join("nested")).unwrap();
        let store = state.load(Arc::new(MemoryStore::new())).unwrap();

        assert!(store.owners().is_empty());
        assert!(dir.path().join("nested").join(LOCK_FILE).exists());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let blobs: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
        let owner = OwnerId::new("alice");

        {
            let state = StateFile::lock(dir.path()).unwrap();
            let store = state.load(blobs.clone()).unwrap();
            let mut fields = SummaryFields::default();
            fields.total_count = 2;
            fields.type_distribution.insert("Valve".to_string(), 1);
            fields.type_distribution.insert("Pump".to_string(), 1);
            store.append(&owner, Summary::new(SummaryId::new(), owner.clone(), "a.csv", Utc::now(), fields, None));
            state.save(&store).unwrap();
        }

        let state = StateFile::lock(dir.path()).unwrap();
        let store = state.load(blobs).unwrap();
        let list = store.list(&owner);
        assert_eq!(list.len(), 1);
        let keys: Vec<&str> = list[0].type_distribution.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Valve", "Pump"]);
        assert!(!dir.path().join("history.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_state_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STATE_FILE), "{not json").unwrap();

        let state = StateFile::lock(dir.path()).unwrap();
        let result = state.load(Arc::new(MemoryStore::new()));
        assert!(matches!(result, Err(Error::State(_))));
    }
}
