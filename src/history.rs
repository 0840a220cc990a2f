/// Bounded per-owner summary history
///
/// This module handles:
/// - Keeping each owner's summaries newest first
/// - Evicting everything past the retention bound right after an append
/// - Releasing the raw upload of evicted or deleted summaries once the
///   caller has committed the change
/// - Snapshot/restore for persistence between processes
///
/// Each owner's list sits behind its own mutex, so append + evict for one
/// owner is a single critical section while different owners never wait
/// on each other beyond the brief map lookup.
///
/// `append` and `remove` only detach entries. Their uploads stay in the
/// blob store until `release` is called, so a caller that persists the
/// history can release after the new state is on disk and never leave a
/// saved entry pointing at a deleted file.
use crate::error::{Error, Result};
use crate::storage::BlobStore;
use crate::types::{HISTORY_LIMIT, OwnerId, Summary, SummaryId};
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Newest-first list for a single owner
#[derive(Debug, Default)]
struct OwnerHistory {
    entries: Vec<Arc<Summary>>,
}

impl OwnerHistory {
    /// Put a newcomer at the head
    ///
    /// A timestamp older than the current head (clock stepped back) is
    /// raised to the head's, so the list stays in `uploaded_at` order and
    /// the newest upload is never the one evicted.
    fn push_front(&mut self, mut summary: Summary) -> Arc<Summary> {
        if let Some(head) = self.entries.first()
            && summary.uploaded_at < head.uploaded_at
        {
            warn!("upload time of {} is before {}, using {}", summary.id, head.id, head.uploaded_at);
            summary.uploaded_at = head.uploaded_at;
        }
        let summary = Arc::new(summary);
        self.entries.insert(0, Arc::clone(&summary));
        summary
    }

    fn find(&self, id: &SummaryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == *id)
    }
}

/// Result of a successful append
#[derive(Debug, Clone)]
pub struct Appended {
    /// The summary as now held by the store
    pub summary: Arc<Summary>,
    /// Entries pushed past the retention bound, oldest last; their uploads
    /// are still held until passed to `HistoryStore::release`
    pub evicted: Vec<Arc<Summary>>,
}

/// Serializable form of the whole store
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HistorySnapshot {
    pub version: u8,
    /// Owner -> summaries, newest first
    pub owners: BTreeMap<OwnerId, Vec<Summary>>,
}

impl HistorySnapshot {
    /// Current snapshot format version
    pub const VERSION: u8 = 1;
}

pub struct HistoryStore {
    owners: RwLock<HashMap<OwnerId, Arc<Mutex<OwnerHistory>>>>,
    blobs: Arc<dyn BlobStore>,
    limit: usize,
}

impl HistoryStore {
    /// Create an empty store retaining `HISTORY_LIMIT` summaries per owner
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self::with_limit(blobs, HISTORY_LIMIT)
    }

    /// Create an empty store with a custom bound (at least one entry)
    pub fn with_limit(blobs: Arc<dyn BlobStore>, limit: usize) -> Self {
        Self { owners: RwLock::new(HashMap::new()), blobs, limit: limit.max(1) }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Blob store that holds the raw uploads referenced by this history
    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// Look up an owner's slot without creating it
    fn existing_slot(&self, owner: &OwnerId) -> Option<Arc<Mutex<OwnerHistory>>> {
        self.owners.read().unwrap_or_else(PoisonError::into_inner).get(owner).cloned()
    }

    fn slot(&self, owner: &OwnerId) -> Arc<Mutex<OwnerHistory>> {
        if let Some(slot) = self.existing_slot(owner) {
            return slot;
        }
        let mut owners = self.owners.write().unwrap_or_else(PoisonError::into_inner);
        owners.entry(owner.clone()).or_default().clone()
    }

    /// Add a summary at the head of `owner`'s history and evict past the bound
    ///
    /// The summary is filed under `owner` whatever its own `owner` field
    /// says. Eviction happens before the owner lock is dropped, so no
    /// reader ever observes more than `limit` entries. Evicted uploads are
    /// left for the caller to `release`.
    pub fn append(&self, owner: &OwnerId, mut summary: Summary) -> Appended {
        if summary.owner != *owner {
            warn!("summary {} carries owner {}, filing under {}", summary.id, summary.owner, owner);
            summary.owner = owner.clone();
        }
        let slot = self.slot(owner);
        let mut history = slot.lock().unwrap_or_else(PoisonError::into_inner);

        let summary = history.push_front(summary);
        let evicted = if history.entries.len() > self.limit {
            history.entries.split_off(self.limit)
        } else {
            Vec::new()
        };

        debug!("appended {} for {}, {} retained, {} evicted", summary.id, owner, history.entries.len(), evicted.len());

        Appended { summary, evicted }
    }

    /// Owner's summaries, newest first
    pub fn list(&self, owner: &OwnerId) -> Vec<Arc<Summary>> {
        match self.existing_slot(owner) {
            Some(slot) => {
                let history = slot.lock().unwrap_or_else(PoisonError::into_inner);
                history.entries.clone()
            }
            None => Vec::new(),
        }
    }

    /// Fetch one of the owner's summaries
    ///
    /// Another owner's id fails exactly like an unknown id.
    pub fn get(&self, owner: &OwnerId, id: &SummaryId) -> Result<Arc<Summary>> {
        let slot = self.existing_slot(owner).ok_or(Error::NotFound(*id))?;
        let history = slot.lock().unwrap_or_else(PoisonError::into_inner);
        history.find(id).map(|idx| Arc::clone(&history.entries[idx])).ok_or(Error::NotFound(*id))
    }

    /// Find one of the owner's summaries by full id or by a unique id prefix
    ///
    /// Prefixes match the hyphenless hex form, so the eight digits shown in
    /// listings are enough.
    pub fn resolve(&self, owner: &OwnerId, key: &str) -> Result<Arc<Summary>> {
        if let Ok(id) = key.parse::<SummaryId>() {
            return self.get(owner, &id);
        }

        let prefix = key.trim().replace('-', "").to_ascii_lowercase();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::UnknownId(key.to_string()));
        }

        let mut matches = self.list(owner).into_iter().filter(|s| s.id.simple().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(found), None) => Ok(found),
            (Some(_), Some(_)) => Err(Error::AmbiguousId(key.to_string())),
            (None, _) => Err(Error::UnknownId(key.to_string())),
        }
    }

    /// Detach one of the owner's summaries; its upload is left for `release`
    pub fn remove(&self, owner: &OwnerId, id: &SummaryId) -> Result<Arc<Summary>> {
        let slot = self.existing_slot(owner).ok_or(Error::NotFound(*id))?;
        let mut history = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let idx = history.find(id).ok_or(Error::NotFound(*id))?;
        let removed = history.entries.remove(idx);
        debug!("removed {} for {}", id, owner);
        Ok(removed)
    }

    /// Release the uploads of summaries no longer in the history
    ///
    /// Failures are logged and skipped; a leftover file never undoes a
    /// committed history change.
    pub fn release(&self, summaries: &[Arc<Summary>]) {
        for summary in summaries {
            if let Some(token) = &summary.storage
                && let Err(e) = self.blobs.release(token)
            {
                warn!("failed to release upload {} for {}: {}", token, summary.id, e);
            }
        }
    }

    /// Owners with at least one retained summary, sorted
    pub fn owners(&self) -> Vec<OwnerId> {
        let owners = self.owners.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<OwnerId> = owners
            .iter()
            .filter(|(_, slot)| !slot.lock().unwrap_or_else(PoisonError::into_inner).entries.is_empty())
            .map(|(owner, _)| owner.clone())
            .collect();
        names.sort();
        names
    }

    /// Capture every owner's history
    pub fn snapshot(&self) -> HistorySnapshot {
        let owners = self
            .owners()
            .into_iter()
            .map(|owner| {
                let summaries = self.list(&owner).iter().map(|s| Summary::clone(s)).collect();
                (owner, summaries)
            })
            .collect();
        HistorySnapshot { version: HistorySnapshot::VERSION, owners }
    }

    /// Rebuild a store from a snapshot, keeping each list's order
    ///
    /// Entries filed under the wrong owner, or whose distribution does not
    /// add up to their count, are dropped. Lists longer than the bound are
    /// cut without releasing anything (the blobs may still be referenced by
    /// whoever wrote the snapshot).
    pub fn from_snapshot(blobs: Arc<dyn BlobStore>, snapshot: HistorySnapshot) -> Result<Self> {
        if snapshot.version != HistorySnapshot::VERSION {
            return Err(Error::State(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version,
                HistorySnapshot::VERSION
            )));
        }

        let store = Self::new(blobs);
        {
            let mut owners = store.owners.write().unwrap_or_else(PoisonError::into_inner);
            for (owner, summaries) in snapshot.owners {
                let mut history = OwnerHistory::default();
                for summary in summaries {
                    if summary.owner != owner {
                        warn!("dropping summary {} filed under {} but owned by {}", summary.id, owner, summary.owner);
                        continue;
                    }
                    if !summary.is_consistent() {
                        warn!("dropping summary {}: distribution does not sum to {}", summary.id, summary.total_count);
                        continue;
                    }
                    history.entries.push(Arc::new(summary));
                }
                if history.entries.len() > store.limit {
                    warn!("snapshot for {} holds {} entries, keeping {}", owner, history.entries.len(), store.limit);
                    history.entries.truncate(store.limit);
                }
                owners.insert(owner, Arc::new(Mutex::new(history)));
            }
        }
        Ok(store)
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;
