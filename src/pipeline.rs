/// Upload ingestion pipeline
///
/// Validate, summarize, retain the raw bytes, then append to history.
/// Every check runs before the first mutation, so a rejected upload
/// leaves both the history and the blob store untouched.
///
/// `stage` stops short of deleting anything. The caller persists the
/// history and then either `commit`s (evicted uploads are released) or
/// `abandon`s (the new entry and its upload are dropped, evicted entries
/// stay on disk and in the saved history).
use crate::error::{Error, Result};
use crate::history::HistoryStore;
use crate::summary::summarize;
use crate::types::{EquipmentRow, OwnerId, Summary, SummaryId};
use crate::validate::validate;
use chrono::Utc;
use log::{debug, warn};
use std::path::Path;
use std::sync::Arc;

/// Everything the upload collaborator needs to answer the request
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub summary: Arc<Summary>,
    /// Parsed rows, for callers that echo the data back; never stored
    pub rows: Vec<EquipmentRow>,
    /// Older summaries dropped to make room
    pub evicted: Vec<Arc<Summary>>,
}

impl UploadOutcome {
    /// Release the uploads of evicted summaries once the new history is saved
    pub fn commit(&self, store: &HistoryStore) {
        store.release(&self.evicted);
    }

    /// Undo a staged upload whose history could not be saved
    ///
    /// The new summary leaves the in-memory history and its upload is
    /// released. Evicted summaries are not restored in memory, but their
    /// uploads are kept because the saved history still lists them.
    pub fn abandon(&self, store: &HistoryStore) {
        match store.remove(&self.summary.owner, &self.summary.id) {
            Ok(removed) => store.release(&[removed]),
            Err(e) => warn!("staged upload {} already gone: {}", self.summary.id, e),
        }
    }
}

/// Accept only filenames with a `.csv` extension (any case)
pub fn check_filename(filename: &str) -> Result<()> {
    let is_csv = Path::new(filename).extension().map(|ext| ext.eq_ignore_ascii_case("csv")).unwrap_or(false);
    if is_csv { Ok(()) } else { Err(Error::UnsupportedFile(filename.to_string())) }
}

/// Validate and append one upload for `owner`, keeping evicted uploads
///
/// # Arguments
/// * `store` - History to append to; its blob store receives the raw bytes
/// * `owner` - Authenticated owner of the upload
/// * `filename` - Original filename as supplied by the client
/// * `raw` - Uploaded file content
pub fn stage(store: &HistoryStore, owner: &OwnerId, filename: &str, raw: &[u8]) -> Result<UploadOutcome> {
    check_filename(filename)?;

    let rows = validate(raw)?;
    let fields = summarize(&rows);
    debug!("{}: {} rows, {} equipment types", filename, fields.total_count, fields.type_distribution.len());

    let id = SummaryId::new();
    let token = store.blobs().put(owner, &id, raw)?;

    let summary = Summary::new(id, owner.clone(), filename, Utc::now(), fields, Some(token));
    let appended = store.append(owner, summary);

    Ok(UploadOutcome { summary: appended.summary, rows, evicted: appended.evicted })
}

/// Ingest one upload for `owner` into a store that is not persisted
pub fn ingest(store: &HistoryStore, owner: &OwnerId, filename: &str, raw: &[u8]) -> Result<UploadOutcome> {
    let outcome = stage(store, owner, filename, raw)?;
    outcome.commit(store);
    Ok(outcome)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
