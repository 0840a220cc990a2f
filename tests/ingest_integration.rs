/// Library-level integration tests: ingest into an on-disk store, persist,
/// reload, and render.
use equipment_summary::report::{self, ReportFormat};
use equipment_summary::state::StateFile;
use equipment_summary::{BlobStore, DirStore, ErrorKind, HISTORY_LIMIT, HistoryStore, OwnerId, ingest, stage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data").join(name);
    fs::read(&path).unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

fn dir_store(root: &Path) -> (PathBuf, Arc<dyn BlobStore>) {
    let uploads = root.join("uploads");
    (uploads.clone(), Arc::new(DirStore::new(uploads)))
}

#[test]
fn test_mixed_plant_summary() {
    let dir = tempfile::tempdir().unwrap();
    let (uploads, blobs) = dir_store(dir.path());
    let store = HistoryStore::new(blobs);
    let owner = OwnerId::new("alice");

    let outcome = ingest(&store, &owner, "plant_mixed.csv", &fixture("plant_mixed.csv")).unwrap();
    let summary = &outcome.summary;

    assert_eq!(summary.total_count, 6);
    assert!(summary.is_consistent());
    let types: Vec<(&str, u64)> = summary.type_distribution.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    assert_eq!(types, vec![("Reactor", 2), ("Heat Exchanger", 2), ("Pump", 1), ("Compressor", 1)]);
    assert!((summary.avg_flowrate - 744.25 / 6.0).abs() < 1e-9);

    // The raw upload is retained byte for byte
    let token = summary.storage.as_ref().unwrap();
    assert_eq!(fs::read(uploads.join(token.as_str())).unwrap(), fixture("plant_mixed.csv"));

    let doc = report::render(summary);
    let stats: Vec<String> = doc.statistics.lines.iter().map(|l| l.format()).collect();
    assert_eq!(stats[1], "Total Equipment Count: 6");
    assert_eq!(stats[2], "Average Flowrate: 124.04");
    assert_eq!(stats[3], "Average Pressure: 9.09");
    assert_eq!(stats[4], "Average Temperature: 120.83");
    assert_eq!(doc.distribution.rows[1], ["Heat Exchanger".to_string(), "2".to_string()]);
}

#[test]
fn test_history_survives_reload_and_evicts_files() {
    let dir = tempfile::tempdir().unwrap();
    let (uploads, blobs) = dir_store(dir.path());
    let owner = OwnerId::new("alice");
    let mut ids = Vec::new();

    // One process per upload, as the CLI does it
    for _ in 0..(HISTORY_LIMIT + 2) {
        let state = StateFile::lock(dir.path()).unwrap();
        let store = state.load(blobs.clone()).unwrap();
        let outcome = stage(&store, &owner, "sample_equipment.csv", &fixture("sample_equipment.csv")).unwrap();
        ids.push(outcome.summary.id);
        state.save(&store).unwrap();
        outcome.commit(&store);
    }

    let state = StateFile::lock(dir.path()).unwrap();
    let store = state.load(blobs).unwrap();
    let listed: Vec<_> = store.list(&owner).iter().map(|s| s.id).collect();
    let expected: Vec<_> = ids.iter().rev().take(HISTORY_LIMIT).copied().collect();
    assert_eq!(listed, expected);

    for evicted in &ids[..2] {
        assert_eq!(store.get(&owner, evicted).unwrap_err().kind(), ErrorKind::NotFound);
    }
    assert_eq!(fs::read_dir(uploads.join("alice")).unwrap().count(), HISTORY_LIMIT);
}

#[test]
fn test_rejected_upload_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (uploads, blobs) = dir_store(dir.path());
    let store = HistoryStore::new(blobs);
    let owner = OwnerId::new("alice");

    let err = ingest(&store, &owner, "bad.csv", &fixture("bad_flowrate.csv")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    let err = ingest(&store, &owner, "missing.csv", &fixture("missing_pressure.csv")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);

    assert!(store.list(&owner).is_empty());
    assert!(!uploads.exists());
}

#[test]
fn test_export_report_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (_, blobs) = dir_store(dir.path());
    let store = HistoryStore::new(blobs);
    let owner = OwnerId::new("alice");
    let summary = ingest(&store, &owner, "sample_equipment.csv", &fixture("sample_equipment.csv")).unwrap().summary;

    let path = dir.path().join(report::report_filename(&summary, ReportFormat::Pdf));
    let written = report::export_report(&summary, ReportFormat::Pdf, &path).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), written);
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_failed_save_keeps_saved_history_and_files_in_step() {
    let dir = tempfile::tempdir().unwrap();
    let (uploads, blobs) = dir_store(dir.path());
    let owner = OwnerId::new("alice");

    {
        let state = StateFile::lock(dir.path()).unwrap();
        let store = state.load(blobs.clone()).unwrap();
        for i in 0..HISTORY_LIMIT {
            ingest(&store, &owner, &format!("f{}.csv", i), &fixture("sample_equipment.csv")).unwrap();
        }
        state.save(&store).unwrap();
    }

    // A directory where the temporary state file goes makes the save fail
    let state = StateFile::lock(dir.path()).unwrap();
    fs::create_dir(dir.path().join("history.json.tmp")).unwrap();
    let store = state.load(blobs.clone()).unwrap();
    let outcome = stage(&store, &owner, "f5.csv", &fixture("sample_equipment.csv")).unwrap();
    assert_eq!(outcome.evicted.len(), 1);

    let err = state.save(&store).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    outcome.abandon(&store);
    drop(state);

    let state = StateFile::lock(dir.path()).unwrap();
    let store = state.load(blobs).unwrap();
    let listed = store.list(&owner);
    assert_eq!(listed.len(), HISTORY_LIMIT);
    assert!(listed.iter().all(|s| s.filename != "f5.csv"));
    for summary in &listed {
        let token = summary.storage.as_ref().unwrap();
        assert!(uploads.join(token.as_str()).is_file(), "{} lost its upload", summary.filename);
    }
    assert_eq!(fs::read_dir(uploads.join("alice")).unwrap().count(), HISTORY_LIMIT);
}
