/// Tests for the ingestion pipeline
#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::history::HistoryStore;
    use crate::pipeline::{check_filename, ingest, stage};
    use crate::storage::MemoryStore;
    use crate::types::*;
    use std::sync::Arc;

    const SAMPLE: &str = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
                          P-101,Pump,10,5,20\n\
                          P-102,Pump,20,15,30\n\
                          V-201,Valve,0,1,25\n";

    fn setup() -> (Arc<MemoryStore>, HistoryStore) {
        let blobs = Arc::new(MemoryStore::new());
        let store = HistoryStore::new(blobs.clone());
        (blobs, store)
    }

    #[test]
    fn test_end_to_end_summary() {
        let (blobs, store) = setup();
        let owner = OwnerId::new("alice");

        let outcome = ingest(&store, &owner, "plant.csv", SAMPLE.as_bytes()).expect("upload succeeds");
        let summary = &outcome.summary;

        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.avg_flowrate, 10.0);
        assert_eq!(summary.avg_pressure, 7.0);
        assert_eq!(summary.avg_temperature, 25.0);
        let dist: Vec<(&str, u64)> = summary.type_distribution.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(dist, vec![("Pump", 2), ("Valve", 1)]);
        assert!(summary.is_consistent());

        assert_eq!(summary.owner, owner);
        assert_eq!(summary.filename, "plant.csv");
        assert_eq!(outcome.rows.len(), 3);
        assert!(outcome.evicted.is_empty());

        // Raw bytes are retained under the summary's token
        let token = summary.storage.as_ref().expect("token recorded");
        assert_eq!(blobs.get(token).as_deref(), Some(SAMPLE.as_bytes()));

        // And the summary is in history
        assert_eq!(store.get(&owner, &summary.id).unwrap().id, summary.id);
    }

    #[test]
    fn test_failed_upload_leaves_state_untouched() {
        let (blobs, store) = setup();
        let owner = OwnerId::new("alice");
        ingest(&store, &owner, "ok.csv", SAMPLE.as_bytes()).unwrap();

        let bad = "Equipment Name,Type,Flowrate,Pressure,Temperature\nP-1,Pump,abc,1,1\n";
        let err = ingest(&store, &owner, "bad.csv", bad.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let missing = "Equipment Name,Type,Flowrate,Temperature\nP-1,Pump,1,1\n";
        let err = ingest(&store, &owner, "missing.csv", missing.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);

        assert_eq!(store.list(&owner).len(), 1);
        assert_eq!(blobs.len(), 1);
    }

    #[test]
    fn test_non_csv_filename_is_rejected_before_parsing() {
        let (blobs, store) = setup();
        let err = ingest(&store, &OwnerId::new("alice"), "plant.xlsx", SAMPLE.as_bytes()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(blobs.is_empty());
    }

    #[test]
    fn test_check_filename() {
        assert!(check_filename("a.csv").is_ok());
        assert!(check_filename("A.CSV").is_ok());
        assert!(check_filename("dir/data.v2.csv").is_ok());
        assert!(check_filename("csv").is_err());
        assert!(check_filename("data.csv.txt").is_err());
    }

    #[test]
    fn test_header_only_upload_is_recorded() {
        let (_blobs, store) = setup();
        let owner = OwnerId::new("alice");
        let outcome = ingest(&store, &owner, "empty.csv", b"Equipment Name,Type,Flowrate,Pressure,Temperature\n").unwrap();

        assert_eq!(outcome.summary.total_count, 0);
        assert_eq!(outcome.summary.avg_flowrate, 0.0);
        assert!(outcome.summary.type_distribution.is_empty());
        assert_eq!(store.list(&owner).len(), 1);
    }

    #[test]
    fn test_sixth_upload_evicts_first() {
        let (blobs, store) = setup();
        let owner = OwnerId::new("alice");
        let first = ingest(&store, &owner, "u0.csv", SAMPLE.as_bytes()).unwrap().summary;
        for i in 1..HISTORY_LIMIT {
            ingest(&store, &owner, &format!("u{}.csv", i), SAMPLE.as_bytes()).unwrap();
        }

        let outcome = ingest(&store, &owner, "latest.csv", SAMPLE.as_bytes()).unwrap();
        assert_eq!(outcome.evicted.len(), 1);
        assert_eq!(outcome.evicted[0].id, first.id);
        assert_eq!(store.list(&owner).len(), HISTORY_LIMIT);
        assert_eq!(blobs.len(), HISTORY_LIMIT);
    }

    #[test]
    fn test_staged_eviction_keeps_blob_until_commit() {
        let (blobs, store) = setup();
        let owner = OwnerId::new("alice");
        let first = ingest(&store, &owner, "u0.csv", SAMPLE.as_bytes()).unwrap().summary;
        for i in 1..HISTORY_LIMIT {
            ingest(&store, &owner, &format!("u{}.csv", i), SAMPLE.as_bytes()).unwrap();
        }

        let outcome = stage(&store, &owner, "latest.csv", SAMPLE.as_bytes()).unwrap();
        assert_eq!(outcome.evicted[0].id, first.id);
        assert!(blobs.contains(first.storage.as_ref().unwrap()));
        assert_eq!(blobs.len(), HISTORY_LIMIT + 1);

        outcome.commit(&store);
        assert!(!blobs.contains(first.storage.as_ref().unwrap()));
        assert_eq!(blobs.len(), HISTORY_LIMIT);
    }

    #[test]
    fn test_abandoned_upload_releases_only_its_own_blob() {
        let (blobs, store) = setup();
        let owner = OwnerId::new("alice");
        let first = ingest(&store, &owner, "u0.csv", SAMPLE.as_bytes()).unwrap().summary;
        for i in 1..HISTORY_LIMIT {
            ingest(&store, &owner, &format!("u{}.csv", i), SAMPLE.as_bytes()).unwrap();
        }

        let outcome = stage(&store, &owner, "latest.csv", SAMPLE.as_bytes()).unwrap();
        outcome.abandon(&store);

        assert!(store.get(&owner, &outcome.summary.id).is_err());
        assert!(!blobs.contains(outcome.summary.storage.as_ref().unwrap()));
        // The evicted upload is still on hand for the history that was last saved
        assert!(blobs.contains(first.storage.as_ref().unwrap()));
        assert_eq!(blobs.len(), HISTORY_LIMIT);

        // A second abandon only logs
        outcome.abandon(&store);
    }
}
