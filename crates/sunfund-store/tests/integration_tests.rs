//! Integration tests for sunfund-store
//!
//! These tests run the store against an on-disk database.

use sunfund_domain::{ExtractedRecord, RecordStore, StoreOutcome};
use sunfund_store::{SqliteStore, Table};
use tempfile::TempDir;

fn record(title: &str) -> ExtractedRecord {
    serde_json::from_value(serde_json::json!({
        "newsUrl": "https://example.com/a",
        "title": title,
        "newsUpdateType": "Funding Update",
        "receiverCategory": "Project",
        "textOfArticle": "A 5 MW solar plant in Zambia reached financial close.",
        "receiverCountry": ["Zambia"],
        "date": "15/06/2023",
        "projectFinanced": {"id": "p-1", "name": "Ngonye Solar"},
        "projectStatus": "Construction",
        "projectStatusDate": "15/06/2023",
        "technologyAndGridSystem": "PV",
        "typeOfInstallation": "Utility",
        "gridType": "On-grid",
        "pvSize": 5,
        "organizationFinanced": null,
        "totalAmount": 4500000,
        "subUpdates": []
    }))
    .unwrap()
}

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sunfund.db");

    {
        let mut store = SqliteStore::new(&path).unwrap();
        let outcome = store.store(&record("Ngonye Solar reaches close")).unwrap();
        assert!(matches!(outcome, StoreOutcome::Inserted { .. }));
    }

    let store = SqliteStore::new(&path).unwrap();
    assert!(store.exists("Ngonye Solar reaches close").unwrap());
    assert!(!store.exists("Some other title").unwrap());
    assert_eq!(store.row_count(Table::Project).unwrap(), 1);
}

#[test]
fn test_duplicate_title_performs_zero_inserts() {
    let dir = TempDir::new().unwrap();
    let mut store = SqliteStore::new(dir.path().join("sunfund.db")).unwrap();

    store.store(&record("Ngonye Solar reaches close")).unwrap();
    let counts_before: Vec<i64> = [Table::Updates, Table::Project, Table::Organization, Table::SubUpdates]
        .iter()
        .map(|t| store.row_count(*t).unwrap())
        .collect();

    let outcome = store.store(&record("Ngonye Solar reaches close")).unwrap();
    assert_eq!(
        outcome,
        StoreOutcome::AlreadyExists { title: "Ngonye Solar reaches close".to_string() }
    );

    let counts_after: Vec<i64> = [Table::Updates, Table::Project, Table::Organization, Table::SubUpdates]
        .iter()
        .map(|t| store.row_count(*t).unwrap())
        .collect();
    assert_eq!(counts_before, counts_after);
}

#[test]
fn test_update_ids_are_distinct() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let first = store.insert(&record("First")).unwrap();
    let second = store.insert(&record("Second")).unwrap();
    assert_ne!(first, second);
    assert_eq!(store.update_id("Second").unwrap(), Some(second));
}
