#![cfg(feature = "sqlite")]

mod common;

use common::{items, items_params};
use hubsync_engine::{
    CellValue, RecordingObserver, SqliteStore, SyncSession, TableStore, CHANGE_LOG_HEADER,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn open_pair(dir: &TempDir) -> (SqliteStore, SqliteStore) {
    let local = SqliteStore::open(dir.path().join("local.db").to_str().unwrap()).unwrap();
    let hub = SqliteStore::open(dir.path().join("hub.db").to_str().unwrap()).unwrap();
    (local, hub)
}

#[test]
fn test_pull_between_sqlite_files() {
    let dir = TempDir::new().unwrap();
    {
        let (mut local, mut hub) = open_pair(&dir);
        local.set_table("params", &items_params(false)).unwrap();
        local
            .set_table("items", &items(&[(Some(1), "A", Some(5)), (Some(4), "D", Some(7))]))
            .unwrap();
        hub.set_table("hub_items", &items(&[(Some(1), "A", Some(9)), (None, "C", Some(0))]))
            .unwrap();
    }

    let (mut local, mut hub) = open_pair(&dir);
    let summary = SyncSession::default()
        .pull(&mut local, &mut hub, &mut RecordingObserver::default())
        .unwrap();
    assert_eq!(summary.changes, 1);
    assert_eq!(summary.keys_allocated, 1);
    assert_eq!(summary.rows_added, 1);
    drop((local, hub));

    // Everything was committed; reopen and check what landed on disk.
    let (local, hub) = open_pair(&dir);
    assert_eq!(
        local.get_table("items").unwrap(),
        items(&[
            (Some(1), "A", Some(9)),
            (Some(4), "D", Some(7)),
            (Some(2), "C", Some(0)),
        ])
    );
    assert_eq!(hub.get_table("hub_items").unwrap().cell(2, 0), &CellValue::Number(2.0));

    let log = local.get_table("change_log").unwrap();
    assert_eq!(log.header_names(), CHANGE_LOG_HEADER.to_vec());
    assert_eq!(log.data_len(), 1);
    assert_eq!(log.cell(1, 3), &CellValue::text("qty"));
}

#[test]
fn test_allocated_key_matching_local_only_row_is_reported() {
    let dir = TempDir::new().unwrap();
    let (mut local, mut hub) = open_pair(&dir);
    local.set_table("params", &items_params(false)).unwrap();
    local
        .set_table("items", &items(&[(Some(1), "A", Some(5)), (Some(2), "B", Some(7))]))
        .unwrap();
    hub.set_table("hub_items", &items(&[(Some(1), "A", Some(9)), (None, "C", Some(0))]))
        .unwrap();

    let summary = SyncSession::default()
        .pull(&mut local, &mut hub, &mut RecordingObserver::default())
        .unwrap();

    assert_eq!(hub.get_table("hub_items").unwrap().cell(2, 0), &CellValue::Number(2.0));
    assert_eq!(summary.tables[0].key_collisions, vec!["2"]);
    assert_eq!(summary.rows_added, 0);
    assert_eq!(
        local.get_table("items").unwrap(),
        items(&[(Some(1), "A", Some(9)), (Some(2), "B", Some(0))])
    );
}

#[test]
fn test_change_log_accumulates_across_passes() {
    let dir = TempDir::new().unwrap();
    let (mut local, mut hub) = open_pair(&dir);
    local.set_table("params", &items_params(true)).unwrap();
    local.set_table("items", &items(&[(Some(1), "A", Some(1))])).unwrap();
    hub.set_table("hub_items", &items(&[(Some(1), "A", Some(2))])).unwrap();

    let session = SyncSession::default();
    session
        .pull(&mut local, &mut hub, &mut RecordingObserver::default())
        .unwrap();

    local.set_table("items", &items(&[(Some(1), "Renamed", Some(2))])).unwrap();
    let summary = session
        .push(&mut local, &mut hub, &mut RecordingObserver::default())
        .unwrap();
    assert_eq!(summary.changes, 1);

    let log = local.get_table("change_log").unwrap();
    assert_eq!(log.data_len(), 2);
    assert_eq!(log.cell(1, 1), &CellValue::text("items"));
    assert_eq!(log.cell(2, 1), &CellValue::text("hub_items"));
    assert_eq!(log.cell(2, 5), &CellValue::text("Renamed"));
}

#[test]
fn test_missing_params_table_fails_pass() {
    let dir = TempDir::new().unwrap();
    let (mut local, mut hub) = open_pair(&dir);

    let err = SyncSession::default()
        .pull(&mut local, &mut hub, &mut RecordingObserver::default())
        .unwrap_err();
    assert!(err.to_string().contains("params"));
}
