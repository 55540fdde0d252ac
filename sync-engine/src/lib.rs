//! Hub-and-spoke table reconciliation with per-column ownership.
//!
//! A local table and a remote "hub" table describe the same rows, matched by
//! a numeric primary key. Every configured column is owned by exactly one
//! side: a pull copies hub-owned columns into the local table, a push copies
//! locally owned columns into the hub. Rows are never deleted; rows missing a
//! key get one allocated, and every overwritten cell lands in a change log.
//!
//! # Example
//! ```rust
//! use hubsync_engine::{CellValue, Grid, MemoryStore, RecordingObserver, SyncSession};
//!
//! let params = Grid::from_header(
//!     &["sheet", "remote", "primary_key", "local_columns", "foreign_columns", "can_add_keys"],
//!     vec![vec![
//!         CellValue::from("items"),
//!         "hub_items".into(),
//!         "id".into(),
//!         "note".into(),
//!         "qty".into(),
//!         false.into(),
//!     ]],
//! );
//! let mut local = MemoryStore::new()
//!     .with_table("params", params)
//!     .with_table("items", Grid::from_header(&["id", "note", "qty"], vec![vec![CellValue::from(1i64), "".into(), 5i64.into()]]));
//! let mut hub = MemoryStore::new()
//!     .with_table("hub_items", Grid::from_header(&["id", "note", "qty"], vec![vec![CellValue::from(1i64), "".into(), 9i64.into()]]));
//!
//! let summary = SyncSession::default()
//!     .pull(&mut local, &mut hub, &mut RecordingObserver::default())
//!     .unwrap();
//!
//! assert_eq!(summary.changes, 1);
//! assert_eq!(local.table("items").unwrap().cell(1, 2), &CellValue::Number(9.0));
//! ```

mod cell;
mod changelog;
mod config;
mod error;
mod grid;
mod index;
mod merge;
mod storage;
mod sync;
mod writeback;

pub use cell::CellValue;
pub use changelog::{ChangeLog, ChangeLogEntry, CHANGE_LOG_HEADER};
pub use config::{resolve_descriptors, Side, TableConfig, TableDescriptor, PARAMS_HEADER};
pub use error::{Error, Result};
pub use grid::Grid;
pub use index::{
    build_index, parse_key, resolve_columns, AllocatedKey, ColumnMap, IndexOutcome, Record,
    RecordIndex,
};
pub use merge::{cells_equal, normalize_for_write, reconcile, MergeOutcome, MergeReport, SyncDirection};
#[cfg(feature = "sqlite")]
pub use storage::SqliteStore;
pub use storage::{MemoryStore, TableStore};
pub use sync::{
    MergeObserver, PassSummary, RecordingObserver, SessionOptions, SyncSession, TableResult,
    TableWarning, TracingObserver, DEFAULT_LOG_TABLE, DEFAULT_PARAMS_TABLE,
};
pub use writeback::{append_columns, append_records, may_append, project_record, write_allocated_keys};
