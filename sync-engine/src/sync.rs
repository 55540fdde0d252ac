use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cell::CellValue;
use crate::changelog::ChangeLog;
use crate::config::{resolve_descriptors, TableDescriptor};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::index::{build_index, AllocatedKey};
use crate::merge::{reconcile, MergeReport, SyncDirection};
use crate::storage::TableStore;
use crate::writeback::{append_columns, append_records, may_append, write_allocated_keys};

pub const DEFAULT_PARAMS_TABLE: &str = "params";
pub const DEFAULT_LOG_TABLE: &str = "change_log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Local table holding the table descriptors.
    pub params_table: String,
    /// Local table receiving the change log.
    pub log_table: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            params_table: DEFAULT_PARAMS_TABLE.to_string(),
            log_table: DEFAULT_LOG_TABLE.to_string(),
        }
    }
}

/// Callbacks for conditions the embedding surface shows to a user.
pub trait MergeObserver {
    /// A configured column is missing from a table header. Called once per
    /// column per table merge.
    fn on_schema_drift(&mut self, table: &str, column: &str);

    fn on_rows_added(&mut self, _table: &str, _count: usize) {}

    fn on_table_skipped(&mut self, _table: &str, _error: &Error) {}
}

/// Observer that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MergeObserver for TracingObserver {
    fn on_schema_drift(&mut self, table: &str, column: &str) {
        warn!(table, column, "columns out of sync with data hub");
    }

    fn on_rows_added(&mut self, table: &str, count: usize) {
        info!(table, count, "new rows added to the bottom of the table");
    }

    fn on_table_skipped(&mut self, table: &str, error: &Error) {
        warn!(table, %error, "table skipped");
    }
}

/// Observer that keeps every callback, for tests and callers that report later.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub drift: Vec<(String, String)>,
    pub rows_added: Vec<(String, usize)>,
    pub skipped: Vec<String>,
}

impl MergeObserver for RecordingObserver {
    fn on_schema_drift(&mut self, table: &str, column: &str) {
        self.drift.push((table.to_string(), column.to_string()));
    }

    fn on_rows_added(&mut self, table: &str, count: usize) {
        self.rows_added.push((table.to_string(), count));
    }

    fn on_table_skipped(&mut self, table: &str, _error: &Error) {
        self.skipped.push(table.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableWarning {
    pub table: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableResult {
    pub table: String,
    pub report: MergeReport,
    pub keys_allocated: usize,
    pub rows_appended: usize,
    pub drift: Vec<String>,
    pub duplicates: Vec<String>,
    /// Allocated keys that a target row, absent from the source, already uses.
    pub key_collisions: Vec<String>,
}

/// Outcome of one pass over every configured table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    pub direction: SyncDirection,
    pub tables_merged: usize,
    pub rows_added: usize,
    pub keys_allocated: usize,
    pub drift_columns: usize,
    pub tables_skipped: usize,
    pub changes: usize,
    pub tables: Vec<TableResult>,
    pub warnings: Vec<TableWarning>,
}

impl PassSummary {
    fn new(direction: SyncDirection) -> Self {
        Self {
            direction,
            tables_merged: 0,
            rows_added: 0,
            keys_allocated: 0,
            drift_columns: 0,
            tables_skipped: 0,
            changes: 0,
            tables: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.drift_columns == 0
    }

    fn add_table(&mut self, result: TableResult) {
        for key in &result.key_collisions {
            self.warnings.push(TableWarning {
                table: result.table.clone(),
                message: format!("allocated key {} was already used by a row missing from the source", key),
            });
        }
        self.tables_merged += 1;
        self.rows_added += result.rows_appended;
        self.keys_allocated += result.keys_allocated;
        self.drift_columns += result.drift.len();
        self.tables.push(result);
    }

    fn add_warning(&mut self, table: &str, error: &Error) {
        self.warnings.push(TableWarning {
            table: table.to_string(),
            message: error.to_string(),
        });
    }
}

/// Drives merge passes between a local store and the hub.
pub struct SyncSession {
    pub options: SessionOptions,
}

impl SyncSession {
    pub fn new(options: SessionOptions) -> Self {
        Self { options }
    }

    /// Hub to local.
    pub fn pull(
        &self,
        local: &mut dyn TableStore,
        remote: &mut dyn TableStore,
        observer: &mut dyn MergeObserver,
    ) -> Result<PassSummary> {
        self.run_merge(SyncDirection::Pull, local, remote, observer)
    }

    /// Local to hub.
    pub fn push(
        &self,
        local: &mut dyn TableStore,
        remote: &mut dyn TableStore,
        observer: &mut dyn MergeObserver,
    ) -> Result<PassSummary> {
        self.run_merge(SyncDirection::Push, local, remote, observer)
    }

    /// Merges every table named in the params table, one after another.
    ///
    /// A table that cannot be read, or whose key column is missing, is skipped
    /// and reported in the summary; the rest of the pass continues. Only a
    /// missing params table fails the whole pass.
    pub fn run_merge(
        &self,
        direction: SyncDirection,
        local: &mut dyn TableStore,
        remote: &mut dyn TableStore,
        observer: &mut dyn MergeObserver,
    ) -> Result<PassSummary> {
        let params = local.get_config_grid(&self.options.params_table)?;
        let config = resolve_descriptors(&params);

        let mut summary = PassSummary::new(direction);
        let mut log = ChangeLog::new();

        for descriptor in config.iter() {
            match merge_table(direction, descriptor, local, remote, observer, &mut log) {
                Ok(result) => summary.add_table(result),
                Err(e) => {
                    observer.on_table_skipped(&descriptor.local_name, &e);
                    summary.add_warning(&descriptor.local_name, &e);
                    summary.tables_skipped += 1;
                }
            }
        }

        summary.changes = log.len();
        if let Err(e) = log.flush(local, &self.options.log_table) {
            warn!(%e, "failed to write change log");
            summary.add_warning(&self.options.log_table, &e);
        }

        info!(
            direction = %direction,
            tables = summary.tables_merged,
            rows_added = summary.rows_added,
            keys_allocated = summary.keys_allocated,
            drift_columns = summary.drift_columns,
            tables_skipped = summary.tables_skipped,
            changes = summary.changes,
            "merge pass complete"
        );
        Ok(summary)
    }
}

impl Default for SyncSession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

fn report_drift(
    observer: &mut dyn MergeObserver,
    table: &str,
    seen: &mut Vec<String>,
    columns: &[String],
) {
    for column in columns {
        if !seen.contains(column) {
            observer.on_schema_drift(table, column);
            seen.push(column.clone());
        }
    }
}

/// Allocated keys already present in the target's key column. The rows
/// holding them exist only in the target, so the new source row will be
/// matched onto them.
fn key_collisions(target: &Grid, pk: &str, allocated: &[AllocatedKey]) -> Vec<String> {
    let Some(idx) = target.column_index(pk) else {
        return Vec::new();
    };
    let existing: HashSet<String> = target
        .data_rows()
        .filter_map(|(_, row)| row.get(idx).and_then(CellValue::as_key))
        .collect();
    allocated
        .iter()
        .map(|a| a.key.to_string())
        .filter(|k| existing.contains(k))
        .collect()
}

/// Merges one table. Grids are read once and written back at most once each
/// (plus one append).
///
/// Allocated keys reach the source store before anything touches the target,
/// so a failed target write leaves rows keyed and the next pass matches them
/// instead of keying them again. Changes go into `log` as soon as the target
/// write that applied them succeeds.
fn merge_table<'a>(
    direction: SyncDirection,
    descriptor: &TableDescriptor,
    local: &'a mut dyn TableStore,
    remote: &'a mut dyn TableStore,
    observer: &mut dyn MergeObserver,
    log: &mut ChangeLog,
) -> Result<TableResult> {
    let table = descriptor.local_name.as_str();
    let pk = descriptor.primary_key.as_str();
    if descriptor.remote_name.is_empty() || pk.is_empty() {
        return Err(Error::InvalidConfig(format!(
            "table {} needs a remote table name and a primary key",
            table
        )));
    }

    let (source_store, target_store) = match direction {
        SyncDirection::Pull => (remote, local),
        SyncDirection::Push => (local, remote),
    };
    let source_name = descriptor.table_name(direction.source_side());
    let target_name = descriptor.table_name(direction.target_side());

    let mut source: Grid = source_store.get_table(source_name)?;
    let mut target: Grid = target_store.get_table(target_name)?;
    debug!(table, source = source_name, target = target_name, "merging table");

    let mut drift = Vec::new();
    let indexed = build_index(&source, descriptor);
    report_drift(observer, table, &mut drift, &indexed.drift);

    let Some(source_pk) = indexed.columns.get(pk) else {
        return Err(Error::InvalidConfig(format!(
            "primary key column {} missing from {}",
            pk, source_name
        )));
    };
    if target.column_index(pk).is_none() {
        report_drift(observer, table, &mut drift, &[pk.to_string()]);
        return Err(Error::InvalidConfig(format!(
            "primary key column {} missing from {}",
            pk, target_name
        )));
    }

    let collisions = key_collisions(&target, pk, &indexed.allocated);
    for key in &collisions {
        warn!(table, key = %key, target = target_name, "allocated key already used by a row missing from the source");
    }

    let keys_allocated = write_allocated_keys(&mut source, source_pk, &indexed.allocated);
    if keys_allocated > 0 {
        source_store.set_table(source_name, &source)?;
    }

    let source_columns = indexed.columns.clone();
    let duplicates = indexed.duplicates.clone();

    let outcome = reconcile(indexed.index, &source_columns, &mut target, descriptor, direction);
    report_drift(observer, table, &mut drift, &outcome.drift);

    if outcome.report.updated_cells > 0 {
        target_store.set_table(target_name, &target)?;
    }
    log.extend(outcome.changes);

    let mut rows_appended = 0;
    if !outcome.new_records.is_empty() {
        if may_append(direction, descriptor) {
            let columns = append_columns(descriptor, &source_columns, &target);
            let rows = append_records(&mut target, &outcome.new_records, &columns);
            target_store.append_rows(target_name, &rows)?;
            rows_appended = rows.len();
            observer.on_rows_added(target_name, rows_appended);
        } else {
            debug!(
                table,
                rows = outcome.new_records.len(),
                "no add rights on hub, new rows keep their keys locally"
            );
        }
    }

    Ok(TableResult {
        table: table.to_string(),
        report: outcome.report,
        keys_allocated,
        rows_appended,
        drift,
        duplicates,
        key_collisions: collisions,
    })
}
