//! Builds a primary-key index over a grid and allocates keys to rows without one.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::cell::CellValue;
use crate::config::TableDescriptor;
use crate::grid::Grid;

/// Configured column names resolved to header positions, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    columns: Vec<(String, usize)>,
}

impl ColumnMap {
    pub fn get(&self, name: &str) -> Option<usize> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, i)| *i)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.columns.iter().map(|(n, i)| (n.as_str(), *i))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn insert(&mut self, name: &str, idx: usize) {
        if !self.contains(name) {
            self.columns.push((name.to_string(), idx));
        }
    }
}

/// Looks up each name in the grid header. Blank names are skipped; names missing
/// from the header are returned as drift.
pub fn resolve_columns<'a>(
    grid: &Grid,
    names: impl IntoIterator<Item = &'a str>,
) -> (ColumnMap, Vec<String>) {
    let mut map = ColumnMap::default();
    let mut drift = Vec::new();

    for name in names {
        if name.trim().is_empty() || map.contains(name) || drift.iter().any(|d| d == name) {
            continue;
        }
        match grid.column_index(name) {
            Some(idx) => map.insert(name, idx),
            None => drift.push(name.to_string()),
        }
    }

    (map, drift)
}

/// One grid row reduced to the configured columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Grid row the record was read from; the first data row is 1.
    pub row_index: usize,
    cells: HashMap<String, CellValue>,
}

impl Record {
    pub fn new(row_index: usize) -> Self {
        Self { row_index, cells: HashMap::new() }
    }

    pub fn with(mut self, column: &str, value: impl Into<CellValue>) -> Self {
        self.set(column, value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    pub fn set(&mut self, column: &str, value: CellValue) {
        self.cells.insert(column.to_string(), value);
    }

    pub fn key(&self, primary_key: &str) -> Option<String> {
        self.get(primary_key).and_then(CellValue::as_key)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }
}

/// Records keyed by the string form of their primary key.
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    records: HashMap<String, Record>,
}

impl RecordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Inserts unless the key is already taken; returns whether it was inserted.
    pub fn insert(&mut self, key: String, record: Record) -> bool {
        if self.records.contains_key(&key) {
            return false;
        }
        self.records.insert(key, record);
        true
    }

    /// Removes and returns a record, marking it as consumed.
    pub fn take(&mut self, key: &str) -> Option<Record> {
        self.records.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remaining records in the order they appear in their grid.
    pub fn into_ordered(self) -> Vec<(String, Record)> {
        let mut remaining: Vec<_> = self.records.into_iter().collect();
        remaining.sort_by_key(|(_, r)| r.row_index);
        remaining
    }
}

/// A key handed to a row that had none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatedKey {
    pub row_index: usize,
    pub key: i64,
}

/// Result of indexing one grid.
#[derive(Debug, Clone, Default)]
pub struct IndexOutcome {
    pub index: RecordIndex,
    /// Resolved positions of every indexed column, key column included.
    pub columns: ColumnMap,
    /// Keys handed out to keyless rows, in row order.
    pub allocated: Vec<AllocatedKey>,
    /// Configured columns missing from the header.
    pub drift: Vec<String>,
    /// Keys seen more than once; only the first row is indexed.
    pub duplicates: Vec<String>,
    /// Rows left unindexed because the key column itself is missing.
    pub unkeyed_rows: usize,
    /// The key the next allocation for this table would take.
    pub next_key: i64,
}

impl IndexOutcome {
    pub fn key_column_resolved(&self, descriptor: &TableDescriptor) -> bool {
        self.columns.contains(&descriptor.primary_key)
    }
}

/// Numeric reading of a key for allocation. Anything unparseable is -1 so it
/// sorts first and never becomes the maximum.
pub fn parse_key(key: &str) -> i64 {
    let key = key.trim();
    if let Ok(n) = key.parse::<i64>() {
        return n;
    }
    match key.parse::<f64>() {
        Ok(f) if f.is_finite() && f.abs() < i64::MAX as f64 => f.trunc() as i64,
        _ => -1,
    }
}

/// Indexes `grid` by the descriptor's primary key.
///
/// Rows without a key are held back until every row has been read, then given
/// consecutive keys above the largest numeric key present, in row order.
pub fn build_index(grid: &Grid, descriptor: &TableDescriptor) -> IndexOutcome {
    let pk = descriptor.primary_key.as_str();
    let names = descriptor.indexed_columns().chain(std::iter::once(pk));
    let (columns, drift) = resolve_columns(grid, names);

    for column in &drift {
        debug!(column = %column, "configured column missing from table header");
    }

    let mut outcome = IndexOutcome { columns, drift, ..Default::default() };
    let key_resolved = outcome.columns.contains(pk);
    let mut keyless = Vec::new();

    for (row_index, row) in grid.data_rows() {
        let mut record = Record::new(row_index);
        for (name, idx) in outcome.columns.iter() {
            record.set(name, row.get(idx).cloned().unwrap_or_default());
        }

        if record.is_blank() {
            continue;
        }

        if !key_resolved {
            outcome.unkeyed_rows += 1;
            continue;
        }

        match record.key(pk) {
            None => keyless.push(record),
            Some(key) => {
                if outcome.index.contains(&key) {
                    warn!(key = %key, row = row_index, "duplicate primary key, keeping first row");
                    outcome.duplicates.push(key);
                } else {
                    outcome.index.insert(key, record);
                }
            }
        }
    }

    let mut existing: Vec<i64> = outcome.index.keys().map(parse_key).collect();
    existing.sort_unstable();
    let max = existing.last().copied().unwrap_or(-1);
    let mut next_key = max.max(-1) + 1;

    let taken: HashSet<String> = outcome.index.keys().map(str::to_string).collect();
    for mut record in keyless {
        while taken.contains(&next_key.to_string()) {
            next_key += 1;
        }
        let row_index = record.row_index;
        record.set(pk, CellValue::from(next_key));
        outcome.index.insert(next_key.to_string(), record);
        outcome.allocated.push(AllocatedKey { row_index, key: next_key });
        next_key += 1;
    }

    outcome.next_key = next_key;
    debug!(
        rows = outcome.index.len(),
        allocated = outcome.allocated.len(),
        next_key,
        "indexed grid"
    );
    outcome
}
