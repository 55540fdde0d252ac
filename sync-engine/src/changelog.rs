use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::error::Result;
use crate::storage::TableStore;

/// Column order of the change log table.
pub const CHANGE_LOG_HEADER: [&str; 6] = [
    "timestamp",
    "table",
    "data_key",
    "column_name",
    "old_value",
    "new_value",
];

/// One cell overwritten during a merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub timestamp: DateTime<Utc>,
    pub table: String,
    pub data_key: String,
    pub column_name: String,
    pub old_value: CellValue,
    pub new_value: CellValue,
}

impl ChangeLogEntry {
    pub fn new(
        table: &str,
        data_key: &str,
        column_name: &str,
        old_value: CellValue,
        new_value: CellValue,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            table: table.to_string(),
            data_key: data_key.to_string(),
            column_name: column_name.to_string(),
            old_value,
            new_value,
        }
    }

    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::text(self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
            CellValue::text(self.table.as_str()),
            CellValue::text(self.data_key.as_str()),
            CellValue::text(self.column_name.as_str()),
            self.old_value.clone(),
            self.new_value.clone(),
        ]
    }
}

/// Append-only ledger for one merge pass, written out in a single batch.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    entries: Vec<ChangeLogEntry>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: ChangeLogEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = ChangeLogEntry>) {
        self.entries.extend(entries);
    }

    pub fn entries(&self) -> &[ChangeLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_rows(&self) -> Vec<Vec<CellValue>> {
        self.entries.iter().map(ChangeLogEntry::to_row).collect()
    }

    /// Appends every entry to `table` in one write. Returns the number of rows
    /// written; an empty log writes nothing.
    pub fn flush<S: TableStore + ?Sized>(&self, store: &mut S, table: &str) -> Result<usize> {
        if self.entries.is_empty() {
            return Ok(0);
        }
        store.append_log_rows(table, &self.to_rows())?;
        Ok(self.entries.len())
    }
}
