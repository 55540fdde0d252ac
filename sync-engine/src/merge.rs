use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cell::CellValue;
use crate::changelog::ChangeLogEntry;
use crate::config::{Side, TableDescriptor};
use crate::error::Error;
use crate::grid::Grid;
use crate::index::{resolve_columns, ColumnMap, Record, RecordIndex};

/// Which store is the source of truth for a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncDirection {
    /// Hub to local: foreign-owned columns flow into the local table.
    Pull,
    /// Local to hub: local-owned columns flow into the remote table.
    Push,
}

impl SyncDirection {
    pub fn source_side(self) -> Side {
        match self {
            SyncDirection::Pull => Side::Foreign,
            SyncDirection::Push => Side::Local,
        }
    }

    pub fn target_side(self) -> Side {
        match self {
            SyncDirection::Pull => Side::Local,
            SyncDirection::Push => Side::Foreign,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncDirection::Pull => "pull",
            SyncDirection::Push => "push",
        }
    }
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pull" => Ok(SyncDirection::Pull),
            "push" => Ok(SyncDirection::Push),
            other => Err(Error::InvalidConfig(format!("unknown sync direction: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub matched: usize,
    pub updated_cells: usize,
    pub unmatched_target_rows: usize,
    pub new_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellDecision {
    Keep,
    Overwrite,
}

/// Comparison used to decide whether a target cell needs rewriting.
///
/// Blank cells are all equal to one another. Numbers compare with numeric text
/// and with booleans (1/0). A blank never equals zero or `false`.
pub fn cells_equal(a: &CellValue, b: &CellValue) -> bool {
    match (a.is_blank(), b.is_blank()) {
        (true, true) => return true,
        (true, false) | (false, true) => return false,
        (false, false) => {}
    }

    match (a, b) {
        (CellValue::Text(x), CellValue::Text(y)) => x == y,
        (CellValue::Bool(x), CellValue::Bool(y)) => x == y,
        (CellValue::Number(x), CellValue::Number(y)) => x == y,
        (CellValue::Bool(_), CellValue::Text(_)) | (CellValue::Text(_), CellValue::Bool(_)) => false,
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// Value written into a target cell. Absent values become an empty cell;
/// everything else, zero and `false` included, is written as is.
pub fn normalize_for_write(value: Option<&CellValue>) -> CellValue {
    match value {
        None => CellValue::Empty,
        Some(v) if v.is_blank() => CellValue::Empty,
        Some(v) => v.clone(),
    }
}

pub(crate) fn decide(target: &CellValue, source: Option<&CellValue>) -> CellDecision {
    let equal = match source {
        Some(source) => cells_equal(target, source),
        None => target.is_blank(),
    };
    if equal {
        CellDecision::Keep
    } else {
        CellDecision::Overwrite
    }
}

/// Result of merging one table in one direction.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Source records with no matching target row, in source row order.
    pub new_records: Vec<(String, Record)>,
    pub changes: Vec<ChangeLogEntry>,
    pub report: MergeReport,
    /// Owned columns resolved against the target header, key column included.
    pub write_columns: ColumnMap,
    /// Configured columns missing from the target header.
    pub drift: Vec<String>,
}

/// Copies the direction's owned columns from `source` into matching rows of `target`.
///
/// Rows are matched on the primary key. Target rows with no source record are
/// left untouched; source records with no target row are returned as new.
/// `source_columns` is the column map the source index was built with: owned
/// columns that did not resolve there are skipped instead of being blanked.
pub fn reconcile(
    mut source: RecordIndex,
    source_columns: &ColumnMap,
    target: &mut Grid,
    descriptor: &TableDescriptor,
    direction: SyncDirection,
) -> MergeOutcome {
    let pk = descriptor.primary_key.as_str();
    let target_table = descriptor.table_name(direction.target_side()).to_string();
    let owned = descriptor
        .owned_columns(direction.source_side())
        .iter()
        .map(|s| s.as_str())
        .filter(|c| source_columns.contains(c));

    let (write_columns, mut drift) = resolve_columns(target, owned.chain(std::iter::once(pk)));
    let mut outcome = MergeOutcome::default();

    let Some(pk_idx) = write_columns.get(pk) else {
        drift.retain(|c| c != pk);
        drift.push(pk.to_string());
        outcome.drift = drift;
        outcome.write_columns = write_columns;
        return outcome;
    };

    for row in 1..target.len() {
        let Some(key) = target.cell(row, pk_idx).as_key() else {
            outcome.report.unmatched_target_rows += 1;
            continue;
        };
        let Some(record) = source.take(&key) else {
            outcome.report.unmatched_target_rows += 1;
            continue;
        };
        outcome.report.matched += 1;

        for (column, idx) in write_columns.iter() {
            if idx == pk_idx {
                continue;
            }
            let current = target.cell(row, idx);
            let incoming = record.get(column);
            if decide(current, incoming) == CellDecision::Keep {
                continue;
            }

            let value = normalize_for_write(incoming);
            outcome.changes.push(ChangeLogEntry::new(
                &target_table,
                &key,
                column,
                current.clone(),
                value.clone(),
            ));
            target.set_cell(row, idx, value);
            outcome.report.updated_cells += 1;
        }
    }

    outcome.new_records = source.into_ordered();
    outcome.report.new_rows = outcome.new_records.len();
    outcome.write_columns = write_columns;
    outcome.drift = drift;

    debug!(
        table = %target_table,
        direction = %direction,
        matched = outcome.report.matched,
        updated = outcome.report.updated_cells,
        new_rows = outcome.report.new_rows,
        "reconciled table"
    );
    outcome
}
