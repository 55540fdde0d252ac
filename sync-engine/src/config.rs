//! Table descriptors resolved from the flat `params` grid.
//!
//! Each params row is `[local table, remote table, primary key, local column,
//! foreign column, can add keys]`. A table may span several consecutive rows:
//! the first row carries the scalar fields, every row may contribute one more
//! owned column to each side.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cell::CellValue;
use crate::grid::Grid;

const COL_TABLE: usize = 0;
const COL_REMOTE: usize = 1;
const COL_PRIMARY_KEY: usize = 2;
const COL_LOCAL: usize = 3;
const COL_FOREIGN: usize = 4;
const COL_CAN_ADD: usize = 5;

/// Header written when a params table is created from scratch. Columns are
/// read by position, so the names are informational.
pub const PARAMS_HEADER: [&str; 6] = [
    "sheet",
    "remote",
    "primary_key",
    "local_columns",
    "foreign_columns",
    "can_add_keys",
];

/// The store that owns a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Local,
    Foreign,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub local_name: String,
    pub remote_name: String,
    pub primary_key: String,
    pub local_columns: Vec<String>,
    pub foreign_columns: Vec<String>,
    pub can_add_keys: bool,
}

impl TableDescriptor {
    pub fn owned_columns(&self, side: Side) -> &[String] {
        match side {
            Side::Local => &self.local_columns,
            Side::Foreign => &self.foreign_columns,
        }
    }

    /// Every column the indexer reads: both owned lists, in order, without the key.
    pub fn indexed_columns(&self) -> impl Iterator<Item = &str> {
        self.local_columns
            .iter()
            .chain(self.foreign_columns.iter())
            .map(|s| s.as_str())
    }

    pub fn table_name(&self, side: Side) -> &str {
        match side {
            Side::Local => &self.local_name,
            Side::Foreign => &self.remote_name,
        }
    }

    fn push_column(list: &mut Vec<String>, primary_key: &str, cell: &CellValue) {
        if cell.is_blank() {
            return;
        }
        let name = cell.to_string();
        if name != primary_key && !list.contains(&name) {
            list.push(name);
        }
    }
}

/// Descriptors in the order their tables first appear in the params grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    tables: Vec<TableDescriptor>,
}

impl TableConfig {
    pub fn get(&self, local_name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.local_name == local_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<TableDescriptor> for TableConfig {
    fn from_iter<I: IntoIterator<Item = TableDescriptor>>(iter: I) -> Self {
        Self { tables: iter.into_iter().collect() }
    }
}

fn parse_flag(cell: &CellValue) -> bool {
    match cell {
        CellValue::Bool(b) => *b,
        CellValue::Number(n) => *n != 0.0,
        CellValue::Text(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        ),
        CellValue::Empty => false,
    }
}

/// Folds the params grid (header row first) into one descriptor per local table.
///
/// Malformed rows produce sparse descriptors rather than errors.
pub fn resolve_descriptors(params: &Grid) -> TableConfig {
    let mut tables: Vec<TableDescriptor> = Vec::new();

    for (idx, _) in params.data_rows() {
        let cell = |i: usize| params.cell(idx, i);

        let Some(name) = cell(COL_TABLE).as_key() else {
            continue;
        };

        match tables.iter_mut().find(|t| t.local_name == name) {
            Some(table) => {
                let pk = table.primary_key.clone();
                TableDescriptor::push_column(&mut table.local_columns, &pk, cell(COL_LOCAL));
                TableDescriptor::push_column(&mut table.foreign_columns, &pk, cell(COL_FOREIGN));
            }
            None => {
                let mut table = TableDescriptor {
                    local_name: name,
                    remote_name: cell(COL_REMOTE).to_string().trim().to_string(),
                    primary_key: cell(COL_PRIMARY_KEY).to_string().trim().to_string(),
                    can_add_keys: parse_flag(cell(COL_CAN_ADD)),
                    ..Default::default()
                };
                let pk = table.primary_key.clone();
                TableDescriptor::push_column(&mut table.local_columns, &pk, cell(COL_LOCAL));
                TableDescriptor::push_column(&mut table.foreign_columns, &pk, cell(COL_FOREIGN));
                tables.push(table);
            }
        }
    }

    debug!(tables = tables.len(), "resolved table descriptors");
    TableConfig { tables }
}
