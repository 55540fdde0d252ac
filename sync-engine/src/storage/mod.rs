#[cfg(feature = "sqlite")]
mod sqlite;
mod memory;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
pub use memory::MemoryStore;

use crate::cell::CellValue;
use crate::changelog::CHANGE_LOG_HEADER;
use crate::error::{Error, Result};
use crate::grid::Grid;

/// Bulk table I/O for one store (the local workbook or the shared hub).
///
/// Each merge reads whole grids and writes them back in at most one
/// `set_table` and one `append_rows` call per grid.
pub trait TableStore {
    /// Reads a whole table. Missing tables are `Error::TableNotFound`.
    fn get_table(&self, name: &str) -> Result<Grid>;

    /// Overwrites the range covered by `grid`, creating the table if needed.
    /// Cells outside that range are left alone.
    fn set_table(&mut self, name: &str, grid: &Grid) -> Result<()>;

    /// Appends rows after the last populated row of an existing table.
    fn append_rows(&mut self, name: &str, rows: &[Vec<CellValue>]) -> Result<()>;

    fn table_names(&self) -> Result<Vec<String>>;

    fn has_table(&self, name: &str) -> Result<bool> {
        Ok(self.table_names()?.iter().any(|t| t == name))
    }

    fn get_config_grid(&self, params_table: &str) -> Result<Grid> {
        self.get_table(params_table)
    }

    /// Appends change log rows, creating the log table with its header first
    /// if it does not exist yet.
    fn append_log_rows(&mut self, log_table: &str, rows: &[Vec<CellValue>]) -> Result<()> {
        if !self.has_table(log_table)? {
            let header = Grid::from_header(&CHANGE_LOG_HEADER, Vec::<Vec<CellValue>>::new());
            self.set_table(log_table, &header)?;
        }
        self.append_rows(log_table, rows)
    }
}

impl<T: TableStore + ?Sized> TableStore for Box<T> {
    fn get_table(&self, name: &str) -> Result<Grid> {
        (**self).get_table(name)
    }

    fn set_table(&mut self, name: &str, grid: &Grid) -> Result<()> {
        (**self).set_table(name, grid)
    }

    fn append_rows(&mut self, name: &str, rows: &[Vec<CellValue>]) -> Result<()> {
        (**self).append_rows(name, rows)
    }

    fn table_names(&self) -> Result<Vec<String>> {
        (**self).table_names()
    }
}

pub(crate) fn not_found(name: &str) -> Error {
    Error::TableNotFound { name: name.to_string() }
}
