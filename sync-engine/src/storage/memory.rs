use std::collections::HashMap;

use super::{not_found, TableStore};
use crate::cell::CellValue;
use crate::error::Result;
use crate::grid::Grid;

/// In-process store, used by tests and by embedders that already hold grids.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Grid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, grid: Grid) -> Self {
        self.insert_table(name, grid);
        self
    }

    pub fn insert_table(&mut self, name: &str, grid: Grid) {
        self.tables.insert(name.to_string(), grid);
    }

    pub fn table(&self, name: &str) -> Option<&Grid> {
        self.tables.get(name)
    }
}

impl TableStore for MemoryStore {
    fn get_table(&self, name: &str) -> Result<Grid> {
        self.tables.get(name).cloned().ok_or_else(|| not_found(name))
    }

    fn set_table(&mut self, name: &str, grid: &Grid) -> Result<()> {
        match self.tables.get_mut(name) {
            Some(existing) => {
                for (r, row) in grid.rows().iter().enumerate() {
                    for (c, cell) in row.iter().enumerate() {
                        existing.set_cell(r, c, cell.clone());
                    }
                }
            }
            None => {
                self.tables.insert(name.to_string(), grid.clone());
            }
        }
        Ok(())
    }

    fn append_rows(&mut self, name: &str, rows: &[Vec<CellValue>]) -> Result<()> {
        let grid = self.tables.get_mut(name).ok_or_else(|| not_found(name))?;
        grid.append_rows(rows.iter().cloned());
        Ok(())
    }

    fn table_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<_> = self.tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_missing_table() {
        let store = MemoryStore::new();
        assert!(matches!(store.get_table("nope"), Err(Error::TableNotFound { .. })));
    }

    #[test]
    fn test_set_table_overwrites_range_only() {
        let mut store = MemoryStore::new().with_table(
            "t",
            Grid::new(vec![
                vec!["id".into(), "a".into(), "extra".into()],
                vec![1i64.into(), "old".into(), "keep".into()],
            ]),
        );

        let update = Grid::new(vec![
            vec!["id".into(), "a".into()],
            vec![1i64.into(), "new".into()],
        ]);
        store.set_table("t", &update).unwrap();

        let grid = store.table("t").unwrap();
        assert_eq!(grid.cell(1, 1), &CellValue::text("new"));
        assert_eq!(grid.cell(1, 2), &CellValue::text("keep"));
    }

    #[test]
    fn test_log_table_created_on_first_append() {
        let mut store = MemoryStore::new();
        store
            .append_log_rows("change_log", &[vec!["2024".into(), "t".into()]])
            .unwrap();

        let grid = store.table("change_log").unwrap();
        assert_eq!(grid.cell(0, 0), &CellValue::text("timestamp"));
        assert_eq!(grid.cell(1, 1), &CellValue::text("t"));
        assert_eq!(grid.row(1).unwrap().len(), 6);
    }
}
