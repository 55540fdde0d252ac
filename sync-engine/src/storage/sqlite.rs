use rusqlite::{params, Connection, OptionalExtension};

use super::{not_found, TableStore};
use crate::cell::CellValue;
use crate::error::Result;
use crate::grid::Grid;

const INIT_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS hub_sheets (
    sheet TEXT NOT NULL PRIMARY KEY
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS hub_cells (
    sheet TEXT NOT NULL,
    row_idx INTEGER NOT NULL,
    col_idx INTEGER NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (sheet, row_idx, col_idx)
) WITHOUT ROWID;

PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
"#;

/// Grids persisted cell by cell in SQLite. Blank cells are not stored; values
/// are kept as JSON scalars so numbers and booleans survive a round trip.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch(INIT_SQL)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    fn sheet_exists(&self, name: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM hub_sheets WHERE sheet = ?1",
                params![name],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn write_cells(&mut self, name: &str, first_row: usize, rows: &[Vec<CellValue>]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("INSERT OR IGNORE INTO hub_sheets (sheet) VALUES (?1)", params![name])?;
        {
            let mut upsert = tx.prepare_cached(
                "INSERT OR REPLACE INTO hub_cells (sheet, row_idx, col_idx, value) VALUES (?1, ?2, ?3, ?4)",
            )?;
            let mut clear = tx.prepare_cached(
                "DELETE FROM hub_cells WHERE sheet = ?1 AND row_idx = ?2 AND col_idx = ?3",
            )?;

            for (offset, row) in rows.iter().enumerate() {
                let r = (first_row + offset) as i64;
                for (c, cell) in row.iter().enumerate() {
                    if cell.is_blank() {
                        clear.execute(params![name, r, c as i64])?;
                    } else {
                        let value = serde_json::to_string(cell)?;
                        upsert.execute(params![name, r, c as i64, value])?;
                    }
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl TableStore for SqliteStore {
    fn get_table(&self, name: &str) -> Result<Grid> {
        if !self.sheet_exists(name)? {
            return Err(not_found(name));
        }

        let mut stmt = self.conn.prepare(
            "SELECT row_idx, col_idx, value FROM hub_cells WHERE sheet = ?1 ORDER BY row_idx, col_idx",
        )?;
        let mut rows = stmt.query(params![name])?;

        let mut grid: Vec<Vec<CellValue>> = Vec::new();
        while let Some(row) = rows.next()? {
            let r: i64 = row.get(0)?;
            let c: i64 = row.get(1)?;
            let raw: String = row.get(2)?;
            let (r, c) = (r as usize, c as usize);

            if grid.len() <= r {
                grid.resize_with(r + 1, Vec::new);
            }
            let cells = &mut grid[r];
            if cells.len() <= c {
                cells.resize(c + 1, CellValue::Empty);
            }
            cells[c] = serde_json::from_str(&raw)?;
        }

        Ok(Grid::new(grid))
    }

    fn set_table(&mut self, name: &str, grid: &Grid) -> Result<()> {
        self.write_cells(name, 0, grid.rows())
    }

    fn append_rows(&mut self, name: &str, rows: &[Vec<CellValue>]) -> Result<()> {
        if !self.sheet_exists(name)? {
            return Err(not_found(name));
        }
        let last: Option<i64> = self.conn.query_row(
            "SELECT MAX(row_idx) FROM hub_cells WHERE sheet = ?1",
            params![name],
            |row| row.get(0),
        )?;
        let first_row = last.map(|r| r as usize + 1).unwrap_or(0).max(1);
        self.write_cells(name, first_row, rows)
    }

    fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT sheet FROM hub_sheets ORDER BY sheet")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        Grid::new(vec![
            vec!["id".into(), "name".into(), "active".into()],
            vec![1i64.into(), "A".into(), true.into()],
            vec![2i64.into(), CellValue::Empty, false.into()],
        ])
    }

    #[test]
    fn test_round_trip_preserves_types() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.set_table("items", &sample()).unwrap();

        let grid = store.get_table("items").unwrap();
        assert_eq!(grid, sample());
        assert_eq!(store.table_names().unwrap(), vec!["items"]);
    }

    #[test]
    fn test_append_after_last_row() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.set_table("items", &sample()).unwrap();
        store
            .append_rows("items", &[vec![3i64.into(), "C".into(), CellValue::Empty]])
            .unwrap();

        let grid = store.get_table("items").unwrap();
        assert_eq!(grid.data_len(), 3);
        assert_eq!(grid.cell(3, 1), &CellValue::text("C"));
    }

    #[test]
    fn test_missing_table() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get_table("nope").is_err());
        assert!(store.append_rows("nope", &[]).is_err());
    }
}
