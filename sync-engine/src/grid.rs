use serde::{Deserialize, Serialize};

use crate::cell::CellValue;

static EMPTY: CellValue = CellValue::Empty;

/// A rectangular table: row 0 is the header, every later row is data.
///
/// On construction every row, the header included, is padded to the widest
/// row so column lookups never go out of bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { rows }
    }

    /// Builds a grid from a header and data rows of anything convertible to cells.
    pub fn from_header<H, R, C>(header: &[H], data: Vec<R>) -> Self
    where
        H: AsRef<str>,
        R: IntoIterator<Item = C>,
        C: Into<CellValue>,
    {
        let mut rows = Vec::with_capacity(data.len() + 1);
        rows.push(header.iter().map(|h| CellValue::text(h.as_ref())).collect());
        for row in data {
            rows.push(row.into_iter().map(Into::into).collect());
        }
        Self::new(rows)
    }

    pub fn header(&self) -> &[CellValue] {
        self.rows.first().map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn header_names(&self) -> Vec<String> {
        self.header().iter().map(|c| c.to_string()).collect()
    }

    pub fn width(&self) -> usize {
        self.header().len()
    }

    /// Position of `name` in the header row.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header().iter().position(|c| c.to_string() == name)
    }

    /// Total rows including the header.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn data_len(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<CellValue>> {
        self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&[CellValue]> {
        self.rows.get(idx).map(|r| r.as_slice())
    }

    /// Data rows paired with their grid row index (first data row is 1).
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[CellValue])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, r)| (i, r.as_slice()))
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Writes a cell, growing the grid if the position lies outside it.
    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        if row >= self.rows.len() {
            let width = self.width();
            self.rows.resize_with(row + 1, || vec![CellValue::Empty; width]);
        }
        let cells = &mut self.rows[row];
        if col >= cells.len() {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }

    /// Index of the last row holding any non-blank cell; 0 when only the header remains.
    pub fn last_populated_row(&self) -> usize {
        self.rows
            .iter()
            .rposition(|r| r.iter().any(|c| !c.is_blank()))
            .unwrap_or(0)
    }

    /// Appends rows directly after the last populated row, dropping trailing blanks.
    pub fn append_rows(&mut self, rows: impl IntoIterator<Item = Vec<CellValue>>) {
        let keep = (self.last_populated_row() + 1).min(self.rows.len());
        self.rows.truncate(keep);
        for row in rows {
            self.push_row(row);
        }
    }

    /// Pushes one row at the very end, padded to the header width.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        let width = self.width();
        if row.len() < width {
            row.resize(width, CellValue::Empty);
        }
        self.rows.push(row);
    }
}
