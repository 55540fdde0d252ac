//! Persists the results of a merge into the grids: allocated keys go back to
//! the rows they were read from, new records are appended to the target.

use crate::cell::CellValue;
use crate::config::{Side, TableDescriptor};
use crate::grid::Grid;
use crate::index::{resolve_columns, AllocatedKey, ColumnMap, Record};
use crate::merge::{normalize_for_write, SyncDirection};

/// Writes each allocated key into the key column of its originating row.
pub fn write_allocated_keys(source: &mut Grid, key_column: usize, allocated: &[AllocatedKey]) -> usize {
    for a in allocated {
        source.set_cell(a.row_index, key_column, CellValue::from(a.key));
    }
    allocated.len()
}

/// Pull may always add rows to the local table; push only when the table
/// grants add rights.
pub fn may_append(direction: SyncDirection, descriptor: &TableDescriptor) -> bool {
    match direction {
        SyncDirection::Pull => true,
        SyncDirection::Push => descriptor.can_add_keys,
    }
}

/// Target columns filled in on appended rows: every configured column the
/// source index carries and the target header has, plus the key.
pub fn append_columns(descriptor: &TableDescriptor, source_columns: &ColumnMap, target: &Grid) -> ColumnMap {
    let names = descriptor
        .owned_columns(Side::Foreign)
        .iter()
        .chain(descriptor.owned_columns(Side::Local))
        .map(|s| s.as_str())
        .filter(|c| source_columns.contains(c))
        .chain(std::iter::once(descriptor.primary_key.as_str()));
    let (columns, _) = resolve_columns(target, names);
    columns
}

/// Lays a record out in the target's header order. Columns outside `columns`
/// are left empty.
pub fn project_record(record: &Record, width: usize, columns: &ColumnMap) -> Vec<CellValue> {
    let mut row = vec![CellValue::Empty; width];
    let mut ordered: Vec<(&str, usize)> = columns.iter().collect();
    ordered.sort_by_key(|(_, idx)| *idx);
    for (name, idx) in ordered {
        if idx < width {
            row[idx] = normalize_for_write(record.get(name));
        }
    }
    row
}

/// Appends `records` below the target's last populated row and returns the
/// projected rows, ready for the store's append call.
pub fn append_records(target: &mut Grid, records: &[(String, Record)], columns: &ColumnMap) -> Vec<Vec<CellValue>> {
    let width = target.width();
    let rows: Vec<Vec<CellValue>> = records
        .iter()
        .map(|(_, record)| project_record(record, width, columns))
        .collect();
    target.append_rows(rows.iter().cloned());
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_index;
    use pretty_assertions::assert_eq;

    fn descriptor(can_add_keys: bool) -> TableDescriptor {
        TableDescriptor {
            local_name: "items".into(),
            remote_name: "hub_items".into(),
            primary_key: "id".into(),
            local_columns: vec!["note".into()],
            foreign_columns: vec!["qty".into(), "name".into()],
            can_add_keys,
        }
    }

    #[test]
    fn test_append_gate() {
        assert!(may_append(SyncDirection::Pull, &descriptor(false)));
        assert!(may_append(SyncDirection::Push, &descriptor(true)));
        assert!(!may_append(SyncDirection::Push, &descriptor(false)));
    }

    #[test]
    fn test_keys_written_to_origin_rows() {
        let mut grid = Grid::new(vec![
            vec!["name".into(), "id".into()],
            vec!["A".into(), 1i64.into()],
            vec!["B".into(), CellValue::Empty],
        ]);
        let outcome = build_index(&grid, &descriptor(false));
        let written = write_allocated_keys(&mut grid, 1, &outcome.allocated);

        assert_eq!(written, 1);
        assert_eq!(grid.cell(2, 1), &CellValue::Number(2.0));
    }

    #[test]
    fn test_projection_follows_target_header() {
        let target = Grid::new(vec![vec![
            "qty".into(),
            "unrelated".into(),
            "id".into(),
            "note".into(),
            "name".into(),
        ]]);
        let source = Grid::new(vec![
            vec!["id".into(), "name".into(), "note".into(), "qty".into()],
            vec![7i64.into(), "G".into(), CellValue::Empty, 0i64.into()],
        ]);

        let indexed = build_index(&source, &descriptor(true));
        let columns = append_columns(&descriptor(true), &indexed.columns, &target);
        let record = indexed.index.get("7").unwrap();

        let row = project_record(record, target.width(), &columns);
        assert_eq!(
            row,
            vec![
                CellValue::Number(0.0),
                CellValue::Empty,
                CellValue::Number(7.0),
                CellValue::Empty,
                CellValue::text("G"),
            ]
        );
    }

    #[test]
    fn test_append_records_extends_target() {
        let mut target = Grid::new(vec![
            vec!["id".into(), "qty".into()],
            vec![1i64.into(), 5i64.into()],
        ]);
        let record = Record::new(4).with("id", 3i64).with("qty", 2i64);
        let source = Grid::new(vec![vec!["id".into(), "qty".into()]]);
        let (source_columns, _) = resolve_columns(&source, ["id", "qty"]);
        let columns = append_columns(&descriptor(true), &source_columns, &target);

        let rows = append_records(&mut target, &[("3".to_string(), record)], &columns);
        assert_eq!(rows.len(), 1);
        assert_eq!(target.data_len(), 2);
        assert_eq!(target.cell(2, 0), &CellValue::Number(3.0));
        assert_eq!(target.cell(2, 1), &CellValue::Number(2.0));
    }
}
