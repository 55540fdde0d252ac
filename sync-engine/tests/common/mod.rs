#![allow(dead_code)]

use hubsync_engine::{CellValue, Grid, MemoryStore, PARAMS_HEADER};

/// `items` on the local side, `hub_items` on the hub. `name` is owned locally,
/// `qty` by the hub.
pub fn items_params(can_add_keys: bool) -> Grid {
    Grid::from_header(
        &PARAMS_HEADER,
        vec![vec![
            CellValue::from("items"),
            "hub_items".into(),
            "id".into(),
            "name".into(),
            "qty".into(),
            can_add_keys.into(),
        ]],
    )
}

pub fn cell(v: Option<i64>) -> CellValue {
    v.map(CellValue::from).unwrap_or(CellValue::Empty)
}

/// Builds an `id, name, qty` grid.
pub fn items(rows: &[(Option<i64>, &str, Option<i64>)]) -> Grid {
    Grid::from_header(
        &["id", "name", "qty"],
        rows.iter()
            .map(|(id, name, qty)| vec![cell(*id), CellValue::from(*name), cell(*qty)])
            .collect(),
    )
}

pub fn local_store(can_add_keys: bool, grid: Grid) -> MemoryStore {
    MemoryStore::new()
        .with_table("params", items_params(can_add_keys))
        .with_table("items", grid)
}

pub fn hub_store(grid: Grid) -> MemoryStore {
    MemoryStore::new().with_table("hub_items", grid)
}

/// Key column values of every data row, as match keys.
pub fn keys(grid: &Grid) -> Vec<Option<String>> {
    let idx = grid.column_index("id").expect("id column");
    grid.data_rows().map(|(_, row)| row[idx].as_key()).collect()
}
