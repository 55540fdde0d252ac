#![allow(dead_code)]

use hubsync_engine::{CellValue, Grid, MemoryStore, TableDescriptor, PARAMS_HEADER};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub const HEADER: [&str; 8] = [
    "id",
    "path",
    "extension",
    "owner",
    "size_bytes",
    "checksum",
    "tags",
    "reviewed",
];

pub fn descriptor(can_add_keys: bool) -> TableDescriptor {
    TableDescriptor {
        local_name: "files".into(),
        remote_name: "hub_files".into(),
        primary_key: "id".into(),
        local_columns: vec!["tags".into(), "reviewed".into()],
        foreign_columns: vec![
            "path".into(),
            "extension".into(),
            "owner".into(),
            "size_bytes".into(),
            "checksum".into(),
        ],
        can_add_keys,
    }
}

pub fn params(can_add_keys: bool) -> Grid {
    let d = descriptor(can_add_keys);
    let mut rows = Vec::new();
    for i in 0..d.foreign_columns.len().max(d.local_columns.len()) {
        rows.push(vec![
            CellValue::from(d.local_name.as_str()),
            d.remote_name.as_str().into(),
            d.primary_key.as_str().into(),
            d.local_columns.get(i).map(|c| c.as_str().into()).unwrap_or_default(),
            d.foreign_columns.get(i).map(|c| c.as_str().into()).unwrap_or_default(),
            can_add_keys.into(),
        ]);
    }
    Grid::from_header(&PARAMS_HEADER, rows)
}

pub fn file_row(idx: usize, key: Option<usize>, revision: u64) -> Vec<CellValue> {
    let exts = ["pdf", "jpg", "mp4", "txt", "rs"];
    let owners = ["alice", "bob", "carol", "david"];
    vec![
        key.map(|k| CellValue::from(k as i64)).unwrap_or_default(),
        CellValue::text(format!("/data/file_{}.{}", idx, exts[idx % 5])),
        exts[idx % 5].into(),
        owners[idx % 4].into(),
        CellValue::from((1000 + idx * 100) as i64 + revision as i64),
        CellValue::text(format!("{:016x}", (idx as u64).wrapping_mul(0xdeadbeef) ^ revision)),
        "work".into(),
        (idx % 3 == 0).into(),
    ]
}

/// `rows` keyed rows in shuffled order plus `unkeyed` rows without a key.
pub fn file_grid(rows: usize, unkeyed: usize, revision: u64, seed: u64) -> Grid {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data: Vec<Vec<CellValue>> = (0..rows).map(|i| file_row(i, Some(i), revision)).collect();
    data.shuffle(&mut rng);
    for i in 0..unkeyed {
        let idx = rows + i + rng.gen_range(0..1000);
        data.push(file_row(idx, None, revision));
    }
    Grid::from_header(&HEADER, data)
}

/// Local store whose rows are a stale copy of the hub; `changed` of every
/// hundred rows differ in hub-owned columns.
pub fn stores(rows: usize, changed: usize, new_on_hub: usize) -> (MemoryStore, MemoryStore) {
    let hub = file_grid(rows, new_on_hub, 1, 7);
    let mut local = file_grid(rows, 0, 1, 11);
    let size_col = local.column_index("size_bytes").unwrap_or(4);
    for row in 1..=rows {
        if row % 100 < changed {
            local.set_cell(row, size_col, CellValue::Number(0.0));
        }
    }
    let local = MemoryStore::new()
        .with_table("params", params(false))
        .with_table("files", local);
    let hub = MemoryStore::new().with_table("hub_files", hub);
    (local, hub)
}
