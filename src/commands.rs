//! Command implementations. Each opens the SQLite stores named by the
//! resolved config and hands them to the engine.

use std::path::Path;

use hubsync_engine::{
    CellValue, Grid, PassSummary, SqliteStore, SyncDirection, SyncSession, TableStore,
    TracingObserver, CHANGE_LOG_HEADER, PARAMS_HEADER,
};
use tracing::info;

use crate::config::HubsyncConfig;
use crate::error::{CliError, Result};

fn open_store(path: &Path) -> Result<SqliteStore> {
    let path = path
        .to_str()
        .ok_or_else(|| CliError::user(format!("store path is not valid UTF-8: {}", path.display())))?;
    Ok(SqliteStore::open(path)?)
}

/// Opens a store that must already exist. Opening a missing SQLite file would
/// create an empty store and every table would be skipped.
fn open_existing_store(path: &Path) -> Result<SqliteStore> {
    if !path.exists() {
        return Err(CliError::user(format!(
            "store not found: {} (run `hubsync init` or check the path)",
            path.display()
        )));
    }
    open_store(path)
}

/// Runs one merge pass and prints its summary. Returns whether the pass was
/// clean: no skipped table, no collision and no schema drift.
pub fn run_pass(direction: SyncDirection, config: &HubsyncConfig, json: bool) -> Result<bool> {
    let mut local = open_existing_store(&config.local)?;
    let mut remote = open_existing_store(&config.remote)?;
    let session = SyncSession::new(config.session_options());

    let summary = session.run_merge(direction, &mut local, &mut remote, &mut TracingObserver)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_summary(&summary));
    }
    Ok(summary.is_clean())
}

fn render_summary(summary: &PassSummary) -> String {
    let mut out = format!(
        "{}: {} table(s) merged, {} cell(s) changed, {} row(s) added, {} key(s) allocated\n",
        summary.direction,
        summary.tables_merged,
        summary.changes,
        summary.rows_added,
        summary.keys_allocated,
    );
    for table in &summary.tables {
        if !table.drift.is_empty() {
            out.push_str(&format!(
                "  {}: columns out of sync with data hub: {}\n",
                table.table,
                table.drift.join(", ")
            ));
        }
        if !table.duplicates.is_empty() {
            out.push_str(&format!(
                "  {}: duplicate keys ignored: {}\n",
                table.table,
                table.duplicates.join(", ")
            ));
        }
    }
    for warning in &summary.warnings {
        out.push_str(&format!("  warning {}: {}\n", warning.table, warning.message));
    }
    out
}

/// Writes the config file and creates the params and change log tables in
/// the local store when they are missing.
pub fn run_init(config_path: &Path, config: &HubsyncConfig, force: bool) -> Result<()> {
    if force || !config_path.exists() {
        config.save(config_path)?;
        info!(path = %config_path.display(), "wrote config file");
    }

    let mut local = open_store(&config.local)?;
    ensure_table(&mut local, &config.params_table, &PARAMS_HEADER)?;
    ensure_table(&mut local, &config.log_table, &CHANGE_LOG_HEADER)?;
    Ok(())
}

fn ensure_table(store: &mut dyn TableStore, name: &str, header: &[&str]) -> Result<bool> {
    if store.has_table(name)? {
        return Ok(false);
    }
    store.set_table(name, &Grid::from_header(header, Vec::<Vec<CellValue>>::new()))?;
    info!(table = name, "created table");
    Ok(true)
}
