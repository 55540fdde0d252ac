//! hubsync command-line interface
//!
//! Runs pull and push passes between a local SQLite table store and a shared
//! hub store, using the params table in the local store to decide which
//! columns each side owns.

mod cli;
mod commands;
mod config;
mod error;
mod logging;

use clap::Parser;
use hubsync_engine::SyncDirection;

use cli::{Cli, Commands};
use config::HubsyncConfig;
use error::Result;

/// Exit status when a pass finished but skipped tables or found drift.
const EXIT_UNCLEAN: i32 = 2;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_UNCLEAN),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether the command finished cleanly.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let config = HubsyncConfig::load(&cli.config)?.with_overrides(cli.local, cli.remote);

    match cli.command {
        Commands::Pull { json } => commands::run_pass(SyncDirection::Pull, &config, json),
        Commands::Push { json } => commands::run_pass(SyncDirection::Push, &config, json),
        Commands::Init { force } => {
            commands::run_init(&cli.config, &config, force)?;
            Ok(true)
        }
    }
}
