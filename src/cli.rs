//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pull hub-owned columns into a local store, or push locally owned columns
/// to the hub.
#[derive(Parser, Debug)]
#[command(name = "hubsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, default_value = "hubsync.toml", env = "HUBSYNC_CONFIG")]
    pub config: PathBuf,

    /// Local SQLite store (overrides the config file)
    #[arg(long, global = true, env = "HUBSYNC_LOCAL")]
    pub local: Option<PathBuf>,

    /// Hub SQLite store (overrides the config file)
    #[arg(long, global = true, env = "HUBSYNC_REMOTE")]
    pub remote: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Copy hub-owned columns into the local tables
    Pull {
        /// Print the pass summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Copy locally owned columns into the hub tables
    Push {
        /// Print the pass summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a config file and create the params and change log tables
    ///
    /// Existing tables and an existing config file are left untouched.
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}
