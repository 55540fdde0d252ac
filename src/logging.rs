use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{CliError, Result};

/// Installs the global subscriber. `RUST_LOG` wins; otherwise `debug` when
/// verbose and `info` when not. Logs go to stderr so `--json` output stays clean.
pub fn init(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .map_err(|e| CliError::Logging(e.to_string()))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
