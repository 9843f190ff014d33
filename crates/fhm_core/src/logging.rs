use std::path::Path;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::MigrateConfig;

const LOG_FILE_PREFIX: &str = "fhm-migrate";

/// Default filter: the configured level for everything, with the migration
/// crates raised to at least that level.
fn default_filter(level: &str) -> String {
    format!("{level},fhm_app={level},fhm_blockchain={level},fhm_core={level}")
}

/// Initializes file + console logging under `~/.fhm/logs`.
/// Returns a guard that must be kept alive until the run finishes.
pub fn init_logging(level: &str) -> Result<WorkerGuard> {
    let logs_dir = MigrateConfig::logs_dir()?;
    init_logging_to_dir(&logs_dir, &default_filter(level), true)
}

/// Initialize logging to a custom directory with a custom filter.
///
/// `RUST_LOG` takes precedence over `filter` when set.
pub fn init_logging_to_dir(logs_dir: &Path, filter: &str, console: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;

    // File appender: daily rotation
    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_ansi(false)
        .with_writer(non_blocking);

    let console_layer = console.then(|| {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}
