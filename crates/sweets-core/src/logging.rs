//! File logging setup.
//!
//! Logs go to `<base>/logs/sweets.log` so command output on stdout stays
//! clean. Filter resolution order: `SWEETS_LOG` env, `log_level` config, `warn`.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{Config, paths};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "SWEETS_LOG";

const LOG_FILE: &str = "sweets.log";
const DEFAULT_DIRECTIVE: &str = "warn";

/// Installs the global subscriber.
///
/// The returned guard flushes buffered lines on drop; hold it for the
/// lifetime of the process.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let directive = resolve_directive(std::env::var(LOG_ENV).ok(), config.log_level.as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("Warning: ignoring invalid log filter '{directive}': {e}");
        EnvFilter::new(DEFAULT_DIRECTIVE)
    });

    let dir = paths::logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(guard)
}

fn resolve_directive(env_value: Option<String>, config_value: Option<&str>) -> String {
    env_value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| {
            config_value
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}
