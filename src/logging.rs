//! Logging setup for filedrop.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{FiledropError, Result};

/// Map a configured level name to a tracing level. Unknown names mean `info`.
fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Build the filter from `RUST_LOG` when it is set, else from the configured
/// level.
fn build_filter(level: &str) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_for(rust_log.as_deref(), level)
}

fn filter_for(rust_log: Option<&str>, level: &str) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| match EnvFilter::try_new(directives) {
            Ok(filter) => Some(filter),
            Err(e) => {
                eprintln!("Ignoring invalid {}: {e}", EnvFilter::DEFAULT_ENV);
                None
            }
        })
        .unwrap_or_else(|| EnvFilter::default().add_directive(parse_level(level).into()))
}

/// Initialize logging to stdout and to the configured log file.
///
/// The log file is appended to, and its parent directory is created when
/// missing.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let path = Path::new(&config.file);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let log_file = OpenOptions::new().create(true).append(true).open(path)?;
    let writer = std::io::stdout.and(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .with(build_filter(&config.level))
        .try_init()
        .map_err(|e| FiledropError::Config(format!("logging already initialized: {e}")))
}

/// Initialize console-only logging.
///
/// Used as the fallback when the log file cannot be opened. A second call is
/// a no-op.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(true)
                .with_target(true),
        )
        .with(build_filter(level))
        .try_init();
}
