//! Logging infrastructure for actions-usage.
//!
//! Structured logging through the `tracing` ecosystem. Console output goes to
//! stderr so that rendered reports on stdout stay clean.
//!
//! ## Features
//!
//! - Compact human-readable console output
//! - Optional JSON lines file output to `<log_dir>/actions-usage.log`
//! - `-v` flag support for verbose logging
//!
//! ## Example
//!
//! ```no_run
//! use actions_usage_core::logging;
//!
//! // Initialize logging (call once at startup)
//! let _guard = logging::init_logging(None, false).expect("logging init");
//!
//! tracing::info!("analysis started");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{CoreError, Result};

/// File name of the rolling JSON log.
pub const LOG_FILE_NAME: &str = "actions-usage.log";

/// Guard that must be held to ensure log flushing on shutdown.
///
/// When this guard is dropped, it flushes any pending log entries.
/// Keep this guard alive for the lifetime of the application.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the logging system.
///
/// This sets up:
/// - Console logging to stderr (human-readable format)
/// - File logging to `<log_dir>/actions-usage.log` (JSON lines format), only
///   when `log_dir` is given
///
/// # Arguments
///
/// * `log_dir` - Optional log directory. Without it only the console is used.
/// * `verbose` - If true, sets log level to DEBUG. Otherwise uses INFO.
///
/// # Returns
///
/// A [`LogGuard`] that must be held for the application lifetime to ensure
/// logs are properly flushed on shutdown.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("actions_usage={default_level}")));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact();

    let (file_layer, file_guard) = match &log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| CoreError::DirectoryCreation {
                path: dir.clone(),
                source: e,
            })?;

            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_span_list(true);

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| CoreError::Internal {
            message: format!("failed to install tracing subscriber: {e}"),
        })?;

    tracing::debug!(log_dir = ?log_dir, verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

/// Initialize minimal console-only logging for testing.
///
/// Safe to call from several tests; only the first call installs a subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Get the default log directory path.
///
/// Returns `~/.actions-usage/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CoreError::Internal {
        message: "home directory could not be determined".into(),
    })?;

    Ok(home.join(".actions-usage").join("logs"))
}
