//! Console and rolling-file logging.
//!
//! [`init_logging`] installs a global `tracing` subscriber with a console
//! layer on stderr and, optionally, a daily rolling file written through a
//! non-blocking appender. Keep the returned [`LoggingGuard`] alive for the
//! lifetime of the process or buffered file output is lost.
//!
//! `RUST_LOG` overrides the configured level when set.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{default_log_dir, LoggingSettings};

/// Log file name prefix. The appender adds the date.
pub const LOG_FILE_PREFIX: &str = "flightdeck.log";

/// Logging setup errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// What to log and where.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// `trace`, `debug`, `info`, `warn` or `error`.
    pub level: String,
    /// Forces `debug` regardless of `level`.
    pub verbose: bool,
    /// `None` disables the file layer.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
            directory: Some(default_log_dir()),
        }
    }
}

impl LoggingOptions {
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        let directory = settings
            .file
            .then(|| settings.directory.clone().unwrap_or_else(default_log_dir));
        Self {
            level: settings.level.clone(),
            verbose: false,
            directory,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Filter directive for the crates in this workspace.
    pub fn directive(&self) -> String {
        let level = if self.verbose { "debug" } else { &self.level };
        format!("flightdeck={level},flightdeck_cli={level}")
    }
}

/// Keeps the file writer flushing. Dropping it stops file output.
#[derive(Debug)]
pub struct LoggingGuard {
    _worker: Option<WorkerGuard>,
    directory: Option<PathBuf>,
}

impl LoggingGuard {
    /// Directory log files are written to, if file logging is on.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }
}

/// Build the level filter. `RUST_LOG` wins when present and valid.
pub fn build_filter(options: &LoggingOptions) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = options.directive();
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter {
        filter: directive,
        reason: e.to_string(),
    })
}

/// Create the log directory if needed.
pub fn prepare_log_dir(directory: &Path) -> Result<(), LoggingError> {
    std::fs::create_dir_all(directory).map_err(|source| LoggingError::CreateDir {
        path: directory.to_path_buf(),
        source,
    })
}

/// Install the global subscriber.
pub fn init_logging(options: &LoggingOptions) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(options)?;

    let console = fmt::layer()
        .with_timer(LocalTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, worker) = match options.directory.as_deref() {
        Some(directory) => {
            prepare_log_dir(directory)?;
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, worker) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(LocalTime::rfc_3339())
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(worker))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard {
        _worker: worker,
        directory: options.directory.clone(),
    })
}
