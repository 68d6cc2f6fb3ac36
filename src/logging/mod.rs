//! Tracing subscriber initialization.
//!
//! The terminal belongs to the TUI, so logs go to a file. Follow them with
//! `tail -f` in another terminal. Worker threads are named
//! (`hexplore-pages`, `hexplore-comments`) and the name is logged with each
//! event.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_FILTER: &str = "hexplore=info,warn";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Log path has no usable file name
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Log file could not be opened
    #[error("Failed to open log file: {0}")]
    Appender(#[from] InitError),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Build the filter: `RUST_LOG` if set and valid, otherwise [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Create the log directory and a non-rotating appender for `log_path`.
///
/// # Errors
///
/// `InvalidPath` when `log_path` has no file name, `DirectoryCreation` when
/// its directory cannot be created, `Appender` when the file can't be opened.
pub fn open_appender(log_path: &Path) -> Result<RollingFileAppender, LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.to_path_buf(),
        source,
    })?;

    Ok(RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)?)
}

/// Initialize the tracing subscriber with file-based logging.
///
/// # Errors
///
/// Fails if the log file cannot be prepared or a subscriber is already set.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    let appender = open_appender(log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(appender)
        .with_thread_names(true)
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
