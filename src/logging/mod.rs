//! Tracing subscriber initialization.
//!
//! Diagnostics go to a plain-text log file so they never interleave with the
//! JSON or layout documents the CLI prints on stdout.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Log path has no usable file name
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Log path has no parent directory
    #[error("Log path has no parent directory: {0:?}")]
    NoParentDirectory(PathBuf),

    /// A global subscriber is already installed
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// `RUST_LOG` if it parses, otherwise [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Build a subscriber that appends plain-text events to `log_path`.
///
/// Creates the log directory if it doesn't exist.
///
/// # Errors
///
/// `DirectoryCreation` if the directory cannot be created, `InvalidPath` or
/// `NoParentDirectory` if `log_path` does not name a file inside a directory.
pub fn file_subscriber(
    log_path: &Path,
) -> Result<impl tracing::Subscriber + Send + Sync + 'static, LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = log_path
        .parent()
        .ok_or_else(|| LoggingError::NoParentDirectory(log_path.to_path_buf()))?;

    if !directory.as_os_str().is_empty() {
        std::fs::create_dir_all(directory).map_err(|source| LoggingError::DirectoryCreation {
            path: directory.to_path_buf(),
            source,
        })?;
    }

    let file_appender = tracing_appender::rolling::never(directory, file_name);

    Ok(tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(file_appender)
        .with_ansi(false)
        .finish())
}

/// Install the file subscriber from [`file_subscriber`] as the global default.
///
/// Respects `RUST_LOG`, defaults to `info`.
///
/// # Errors
///
/// Everything [`file_subscriber`] reports, plus `SubscriberAlreadySet` when
/// called more than once per process.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    let subscriber = file_subscriber(log_path)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn file_subscriber_creates_nested_log_directory() {
        let dir = scratch_dir("tsviz_test_logs_nested");
        let log_file = dir.join("a").join("b").join("tsviz.log");

        let _subscriber = file_subscriber(&log_file).unwrap();
        assert!(log_file.parent().unwrap().is_dir());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_subscriber_writes_events_to_file() {
        let dir = scratch_dir("tsviz_test_logs_write");
        let log_file = dir.join("events.log");

        let subscriber = file_subscriber(&log_file).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(grammar = "klingon", "Grammar failed to load");
        });

        let contents = fs::read_to_string(&log_file).unwrap();
        assert!(contents.contains("Grammar failed to load"));
        assert!(contents.contains("klingon"));
        assert!(!contents.contains('\u{1b}'), "log file must not contain ANSI escapes");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn root_path_is_rejected() {
        let result = file_subscriber(Path::new("/"));
        assert!(matches!(result, Err(LoggingError::InvalidPath(_))));
    }

    #[test]
    #[serial(tracing_init)]
    fn init_creates_log_directory_if_missing() {
        let dir = scratch_dir("tsviz_test_logs_init");
        let log_file = dir.join("tsviz.log");

        // May report SubscriberAlreadySet if another test got there first
        let _ = init(&log_file);
        assert!(dir.exists(), "Log directory should be created: {:?}", dir);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    #[serial(tracing_init)]
    fn second_init_reports_subscriber_already_set() {
        let dir = scratch_dir("tsviz_test_logs_twice");
        let log_file = dir.join("tsviz.log");

        let _ = init(&log_file);
        assert!(matches!(
            init(&log_file),
            Err(LoggingError::SubscriberAlreadySet)
        ));

        let _ = fs::remove_dir_all(&dir);
    }
}
