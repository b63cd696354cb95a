//! Error types for the mend configuration store.

use std::path::PathBuf;
use thiserror::Error;

/// Store-related errors
///
/// `UnknownKey` and `MissingDefault` are programming errors in the caller or
/// the schema. Data problems (invalid values, unreadable lines) are repaired
/// or skipped inside the store and never surface here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown configuration key: '{0}'")]
    UnknownKey(String),

    #[error("Schema has no default value for key '{0}'")]
    MissingDefault(String),

    #[error("Key '{key}' is not declared as {expected}")]
    RuleMismatch { key: String, expected: &'static str },

    #[error("I/O error on config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Logging setup errors
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log format: {0} (must be 'json' or 'text')")]
    InvalidFormat(String),

    #[error("Invalid log output: {0} (must be 'stdout', 'stderr' or 'file')")]
    InvalidOutput(String),

    #[error("Invalid log directive: {0}")]
    InvalidDirective(String),

    #[error("Failed to open log file {path:?}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load logging configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

impl StoreError {
    /// True for errors caused by calling the store with keys the schema does
    /// not know, as opposed to runtime data or I/O problems.
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, StoreError::UnknownKey(_) | StoreError::MissingDefault(_))
    }
}
