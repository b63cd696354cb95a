//! Integration tests for logging to a file.
//!
//! A global subscriber can be installed once per test binary, so only this
//! test calls `init_logging`, and it tolerates an earlier installation.

use super::test_utils::TestStore;
use mend::logging::{init_logging, LoggingConfig};
use mend::LoggingError;
use tempfile::TempDir;

fn env_overrides_logging() -> bool {
    ["MEND_LOG", "MEND_LOG_FORMAT", "MEND_LOG_OUTPUT"]
        .iter()
        .any(|var| std::env::var(var).is_ok())
}

#[test]
fn test_file_output_creates_log_and_records_store_events() {
    if env_overrides_logging() {
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs").join("mend.log");
    let config = LoggingConfig {
        output: "file".to_string(),
        file: log_path.clone(),
        color: false,
        ..LoggingConfig::default()
    };

    let installed = match init_logging(Some(&config)) {
        Ok(()) => true,
        Err(LoggingError::AlreadyInitialized(_)) => false,
        Err(e) => panic!("logging setup failed: {}", e),
    };

    assert!(log_path.exists(), "log file should exist at {}", log_path.display());

    if installed {
        let fixture = TestStore::new();
        fixture.open();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(
            content.contains("Config store opened"),
            "log file should record the store opening; got: {}",
            content
        );
    }
}

#[test]
fn test_invalid_output_is_rejected_before_install() {
    if env_overrides_logging() {
        return;
    }

    let config = LoggingConfig {
        output: "syslog".to_string(),
        ..LoggingConfig::default()
    };

    assert!(matches!(
        init_logging(Some(&config)),
        Err(LoggingError::InvalidOutput(_))
    ));
}
