//! Logging setup for the launcher
//!
//! `RUST_LOG` takes precedence over the configured level so a launch can
//! be traced without editing the config file.

use crate::config::DebugConfig;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Safe to call once per process; later calls are ignored so tests that
/// each set up logging do not panic.
pub fn init(debug: &DebugConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(debug.log_level.as_filter()));

    if debug.log_to_file {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&debug.log_path)
        {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false)
                    .try_init();
                return;
            }
            Err(err) => {
                eprintln!(
                    "failed to open log file {:?}: {}, logging to stderr",
                    debug.log_path, err
                );
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let debug = DebugConfig::default();
        init(&debug);
        init(&debug);
    }

    #[test]
    fn test_init_with_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let debug = DebugConfig {
            log_to_file: true,
            log_path: dir.path().join("rustro.log"),
            ..DebugConfig::default()
        };
        init(&debug);
        assert!(debug.log_path.exists());
    }
}
