//! Logging setup for the Arazzo tools.

use serde::Deserialize;
use std::path::PathBuf;

pub mod logging;

pub use logging::{init_logging, LogExt};

/// Configuration for initializing logging
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Service name attached to the startup log line
    pub service_name: String,
    /// Log level filter (e.g., "info,arazzo_dsl=debug"), overridden by `RUST_LOG`
    pub log_filter: String,
    /// JSON lines on stderr instead of human-readable output
    pub enable_json_logging: bool,
    /// Also write JSON logs to this file
    pub log_file: Option<PathBuf>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: "arazzo".to_string(),
            log_filter: "warn".to_string(),
            enable_json_logging: false,
            log_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = MonitoringConfig::default();
        assert_eq!(config.service_name, "arazzo");
        assert_eq!(config.log_filter, "warn");
        assert!(!config.enable_json_logging);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_config_partial_deserialize() {
        let json = r#"{"log_filter": "debug", "log_file": "/tmp/arazzo.log"}"#;
        let config: MonitoringConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.service_name, "arazzo");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/arazzo.log")));
    }
}
