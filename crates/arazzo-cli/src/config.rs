//! Configuration for the `arazzo` command.
//!
//! Values come from an optional config file and `ARAZZO_*` environment
//! variables, the latter taking precedence.

use anyhow::Context;
use arazzo_dsl::ValidationOptions;
use arazzo_monitoring::MonitoringConfig;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "arazzo";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// `ARAZZO_LOG_LEVEL`, a tracing filter such as `info` or `arazzo_dsl=debug`
    pub log_level: String,

    /// `ARAZZO_LOG_JSON`
    pub log_json: bool,

    /// `ARAZZO_LOG_FILE`
    pub log_file: Option<PathBuf>,

    /// `ARAZZO_STRICT_EXTENSIONS`, reject unknown non-`x-` fields
    pub strict_extensions: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_json: false,
            log_file: None,
            strict_extensions: false,
        }
    }
}

impl CliConfig {
    /// Load from `path` (or `arazzo.{toml,yaml,json}` in the working directory when
    /// present) and the environment
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("ARAZZO").try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn monitoring(&self) -> MonitoringConfig {
        MonitoringConfig {
            service_name: "arazzo-cli".to_string(),
            log_filter: self.log_level.clone(),
            enable_json_logging: self.log_json,
            log_file: self.log_file.clone(),
        }
    }

    pub fn validation(&self) -> ValidationOptions {
        ValidationOptions {
            strict_extensions: self.strict_extensions,
        }
    }
}
