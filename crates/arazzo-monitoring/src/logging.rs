//! Structured logging using tracing.
//!
//! Human-readable or JSON output goes to stderr so stdout stays free for
//! command output. An optional file layer always writes JSON.

use anyhow::Context;
use std::io;
use std::path::Path;
use tracing::debug;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::MonitoringConfig;

/// Initialize structured logging. Fails if a global subscriber is already set.
pub fn init_logging(config: &MonitoringConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .with_context(|| format!("Invalid log filter '{}'", config.log_filter))?;

    let json_layer = config.enable_json_logging.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(io::stderr)
    });

    let pretty_layer = (!config.enable_json_logging).then(|| {
        fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(io::stderr)
    });

    let file_layer = match &config.log_file {
        Some(log_file) => {
            let directory = log_file.parent().unwrap_or_else(|| Path::new("."));
            let file_name = log_file
                .file_name()
                .with_context(|| format!("Log file '{}' has no file name", log_file.display()))?;
            let appender = RollingFileAppender::new(Rotation::NEVER, directory, file_name);
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(appender),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to set global default subscriber")?;

    debug!(
        service_name = %config.service_name,
        log_format = if config.enable_json_logging { "json" } else { "pretty" },
        log_file = ?config.log_file,
        "Logging initialized"
    );

    Ok(())
}

/// Trait to add log context to results
pub trait LogExt<T, E> {
    /// Log error with additional context before returning
    fn log_err(self, message: &str) -> Result<T, E>;

    /// Log success with additional context before returning
    fn log_ok(self, message: &str) -> Result<T, E>;
}

impl<T, E: std::fmt::Display> LogExt<T, E> for Result<T, E> {
    fn log_err(self, message: &str) -> Result<T, E> {
        if let Err(ref e) = self {
            tracing::error!("{}: {}", message, e);
        }
        self
    }

    fn log_ok(self, message: &str) -> Result<T, E> {
        if self.is_ok() {
            tracing::info!("{}", message);
        }
        self
    }
}
