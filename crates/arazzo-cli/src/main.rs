use anyhow::{Context, Result};
use arazzo_monitoring::{init_logging, LogExt};
use clap::Parser;
use std::io;
use tracing::info;

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};
use config::CliConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.monitoring())?;
    info!(version = arazzo_dsl::version(), "Starting arazzo");

    let mut stdout = io::stdout().lock();
    match cli.command {
        Commands::Validate { document } => {
            commands::validate(&document, &config.validation(), &mut stdout)
                .log_err("Validation failed")
        }
        Commands::Plan { document } => {
            commands::plan(&document, &config.validation(), &mut stdout).log_err("Planning failed")
        }
        Commands::Eval {
            expression,
            context,
        } => commands::eval(&expression, context.as_deref(), &mut stdout)
            .log_err("Evaluation failed"),
    }
}
