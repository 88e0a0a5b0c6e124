use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arazzo")]
#[command(about = "Validate and inspect Arazzo workflow documents", long_about = None)]
pub struct Cli {
    /// Path to config file (defaults to arazzo.{toml,yaml,json} when present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a document and build its workflow graph
    Validate {
        /// Arazzo document (YAML, or JSON with a .json extension)
        document: PathBuf,
    },

    /// Print workflows in execution order with their steps and parameters
    Plan {
        /// Arazzo document (YAML, or JSON with a .json extension)
        document: PathBuf,
    },

    /// Parse a runtime expression and optionally evaluate it
    Eval {
        /// Runtime expression, bare (`$statusCode`) or embedded (`{$statusCode}`)
        expression: String,

        /// JSON file holding the execution context
        #[arg(short = 'c', long = "context")]
        context: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_eval_with_context() {
        let cli = Cli::parse_from(["arazzo", "eval", "$statusCode", "--context", "ctx.json"]);
        match cli.command {
            Commands::Eval { expression, context } => {
                assert_eq!(expression, "$statusCode");
                assert_eq!(context, Some(PathBuf::from("ctx.json")));
            }
            _ => panic!("Expected eval"),
        }
    }

    #[test]
    fn test_config_is_global() {
        let cli = Cli::parse_from(["arazzo", "validate", "flow.yaml", "--config", "ci.toml"]);
        assert_eq!(cli.config.as_deref(), Some("ci.toml"));
    }
}
