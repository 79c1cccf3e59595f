//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "qbtc-supervisor")]
#[command(about = "QBTC supervisor - observe, decide, act, evolve", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to .qbtc/config.yaml and .qbtc/local.yaml)
    #[arg(short, long, global = true, env = "QBTC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop and the status server until interrupted
    Run(RunArgs),

    /// Probe every configured service once
    Probe,

    /// Collect a single observation and print it
    Observe,

    /// Print the effective configuration with secrets redacted
    Config,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Stop after this many cycles
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Pause between cycles, in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Status server port
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "qbtc-supervisor",
            "--json",
            "run",
            "--max-cycles",
            "3",
            "--interval-ms",
            "250",
            "--port",
            "15001",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.max_cycles, Some(3));
                assert_eq!(args.interval_ms, Some(250));
                assert_eq!(args.port, Some(15001));
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["qbtc-supervisor", "probe", "--config", "custom.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        assert!(matches!(cli.command, Commands::Probe));
    }
}
