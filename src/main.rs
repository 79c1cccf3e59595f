//! QBTC supervisor entry point.

use anyhow::Result;
use clap::Parser;

use qbtc_supervisor::cli::commands::{self, run::apply_overrides};
use qbtc_supervisor::cli::{handle_error, Cli, Commands};
use qbtc_supervisor::infrastructure::config::ConfigLoader;
use qbtc_supervisor::infrastructure::logging::LoggerImpl;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    // Outlives `run` so the emergency line still reaches the log file.
    let mut logger = None;
    if let Err(err) = run(cli, &mut logger).await {
        handle_error(err, json_mode, logger);
    }
}

async fn run(cli: Cli, logger: &mut Option<LoggerImpl>) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Commands::Run(args) = &cli.command {
        apply_overrides(&mut config, args)?;
    }

    *logger = Some(LoggerImpl::init(&config.logging)?);

    match cli.command {
        Commands::Run(_) => commands::run::execute(&config).await,
        Commands::Probe => commands::probe::execute(&config, cli.json).await,
        Commands::Observe => commands::observe::execute(&config, cli.json).await,
        Commands::Config => commands::config::execute(&config, cli.json),
    }
}
