//! Implementation of the `qbtc-supervisor run` command.

use anyhow::Result;
use tracing::{info, warn};

use crate::application::Supervisor;
use crate::cli::types::RunArgs;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

/// Apply command-line overrides on top of the loaded configuration.
pub fn apply_overrides(config: &mut Config, args: &RunArgs) -> Result<()> {
    if let Some(max_cycles) = args.max_cycles {
        config.control_loop.max_cycles = Some(max_cycles);
    }
    if let Some(interval_ms) = args.interval_ms {
        config.control_loop.interval_ms = interval_ms;
    }
    if let Some(port) = args.port {
        config.status.port = port;
    }
    ConfigLoader::validate(config)?;
    Ok(())
}

/// Run until SIGINT/SIGTERM or the configured cycle limit.
///
/// Returns an error only for emergencies: the loop task died outside the
/// cycle guard.
pub async fn execute(config: &Config) -> Result<()> {
    let mut handle = Supervisor::start(config).await?;

    tokio::select! {
        () = shutdown_signal() => info!("Shutdown signal received"),
        () = handle.stopped() => info!("Control loop finished"),
    }

    let state = handle.stop().await?;
    if state.failed_cycles > 0 {
        warn!(failed_cycles = state.failed_cycles, "Some cycles ended on the fatal path");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_applied_and_validated() {
        let mut config = Config::default();
        let args = RunArgs {
            max_cycles: Some(2),
            interval_ms: Some(500),
            port: Some(0),
        };

        apply_overrides(&mut config, &args).unwrap();

        assert_eq!(config.control_loop.max_cycles, Some(2));
        assert_eq!(config.control_loop.interval_ms, 500);
        assert_eq!(config.status.port, 0);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = Config::default();
        let args = RunArgs {
            interval_ms: Some(0),
            ..RunArgs::default()
        };
        assert!(apply_overrides(&mut config, &args).is_err());
    }
}
