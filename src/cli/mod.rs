//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands, RunArgs};

use crate::infrastructure::logging::LoggerImpl;

/// Report a top-level failure and exit with status 1.
///
/// `logger` is flushed after the failure is logged; `process::exit` skips
/// destructors.
pub fn handle_error(err: anyhow::Error, json_mode: bool, logger: Option<LoggerImpl>) -> ! {
    tracing::error!(error = %format!("{err:#}"), "Emergency shutdown");
    drop(logger);
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1)
}
