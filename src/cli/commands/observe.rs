//! Implementation of the `qbtc-supervisor observe` command.

use anyhow::{Context, Result};

use crate::application::build_collector;
use crate::domain::models::Config;
use crate::infrastructure::http::build_client;

/// Collect one observation and print it as JSON (compact with `--json`).
pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let collector = build_collector(config, &build_client()?);
    let observation = collector.collect().await;

    let rendered = if json_mode {
        serde_json::to_string(&observation)
    } else {
        serde_json::to_string_pretty(&observation)
    }
    .context("Failed to serialize observation")?;

    println!("{rendered}");
    Ok(())
}
