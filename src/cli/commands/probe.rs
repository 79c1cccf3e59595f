//! Implementation of the `qbtc-supervisor probe` command.

use anyhow::Result;
use serde::Serialize;

use crate::application::build_collector;
use crate::cli::output::{output, probe_table, CommandOutput, ProbeRow};
use crate::domain::models::Config;
use crate::infrastructure::http::build_client;

#[derive(Debug, Serialize)]
pub struct ProbeOutput {
    pub services: Vec<ProbeRow>,
    pub healthy: usize,
    pub total: usize,
}

impl CommandOutput for ProbeOutput {
    fn to_human(&self) -> String {
        format!(
            "{}\n{}/{} services OK",
            probe_table(&self.services),
            self.healthy,
            self.total
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let collector = build_collector(config, &build_client()?);
    let results = collector.probe_all().await;

    let services: Vec<ProbeRow> = config
        .services
        .iter()
        .zip(results)
        .map(|(endpoint, (service, health))| ProbeRow {
            service,
            url: endpoint.url.clone(),
            health,
        })
        .collect();

    let output_data = ProbeOutput {
        healthy: services.iter().filter(|row| row.health.is_ok()).count(),
        total: services.len(),
        services,
    };
    output(&output_data, json_mode);
    Ok(())
}
