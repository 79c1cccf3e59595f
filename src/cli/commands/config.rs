//! Implementation of the `qbtc-supervisor config` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ConfigOutput {
    pub config: Config,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_default()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }
}

pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let output_data = ConfigOutput {
        config: config.redacted(),
    };
    output(&output_data, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_output_hides_api_key() {
        let mut config = Config::default();
        config.oracle.api_key = Some("sk-or-v1-secretsecretsecretsecret".to_string());

        let output_data = ConfigOutput {
            config: config.redacted(),
        };

        assert!(!output_data.to_human().contains("secretsecret"));
        assert_eq!(output_data.to_json()["oracle"]["api_key"], "[REDACTED]");
    }
}
