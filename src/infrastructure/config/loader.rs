use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Fallback environment variable for the oracle bearer token
pub const API_KEY_FALLBACK_ENV: &str = "OPENROUTER_API_KEY";

/// Configuration error types
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("At least one service must be configured")]
    NoServices,

    #[error("Service name cannot be empty")]
    EmptyServiceName,

    #[error("Duplicate service name: {0}")]
    DuplicateServiceName(String),

    #[error("Service '{0}' has an empty URL")]
    EmptyServiceUrl(String),

    #[error("Invalid {0}: must be greater than zero")]
    ZeroDuration(&'static str),

    #[error(
        "control_loop.cycle_timeout_ms ({0}) is below the {1} ms needed by the per-call timeouts"
    )]
    CycleBudgetTooSmall(u64, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid balance range: min ({0}) must be below max ({1})")]
    InvalidBalanceRange(f64, f64),

    #[error("Invalid coherence bounds: min ({0}) must be below max ({1}) and both within [0, 1]")]
    InvalidCoherenceBounds(f64, f64),

    #[error("Initial coherence {0} is outside the configured bounds")]
    InitialCoherenceOutOfBounds(f64),

    #[error("Invalid {0}: {1} must be within [0, 1]")]
    InvalidThreshold(&'static str, f64),

    #[error("Invalid trade size: {0}. Must be positive")]
    InvalidTradeSize(f64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .qbtc/config.yaml (project config)
    /// 3. .qbtc/local.yaml (local overrides, optional)
    /// 4. Environment variables (QBTC_* prefix, `__` separates nested keys)
    ///
    /// The oracle token falls back to `OPENROUTER_API_KEY` when
    /// `QBTC_ORACLE__API_KEY` is not set.
    pub fn load() -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".qbtc/config.yaml"))
            .merge(Yaml::file(".qbtc/local.yaml"));

        Self::finish(figment)
    }

    /// Load configuration from a specific file (environment still applies)
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path));

        Self::finish(figment)
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    fn finish(figment: Figment) -> Result<Config> {
        let mut config: Config = figment
            .merge(Env::prefixed("QBTC_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        if config.oracle.api_key.is_none() {
            config.oracle.api_key = std::env::var(API_KEY_FALLBACK_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Services
        if config.services.is_empty() {
            return Err(ConfigError::NoServices);
        }
        let mut seen = HashSet::new();
        for service in &config.services {
            if service.name.trim().is_empty() {
                return Err(ConfigError::EmptyServiceName);
            }
            if service.url.trim().is_empty() {
                return Err(ConfigError::EmptyServiceUrl(service.name.clone()));
            }
            if !seen.insert(service.name.as_str()) {
                return Err(ConfigError::DuplicateServiceName(service.name.clone()));
            }
        }

        // Timing
        let durations = [
            ("control_loop.interval_ms", config.control_loop.interval_ms),
            ("control_loop.cycle_timeout_ms", config.control_loop.cycle_timeout_ms),
            ("probe.timeout_ms", config.probe.timeout_ms),
            ("market.timeout_ms", config.market.timeout_ms),
            ("oracle.timeout_ms", config.oracle.timeout_ms),
            ("trading.timeout_ms", config.trading.timeout_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ZeroDuration(name));
        }
        // Observe, decide, then trade or re-probe, all inside one cycle.
        let required = config
            .probe
            .timeout_ms
            .max(config.market.timeout_ms)
            .saturating_add(config.oracle.timeout_ms)
            .saturating_add(config.trading.timeout_ms.max(config.probe.timeout_ms));
        if config.control_loop.cycle_timeout_ms < required {
            return Err(ConfigError::CycleBudgetTooSmall(
                config.control_loop.cycle_timeout_ms,
                required,
            ));
        }
        if config.control_loop.max_cycles == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "control_loop.max_cycles must be at least 1 when set".to_string(),
            ));
        }

        // Logging
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        // Balance
        let balance = &config.balance;
        if balance.fixed.is_none() && !(balance.min < balance.max) {
            return Err(ConfigError::InvalidBalanceRange(balance.min, balance.max));
        }

        // Trading
        if !(config.trading.size > 0.0) {
            return Err(ConfigError::InvalidTradeSize(config.trading.size));
        }

        // Stability
        let stability = &config.stability;
        let unit = 0.0..=1.0;
        if !(unit.contains(&stability.min_coherence)
            && unit.contains(&stability.max_coherence)
            && stability.min_coherence < stability.max_coherence)
        {
            return Err(ConfigError::InvalidCoherenceBounds(
                stability.min_coherence,
                stability.max_coherence,
            ));
        }
        if !(stability.min_coherence..=stability.max_coherence)
            .contains(&stability.initial_coherence)
        {
            return Err(ConfigError::InitialCoherenceOutOfBounds(
                stability.initial_coherence,
            ));
        }
        let thresholds = [
            ("stability.confidence_threshold", stability.confidence_threshold),
            ("stability.reward", stability.reward),
            ("stability.penalty", stability.penalty),
            ("stability.fatal_penalty", stability.fatal_penalty),
            ("stability.alive_threshold", stability.alive_threshold),
            ("stability.transcendent_threshold", stability.transcendent_threshold),
            ("stability.healthy_threshold", stability.healthy_threshold),
            ("stability.degraded_threshold", stability.degraded_threshold),
        ];
        if let Some((name, value)) = thresholds.iter().find(|(_, value)| !unit.contains(value)) {
            return Err(ConfigError::InvalidThreshold(name, *value));
        }

        Ok(())
    }
}
