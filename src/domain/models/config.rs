use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::loop_state::{CoherenceLabel, INITIAL_COHERENCE};
use super::observation::ServiceEndpoint;

/// Placeholder shown instead of secrets in printed configuration.
pub const REDACTED: &str = "[REDACTED]";

/// Main configuration structure for the supervisor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Cycle pacing
    #[serde(default)]
    pub control_loop: LoopConfig,

    /// Status server binding
    #[serde(default)]
    pub status: StatusConfig,

    /// Monitored backend services
    #[serde(default = "default_services")]
    pub services: Vec<ServiceEndpoint>,

    /// Health probe settings
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Reference price source
    #[serde(default)]
    pub market: MarketConfig,

    /// Synthetic balance generation
    #[serde(default)]
    pub balance: BalanceConfig,

    /// Decision oracle endpoint
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Trade execution endpoint and order defaults
    #[serde(default)]
    pub trading: TradingConfig,

    /// Coherence evolution constants
    #[serde(default)]
    pub stability: StabilityConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            control_loop: LoopConfig::default(),
            status: StatusConfig::default(),
            services: default_services(),
            probe: ProbeConfig::default(),
            market: MarketConfig::default(),
            balance: BalanceConfig::default(),
            oracle: OracleConfig::default(),
            trading: TradingConfig::default(),
            stability: StabilityConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Copy of the configuration that is safe to print.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.oracle.api_key.is_some() {
            copy.oracle.api_key = Some(REDACTED.to_string());
        }
        copy
    }
}

fn default_services() -> Vec<ServiceEndpoint> {
    [
        ("leonardo", 3003),
        ("quantum", 14105),
        ("risk", 14501),
        ("trading", 14201),
        ("admin", 8888),
    ]
    .into_iter()
    .map(|(name, port)| ServiceEndpoint::new(name, format!("http://localhost:{port}")))
    .collect()
}

/// Control loop pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoopConfig {
    /// Pause between the end of one cycle and the start of the next
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Upper bound on a whole cycle; exceeding it is a fatal cycle
    #[serde(default = "default_cycle_timeout_ms")]
    pub cycle_timeout_ms: u64,

    /// Stop after this many cycles (runs forever when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cycles: Option<u64>,
}

const fn default_interval_ms() -> u64 {
    10_000
}

const fn default_cycle_timeout_ms() -> u64 {
    60_000
}

impl LoopConfig {
    /// Interval as a `Duration`.
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Cycle timeout as a `Duration`.
    pub const fn cycle_timeout(&self) -> Duration {
        Duration::from_millis(self.cycle_timeout_ms)
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            cycle_timeout_ms: default_cycle_timeout_ms(),
            max_cycles: None,
        }
    }
}

/// Status server binding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StatusConfig {
    /// Host to bind to
    #[serde(default = "default_status_host")]
    pub host: String,

    /// Port to listen on (0 picks a free port)
    #[serde(default = "default_status_port")]
    pub port: u16,
}

fn default_status_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_status_port() -> u16 {
    15000
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            host: default_status_host(),
            port: default_status_port(),
        }
    }
}

/// Health probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProbeConfig {
    /// Per-probe deadline
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_probe_timeout_ms() -> u64 {
    1000
}

impl ProbeConfig {
    /// Timeout as a `Duration`.
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_probe_timeout_ms(),
        }
    }
}

/// Reference price source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MarketConfig {
    /// Ticker endpoint
    #[serde(default = "default_market_url")]
    pub url: String,

    /// Symbol passed as the `symbol` query parameter
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Request deadline
    #[serde(default = "default_market_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_market_url() -> String {
    "https://api.binance.com/api/v3/ticker/price".to_string()
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}

const fn default_market_timeout_ms() -> u64 {
    2000
}

impl MarketConfig {
    /// Timeout as a `Duration`.
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            url: default_market_url(),
            symbol: default_symbol(),
            timeout_ms: default_market_timeout_ms(),
        }
    }
}

/// Synthetic balance generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BalanceConfig {
    /// Lower bound (inclusive)
    #[serde(default = "default_balance_min")]
    pub min: f64,

    /// Upper bound (exclusive)
    #[serde(default = "default_balance_max")]
    pub max: f64,

    /// Use this value every cycle instead of drawing one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<f64>,
}

const fn default_balance_min() -> f64 {
    1000.0
}

const fn default_balance_max() -> f64 {
    10_000.0
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            min: default_balance_min(),
            max: default_balance_max(),
            fixed: None,
        }
    }
}

/// Decision oracle endpoint
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OracleConfig {
    /// Chat-completions endpoint
    #[serde(default = "default_oracle_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with every request
    #[serde(default = "default_oracle_model")]
    pub model: String,

    /// Bearer token (set via `QBTC_ORACLE__API_KEY` or `OPENROUTER_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request deadline
    #[serde(default = "default_oracle_timeout_ms")]
    pub timeout_ms: u64,

    /// Handlebars policy prompt overriding the embedded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template_path: Option<PathBuf>,
}

fn default_oracle_endpoint() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_oracle_model() -> String {
    "google/gemini-flash-1.5-8b".to_string()
}

const fn default_oracle_timeout_ms() -> u64 {
    10_000
}

impl OracleConfig {
    /// Timeout as a `Duration`.
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("timeout_ms", &self.timeout_ms)
            .field("prompt_template_path", &self.prompt_template_path)
            .finish()
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_oracle_endpoint(),
            model: default_oracle_model(),
            api_key: None,
            timeout_ms: default_oracle_timeout_ms(),
            prompt_template_path: None,
        }
    }
}

/// Trade execution endpoint and static order defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TradingConfig {
    /// `execute-trade` endpoint
    #[serde(default = "default_trading_url")]
    pub url: String,

    /// Instrument to trade
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Order size
    #[serde(default = "default_trade_size")]
    pub size: f64,

    /// Leverage multiplier
    #[serde(default = "default_leverage")]
    pub leverage: u32,

    /// Request deadline
    #[serde(default = "default_trading_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_trading_url() -> String {
    "http://localhost:14201/execute-trade".to_string()
}

const fn default_trade_size() -> f64 {
    100.0
}

const fn default_leverage() -> u32 {
    10
}

const fn default_trading_timeout_ms() -> u64 {
    5000
}

impl TradingConfig {
    /// Timeout as a `Duration`.
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            url: default_trading_url(),
            symbol: default_symbol(),
            size: default_trade_size(),
            leverage: default_leverage(),
            timeout_ms: default_trading_timeout_ms(),
        }
    }
}

/// Coherence evolution constants.
///
/// The numeric defaults carry over unchanged from the product; they have no
/// documented derivation and should not be retuned without product input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StabilityConfig {
    /// Coherence of a fresh loop
    #[serde(default = "default_initial_coherence")]
    pub initial_coherence: f64,

    /// Lower clamp
    #[serde(default = "default_min_coherence")]
    pub min_coherence: f64,

    /// Upper clamp
    #[serde(default = "default_max_coherence")]
    pub max_coherence: f64,

    /// Confidence strictly above this earns the reward
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Added for a confident decision
    #[serde(default = "default_reward")]
    pub reward: f64,

    /// Subtracted for an unconfident decision
    #[serde(default = "default_penalty")]
    pub penalty: f64,

    /// Subtracted for a cycle that failed outright
    #[serde(default = "default_fatal_penalty")]
    pub fatal_penalty: f64,

    /// `/health` reports `VIVO` strictly above this
    #[serde(default = "default_alive_threshold")]
    pub alive_threshold: f64,

    /// Label `transcendent` strictly above this
    #[serde(default = "default_transcendent_threshold")]
    pub transcendent_threshold: f64,

    /// Label `healthy` strictly above this
    #[serde(default = "default_healthy_threshold")]
    pub healthy_threshold: f64,

    /// Label `degraded` strictly above this, `critical` otherwise
    #[serde(default = "default_degraded_threshold")]
    pub degraded_threshold: f64,
}

const fn default_initial_coherence() -> f64 {
    INITIAL_COHERENCE
}

const fn default_min_coherence() -> f64 {
    0.1
}

const fn default_max_coherence() -> f64 {
    1.0
}

const fn default_confidence_threshold() -> f64 {
    0.8
}

const fn default_reward() -> f64 {
    0.01
}

const fn default_penalty() -> f64 {
    0.005
}

const fn default_fatal_penalty() -> f64 {
    0.01
}

const fn default_alive_threshold() -> f64 {
    0.7
}

const fn default_transcendent_threshold() -> f64 {
    0.8
}

const fn default_healthy_threshold() -> f64 {
    0.6
}

const fn default_degraded_threshold() -> f64 {
    0.4
}

impl StabilityConfig {
    /// Clamp a coherence value into the configured bounds.
    pub fn clamp(&self, coherence: f64) -> f64 {
        coherence.clamp(self.min_coherence, self.max_coherence)
    }

    /// Descriptive label for a coherence value.
    pub fn label(&self, coherence: f64) -> CoherenceLabel {
        if coherence > self.transcendent_threshold {
            CoherenceLabel::Transcendent
        } else if coherence > self.healthy_threshold {
            CoherenceLabel::Healthy
        } else if coherence > self.degraded_threshold {
            CoherenceLabel::Degraded
        } else {
            CoherenceLabel::Critical
        }
    }

    /// Whether `/health` should report the process as alive.
    pub fn is_alive(&self, coherence: f64) -> bool {
        coherence > self.alive_threshold
    }
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            initial_coherence: default_initial_coherence(),
            min_coherence: default_min_coherence(),
            max_coherence: default_max_coherence(),
            confidence_threshold: default_confidence_threshold(),
            reward: default_reward(),
            penalty: default_penalty(),
            fatal_penalty: default_fatal_penalty(),
            alive_threshold: default_alive_threshold(),
            transcendent_threshold: default_transcendent_threshold(),
            healthy_threshold: default_healthy_threshold(),
            degraded_threshold: default_degraded_threshold(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable multi-line output
    Pretty,
}

/// File log rotation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// New file every day
    #[default]
    Daily,
    /// New file every hour
    Hourly,
    /// Single file
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Stdout format
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for rolling JSON log files (stdout only when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Enable stdout logging
    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// File rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

const fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_stdout: true,
            rotation: RotationPolicy::default(),
        }
    }
}
