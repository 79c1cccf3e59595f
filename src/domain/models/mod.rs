//! Domain models for the supervisory control loop.

pub mod config;
pub mod decision;
pub mod loop_state;
pub mod observation;
pub mod trade;

pub use config::{
    BalanceConfig, Config, LogFormat, LoggingConfig, LoopConfig, MarketConfig, OracleConfig,
    ProbeConfig, RotationPolicy, StabilityConfig, StatusConfig, TradingConfig,
};
pub use decision::{Action, Decision, FallbackCause, FALLBACK_CONFIDENCE};
pub use loop_state::{CoherenceLabel, LoopPhase, LoopState, INITIAL_COHERENCE};
pub use observation::{Observation, ServiceEndpoint, ServiceHealth};
pub use trade::{TradeId, TradeReceipt, TradeRequest, TradeSide};
