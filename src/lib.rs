//! QBTC Supervisor - supervisory control loop
//!
//! Repeatedly probes a set of backend services, fetches a reference price,
//! asks an external decision oracle what to do, dispatches the resulting
//! action, and tracks a bounded stability score ("coherence"), while serving
//! its own `/health` and `/metrics` endpoints.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, error taxonomy, and port traits
//! - **Service Layer** (`services`): Observation, dispatch, coherence, parsing
//! - **Application Layer** (`application`): Control loop and process bootstrap
//! - **Infrastructure Layer** (`infrastructure`): HTTP clients, oracle, config, logging
//! - **Adapters** (`adapters`): Status HTTP server
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use qbtc_supervisor::{ConfigLoader, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let mut handle = Supervisor::start(&config).await?;
//!     tokio::signal::ctrl_c().await?;
//!     let state = handle.stop().await?;
//!     println!("stopped after {} cycles", state.cycle_count);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::{HealthResponse, StatusHttpServer};
pub use application::{ControlLoop, Supervisor, SupervisorHandle};
pub use domain::errors::{
    LoopFatalError, NetworkError, OracleError, OracleParseError, TradeDispatchError,
};
pub use domain::models::{
    Action, Config, Decision, LoopState, Observation, ServiceEndpoint, ServiceHealth,
};
pub use domain::ports::{DecisionOracle, HealthProbe, PriceSource, TradeExecutor};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ActionDispatcher, DispatchOutcome, ObservationCollector, StabilityEvolver};
