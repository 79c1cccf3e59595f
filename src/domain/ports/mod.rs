//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - HealthProbe: liveness check of one backend service
//! - PriceSource: reference market price
//! - DecisionOracle: trading decision from an external inference endpoint
//! - TradeExecutor: order submission to the trade-execution service
//!
//! These traits let the control loop be driven by in-memory fakes in tests.

pub mod decision_oracle;
pub mod health_probe;
pub mod price_source;
pub mod trade_executor;

pub use decision_oracle::DecisionOracle;
pub use health_probe::HealthProbe;
pub use price_source::PriceSource;
pub use trade_executor::TradeExecutor;
