//! Error taxonomy of the supervisor.
//!
//! Every variant here is recovered locally by the component that produces it;
//! none of them terminates the process.

use std::time::Duration;
use thiserror::Error;

use crate::domain::models::{FallbackCause, LoopPhase};

/// Transport-level failure of an outbound call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl NetworkError {
    /// Whether the failure was a deadline expiry.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Why an oracle response could not be turned into a decision.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OracleParseError {
    #[error("Response envelope is malformed: {0}")]
    MalformedEnvelope(String),

    #[error("Response contains no choices")]
    EmptyChoices,

    #[error("No JSON object found in response")]
    NoJsonObject,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Decision is not a JSON object")]
    NotAnObject,

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Reason must be a non-empty string")]
    EmptyReason,

    #[error("Invalid confidence: {0}")]
    InvalidConfidence(String),

    #[error("Confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),
}

/// Failure of a decision oracle call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OracleError {
    #[error("Oracle unreachable: {0}")]
    Network(#[from] NetworkError),

    #[error("Oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Oracle response unusable: {0}")]
    Parse(#[from] OracleParseError),

    #[error("Prompt rendering failed: {0}")]
    Prompt(String),
}

impl OracleError {
    /// Cause tag recorded in the fallback decision.
    pub const fn cause(&self) -> FallbackCause {
        match self {
            Self::Network(_) => FallbackCause::Network,
            Self::Status { .. } | Self::Parse(_) | Self::Prompt(_) => FallbackCause::Error,
        }
    }
}

/// Failure of a trade-execution call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TradeDispatchError {
    #[error("Trade service unreachable: {0}")]
    Network(#[from] NetworkError),

    #[error("Trade service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Trade service response malformed: {0}")]
    MalformedResponse(String),
}

impl TradeDispatchError {
    /// Whether the service could not be reached at all.
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// A failure that escaped every component-level guard within a cycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoopFatalError {
    #[error("Cycle panicked: {0}")]
    Panicked(String),

    #[error("Cycle exceeded its {0:?} budget")]
    CycleTimeout(Duration),

    #[error("Invalid phase transition from {from} to {to}")]
    InvalidTransition { from: LoopPhase, to: LoopPhase },
}
