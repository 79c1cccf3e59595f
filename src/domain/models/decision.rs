//! Trading decisions proposed by the decision oracle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Confidence attached to every fallback decision.
pub const FALLBACK_CONFIDENCE: f64 = 0.1;

/// Action the supervisor can take in response to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Open a long position through the trade-execution service.
    Buy,
    /// Open a short position through the trade-execution service.
    Sell,
    /// Keep the current position.
    Hold,
    /// Internal tuning bookkeeping.
    Optimize,
    /// Re-probe services and report the unhealthy ones.
    Heal,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Self; 5] = [Self::Buy, Self::Sell, Self::Hold, Self::Optimize, Self::Heal];

    /// Wire representation of the action.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
            Self::Optimize => "OPTIMIZE",
            Self::Heal => "HEAL",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| s.to_string())
    }
}

/// Why a decision had to fall back to `HOLD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackCause {
    /// The oracle could not be reached or did not answer in time.
    Network,
    /// The oracle answered, but the answer was unusable.
    Error,
}

impl FallbackCause {
    /// Tag recorded as the fallback decision's reason.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Network => "network_error",
            Self::Error => "error",
        }
    }
}

/// A validated trading decision.
///
/// Confidence is always within `[0, 1]`; the oracle client guarantees this by
/// validating every response and substituting [`Decision::fallback`] otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Action to dispatch.
    pub action: Action,
    /// Free-form justification from the oracle, or a fallback cause tag.
    pub reason: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Decision {
    /// Build a decision, clamping confidence into `[0, 1]`.
    pub fn new(action: Action, reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            action,
            reason: reason.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Safe default used whenever the oracle cannot produce a decision.
    pub fn fallback(cause: FallbackCause) -> Self {
        Self::new(Action::Hold, cause.tag(), FALLBACK_CONFIDENCE)
    }

    /// Whether this decision is one of the fallback decisions.
    pub fn is_fallback(&self) -> bool {
        self.action == Action::Hold
            && (self.reason == FallbackCause::Network.tag()
                || self.reason == FallbackCause::Error.tag())
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} (confidence: {:.2})",
            self.action, self.reason, self.confidence
        )
    }
}
