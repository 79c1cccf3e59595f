//! Long-lived state of the control loop.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::decision::Decision;

/// Coherence assigned to a freshly started loop.
pub const INITIAL_COHERENCE: f64 = 0.888;

/// State carried across cycles.
///
/// The control loop is the only writer. Readers receive clones through a
/// `tokio::sync::watch` channel and never observe a half-applied cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopState {
    /// Bounded stability score.
    pub coherence: f64,
    /// Completed cycles, including failed ones.
    pub cycle_count: u64,
    /// Cycles that ended on the fatal path.
    pub failed_cycles: u64,
    /// Decision of the most recent cycle; `None` only before the first cycle.
    pub last_decision: Option<Decision>,
    /// When the loop was created.
    pub started_at: DateTime<Utc>,
}

impl LoopState {
    /// Fresh state with the given starting coherence.
    pub fn new(initial_coherence: f64) -> Self {
        Self {
            coherence: initial_coherence,
            cycle_count: 0,
            failed_cycles: 0,
            last_decision: None,
            started_at: Utc::now(),
        }
    }

    /// Seconds elapsed since the loop was created.
    #[allow(clippy::cast_precision_loss)]
    pub fn uptime_seconds(&self) -> f64 {
        let elapsed = Utc::now().signed_duration_since(self.started_at);
        (elapsed.num_milliseconds().max(0) as f64) / 1000.0
    }
}

impl Default for LoopState {
    fn default() -> Self {
        Self::new(INITIAL_COHERENCE)
    }
}

/// Qualitative reading of a coherence value. Descriptive only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoherenceLabel {
    /// Above the transcendent threshold.
    Transcendent,
    /// Above the healthy threshold.
    Healthy,
    /// Above the degraded threshold.
    Degraded,
    /// Everything else.
    Critical,
}

impl fmt::Display for CoherenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Transcendent => "transcendent",
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Critical => "critical",
        })
    }
}

/// Phases of the control loop state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    /// Created, no cycle started yet.
    Idle,
    /// Collecting the observation.
    Observing,
    /// Waiting on the decision oracle.
    Deciding,
    /// Dispatching the decision.
    Acting,
    /// Updating coherence.
    Evolving,
    /// Waiting out the cycle interval.
    Sleeping,
    /// Terminal.
    Stopped,
}

impl LoopPhase {
    /// Whether the state machine may move from `self` to `next`.
    ///
    /// Any live phase may stop. The fatal-cycle path bypasses this table and
    /// jumps straight to `Evolving` to apply the penalty.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle | Self::Sleeping, Self::Observing)
                | (Self::Observing, Self::Deciding)
                | (Self::Deciding, Self::Acting)
                | (Self::Acting, Self::Evolving)
                | (Self::Evolving, Self::Sleeping)
                | (
                    Self::Idle
                        | Self::Observing
                        | Self::Deciding
                        | Self::Acting
                        | Self::Evolving
                        | Self::Sleeping,
                    Self::Stopped
                )
        )
    }
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Observing => "observing",
            Self::Deciding => "deciding",
            Self::Acting => "acting",
            Self::Evolving => "evolving",
            Self::Sleeping => "sleeping",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = LoopState::default();
        assert!((state.coherence - 0.888).abs() < f64::EPSILON);
        assert_eq!(state.cycle_count, 0);
        assert_eq!(state.failed_cycles, 0);
        assert!(state.last_decision.is_none());
        assert!(state.uptime_seconds() >= 0.0);
    }

    #[test]
    fn test_cycle_order_transitions() {
        use LoopPhase::{Acting, Deciding, Evolving, Idle, Observing, Sleeping};
        let order = [Idle, Observing, Deciding, Acting, Evolving, Sleeping, Observing];
        for pair in order.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_out_of_order_transitions_rejected() {
        assert!(!LoopPhase::Observing.can_transition_to(LoopPhase::Acting));
        assert!(!LoopPhase::Deciding.can_transition_to(LoopPhase::Observing));
        assert!(!LoopPhase::Evolving.can_transition_to(LoopPhase::Observing));
        assert!(!LoopPhase::Sleeping.can_transition_to(LoopPhase::Deciding));
        assert!(!LoopPhase::Stopped.can_transition_to(LoopPhase::Observing));
        assert!(!LoopPhase::Stopped.can_transition_to(LoopPhase::Stopped));
    }

    #[test]
    fn test_any_live_phase_can_stop() {
        for phase in [
            LoopPhase::Idle,
            LoopPhase::Observing,
            LoopPhase::Deciding,
            LoopPhase::Acting,
            LoopPhase::Evolving,
            LoopPhase::Sleeping,
        ] {
            assert!(phase.can_transition_to(LoopPhase::Stopped));
        }
    }
}
