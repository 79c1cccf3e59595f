//! Coherence evolution.
//!
//! Coherence rises by `reward` after a confident decision and decays by
//! `penalty` otherwise, always staying within the configured bounds.

use tracing::{debug, warn};

use crate::domain::models::{CoherenceLabel, Decision, FallbackCause, LoopState, StabilityConfig};

/// Applies the per-cycle coherence update.
#[derive(Debug, Clone, Default)]
pub struct StabilityEvolver {
    config: StabilityConfig,
}

impl StabilityEvolver {
    /// Create an evolver with the given constants.
    pub const fn new(config: StabilityConfig) -> Self {
        Self { config }
    }

    /// Constants in use.
    pub const fn config(&self) -> &StabilityConfig {
        &self.config
    }

    /// Fresh loop state at the configured initial coherence.
    pub fn initial_state(&self) -> LoopState {
        LoopState::new(self.config.clamp(self.config.initial_coherence))
    }

    /// State after a completed cycle that produced `decision`.
    pub fn evolve(&self, state: &LoopState, decision: &Decision) -> LoopState {
        let delta = if decision.confidence > self.config.confidence_threshold {
            self.config.reward
        } else {
            -self.config.penalty
        };
        let coherence = self.config.clamp(state.coherence + delta);

        debug!(
            previous = state.coherence,
            coherence,
            delta,
            label = %self.label(coherence),
            "Coherence evolved"
        );

        LoopState {
            coherence,
            cycle_count: state.cycle_count + 1,
            last_decision: Some(decision.clone()),
            ..state.clone()
        }
    }

    /// State after a cycle that ended on the fatal path.
    ///
    /// The cycle still counts. A loop that has never completed a cycle
    /// records the error fallback as its last decision.
    pub fn penalize(&self, state: &LoopState) -> LoopState {
        let coherence = self.config.clamp(state.coherence - self.config.fatal_penalty);

        warn!(
            previous = state.coherence,
            coherence,
            failed_cycles = state.failed_cycles + 1,
            "Coherence penalized after failed cycle"
        );

        LoopState {
            coherence,
            cycle_count: state.cycle_count + 1,
            failed_cycles: state.failed_cycles + 1,
            last_decision: state
                .last_decision
                .clone()
                .or_else(|| Some(Decision::fallback(FallbackCause::Error))),
            started_at: state.started_at,
        }
    }

    /// Qualitative label for `coherence`.
    pub fn label(&self, coherence: f64) -> CoherenceLabel {
        self.config.label(coherence)
    }
}
