//! Control loop scheduler.
//!
//! Drives one cycle at a time through
//! `Observing -> Deciding -> Acting -> Evolving -> Sleeping`:
//! - Per-cycle failure isolation (panic, cycle timeout, invalid transition)
//! - Fixed pacing between cycles, interruptible by cancellation
//! - Snapshot publication of [`LoopState`] through a `watch` channel

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::domain::errors::LoopFatalError;
use crate::domain::models::{Decision, LoopConfig, LoopPhase, LoopState};
use crate::domain::ports::DecisionOracle;
use crate::services::{ActionDispatcher, ObservationCollector, StabilityEvolver};

/// The supervisory control loop.
///
/// Sole owner and writer of [`LoopState`]. Readers call [`ControlLoop::subscribe`]
/// and only ever see the state as it stood at the end of a cycle.
pub struct ControlLoop {
    collector: Arc<ObservationCollector>,
    oracle: Arc<dyn DecisionOracle>,
    dispatcher: Arc<ActionDispatcher>,
    evolver: StabilityEvolver,
    interval: Duration,
    cycle_timeout: Duration,
    max_cycles: Option<u64>,
    phase: LoopPhase,
    state: LoopState,
    state_tx: watch::Sender<LoopState>,
}

impl ControlLoop {
    /// Create a loop in the `Idle` phase at the evolver's initial coherence.
    pub fn new(
        collector: Arc<ObservationCollector>,
        oracle: Arc<dyn DecisionOracle>,
        dispatcher: Arc<ActionDispatcher>,
        evolver: StabilityEvolver,
        config: &LoopConfig,
    ) -> Self {
        let state = evolver.initial_state();
        let (state_tx, _) = watch::channel(state.clone());

        Self {
            collector,
            oracle,
            dispatcher,
            evolver,
            interval: config.interval(),
            cycle_timeout: config.cycle_timeout(),
            max_cycles: config.max_cycles,
            phase: LoopPhase::Idle,
            state,
            state_tx,
        }
    }

    /// Read-only handle on the published state.
    pub fn subscribe(&self) -> watch::Receiver<LoopState> {
        self.state_tx.subscribe()
    }

    /// Current state.
    pub const fn state(&self) -> &LoopState {
        &self.state
    }

    /// Current phase.
    pub const fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Run cycles until `cancel` fires or `max_cycles` is reached.
    ///
    /// Returns the final state. An in-flight cycle interrupted by cancellation
    /// is abandoned without publishing anything.
    pub async fn run(mut self, cancel: CancellationToken) -> LoopState {
        info!(
            interval = ?self.interval,
            max_cycles = ?self.max_cycles,
            coherence = self.state.coherence,
            "Control loop started"
        );

        loop {
            select! {
                biased;
                () = cancel.cancelled() => {
                    info!(cycle = self.state.cycle_count + 1, "Stop requested during cycle");
                    break;
                }
                () = self.run_cycle() => {}
            }

            if self
                .max_cycles
                .is_some_and(|max| self.state.cycle_count >= max)
            {
                info!(cycles = self.state.cycle_count, "Cycle limit reached");
                break;
            }

            select! {
                biased;
                () = cancel.cancelled() => break,
                () = sleep(self.interval) => {}
            }
        }

        self.phase = LoopPhase::Stopped;
        info!(
            cycles = self.state.cycle_count,
            failed_cycles = self.state.failed_cycles,
            coherence = self.state.coherence,
            uptime_seconds = self.state.uptime_seconds(),
            "Control loop stopped"
        );
        self.state
    }

    /// Run exactly one cycle, absorbing any failure into a penalty.
    ///
    /// Leaves the loop in `Sleeping` with the new state published.
    #[instrument(skip(self), fields(cycle = self.state.cycle_count + 1))]
    pub async fn run_cycle(&mut self) {
        let budget = self.cycle_timeout;
        let result = match timeout(budget, AssertUnwindSafe(self.cycle()).catch_unwind()).await {
            Ok(Ok(result)) => result,
            Ok(Err(payload)) => Err(LoopFatalError::Panicked(panic_message(payload.as_ref()))),
            Err(_) => Err(LoopFatalError::CycleTimeout(budget)),
        };

        self.state = match result {
            Ok(decision) => self.evolver.evolve(&self.state, &decision),
            Err(err) => {
                error!(error = %err, phase = %self.phase, "Cycle failed");
                self.phase = LoopPhase::Evolving;
                self.evolver.penalize(&self.state)
            }
        };
        self.state_tx.send_replace(self.state.clone());

        info!(
            cycle = self.state.cycle_count,
            coherence = format!("{:.3}", self.state.coherence),
            label = %self.evolver.label(self.state.coherence),
            "Cycle complete"
        );

        // Evolving -> Sleeping is always legal here.
        self.phase = LoopPhase::Sleeping;
    }

    async fn cycle(&mut self) -> Result<Decision, LoopFatalError> {
        self.transition(LoopPhase::Observing)?;
        let observation = self.collector.collect().await;

        self.transition(LoopPhase::Deciding)?;
        let decision = self.oracle.decide(&observation, self.state.coherence).await;

        self.transition(LoopPhase::Acting)?;
        let outcome = self.dispatcher.execute(&decision).await;
        debug!(?outcome, "Action dispatched");

        self.transition(LoopPhase::Evolving)?;
        Ok(decision)
    }

    fn transition(&mut self, next: LoopPhase) -> Result<(), LoopFatalError> {
        if !self.phase.can_transition_to(next) {
            return Err(LoopFatalError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        debug!(from = %self.phase, to = %next, "Phase transition");
        self.phase = next;
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
