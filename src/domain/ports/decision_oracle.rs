use crate::domain::models::{Decision, Observation};
use async_trait::async_trait;

/// Port for the external decision oracle
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    /// Propose a decision for `observation` given the current coherence.
    ///
    /// Always returns a valid decision; failures yield
    /// [`Decision::fallback`](crate::domain::models::Decision::fallback).
    async fn decide(&self, observation: &Observation, coherence: f64) -> Decision;
}
