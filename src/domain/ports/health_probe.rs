use crate::domain::models::{ServiceEndpoint, ServiceHealth};
use async_trait::async_trait;

/// Port for single-service liveness checks
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Probe `service` once.
    ///
    /// Never fails: every error path resolves to [`ServiceHealth::Fail`] or
    /// [`ServiceHealth::Timeout`]. Implementations do not retry.
    async fn ping(&self, service: &ServiceEndpoint) -> ServiceHealth;
}
