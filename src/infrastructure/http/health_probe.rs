use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::debug;

use super::classify;
use crate::domain::models::{ServiceEndpoint, ServiceHealth};
use crate::domain::ports::HealthProbe;

/// Health probe issuing `GET <service>/health` with a bounded timeout
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    http_client: ReqwestClient,
    timeout: Duration,
}

impl HttpHealthProbe {
    /// Create a probe sharing `http_client`, giving each ping `timeout`.
    pub const fn new(http_client: ReqwestClient, timeout: Duration) -> Self {
        Self {
            http_client,
            timeout,
        }
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn ping(&self, service: &ServiceEndpoint) -> ServiceHealth {
        let result = self
            .http_client
            .get(service.health_url())
            .timeout(self.timeout)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => ServiceHealth::Ok,
            Ok(response) => {
                debug!(
                    service = %service.name,
                    status = response.status().as_u16(),
                    "Health check returned non-success status"
                );
                ServiceHealth::Fail
            }
            Err(err) => {
                let err = classify(&err, self.timeout);
                debug!(service = %service.name, error = %err, "Health check failed");
                if err.is_timeout() {
                    ServiceHealth::Timeout
                } else {
                    ServiceHealth::Fail
                }
            }
        }
    }
}
