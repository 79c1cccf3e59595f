//! Per-cycle observation of the supervised system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Result of a single health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceHealth {
    /// The service answered with a 2xx status within the deadline.
    Ok,
    /// Connection refused, DNS failure, non-2xx status, or any other error.
    Fail,
    /// The deadline elapsed before an answer arrived.
    Timeout,
}

impl ServiceHealth {
    /// Whether the service is considered healthy.
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ServiceHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "OK",
            Self::Fail => "FAIL",
            Self::Timeout => "TIMEOUT",
        })
    }
}

/// A monitored backend service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// Unique service name used in logs and observations.
    pub name: String,
    /// Base URL, e.g. `http://localhost:3003`.
    pub url: String,
}

impl ServiceEndpoint {
    /// Create an endpoint description.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// URL of the service's liveness endpoint.
    pub fn health_url(&self) -> String {
        format!("{}/health", self.url.trim_end_matches('/'))
    }
}

/// Immutable snapshot assembled once per cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Health per service name.
    pub services: BTreeMap<String, ServiceHealth>,
    /// Reference market price, absent when the quote could not be fetched.
    pub reference_price: Option<f64>,
    /// Locally computed, non-authoritative balance figure.
    pub synthetic_balance: f64,
    /// When the observation was assembled.
    pub timestamp: DateTime<Utc>,
}

impl Observation {
    /// Number of services reporting `OK`.
    pub fn healthy_count(&self) -> usize {
        self.services.values().filter(|h| h.is_ok()).count()
    }

    /// Number of probed services.
    pub fn total(&self) -> usize {
        self.services.len()
    }

    /// Names of services not reporting `OK`, in name order.
    pub fn unhealthy(&self) -> Vec<String> {
        self.services
            .iter()
            .filter(|(_, health)| !health.is_ok())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(services: &[(&str, ServiceHealth)]) -> Observation {
        Observation {
            services: services
                .iter()
                .map(|(name, health)| ((*name).to_string(), *health))
                .collect(),
            reference_price: Some(64_000.0),
            synthetic_balance: 5_000.0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_counts() {
        let obs = observation(&[
            ("leonardo", ServiceHealth::Ok),
            ("quantum", ServiceHealth::Fail),
            ("risk", ServiceHealth::Timeout),
            ("trading", ServiceHealth::Ok),
        ]);
        assert_eq!(obs.healthy_count(), 2);
        assert_eq!(obs.total(), 4);
        assert_eq!(obs.unhealthy(), vec!["quantum", "risk"]);
    }

    #[test]
    fn test_health_url_trims_trailing_slash() {
        let endpoint = ServiceEndpoint::new("admin", "http://localhost:8888/");
        assert_eq!(endpoint.health_url(), "http://localhost:8888/health");
    }

    #[test]
    fn test_service_health_serialization() {
        let obs = observation(&[("risk", ServiceHealth::Timeout)]);
        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["services"]["risk"], "TIMEOUT");
        assert_eq!(json["reference_price"], 64_000.0);
    }
}
