//! Per-cycle observation assembly.
//!
//! Fans out a health probe for every configured service alongside the
//! reference price fetch and folds the results into one [`Observation`].

use chrono::Utc;
use futures::future::join_all;
use rand::Rng;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::models::{BalanceConfig, Observation, ServiceEndpoint, ServiceHealth};
use crate::domain::ports::{HealthProbe, PriceSource};

/// Source of the synthetic account balance reported to the oracle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyntheticBalance {
    /// Same value every cycle.
    Fixed(f64),
    /// Uniform draw from `[min, max)`.
    Uniform {
        /// Inclusive lower bound.
        min: f64,
        /// Exclusive upper bound.
        max: f64,
    },
}

impl SyntheticBalance {
    /// Produce the balance for one cycle.
    pub fn sample(&self) -> f64 {
        match *self {
            Self::Fixed(value) => value,
            Self::Uniform { min, max } if min < max => rand::rng().random_range(min..max),
            Self::Uniform { min, .. } => min,
        }
    }
}

impl From<&BalanceConfig> for SyntheticBalance {
    fn from(config: &BalanceConfig) -> Self {
        config.fixed.map_or(
            Self::Uniform {
                min: config.min,
                max: config.max,
            },
            Self::Fixed,
        )
    }
}

/// Collects one [`Observation`] per cycle.
pub struct ObservationCollector {
    probe: Arc<dyn HealthProbe>,
    price_source: Arc<dyn PriceSource>,
    services: Vec<ServiceEndpoint>,
    balance: SyntheticBalance,
}

impl ObservationCollector {
    /// Create a collector over `services`.
    pub fn new(
        probe: Arc<dyn HealthProbe>,
        price_source: Arc<dyn PriceSource>,
        services: Vec<ServiceEndpoint>,
        balance: SyntheticBalance,
    ) -> Self {
        Self {
            probe,
            price_source,
            services,
            balance,
        }
    }

    /// Services this collector probes.
    pub fn services(&self) -> &[ServiceEndpoint] {
        &self.services
    }

    /// Probe every service concurrently, without the price fetch.
    pub async fn probe_all(&self) -> Vec<(String, ServiceHealth)> {
        let probes = self.services.iter().map(|service| async move {
            (service.name.clone(), self.probe.ping(service).await)
        });
        join_all(probes).await
    }

    /// Assemble the observation for the current cycle.
    ///
    /// Every probe and the price fetch run concurrently, each bounded by its
    /// own timeout; this returns once all of them have resolved.
    #[instrument(skip(self), fields(services = self.services.len()))]
    pub async fn collect(&self) -> Observation {
        let (health, reference_price) = tokio::join!(self.probe_all(), self.price_source.fetch());

        let observation = Observation {
            services: health.into_iter().collect(),
            reference_price,
            synthetic_balance: self.balance.sample(),
            timestamp: Utc::now(),
        };

        info!(
            price = ?observation.reference_price,
            balance = format!("{:.2}", observation.synthetic_balance),
            services_ok = observation.healthy_count(),
            services_total = observation.total(),
            "Observation collected: {}/{} services OK",
            observation.healthy_count(),
            observation.total()
        );

        observation
    }
}
