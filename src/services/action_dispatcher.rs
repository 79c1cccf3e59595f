//! Maps decisions onto their side effects.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::observation_collector::ObservationCollector;
use crate::domain::errors::TradeDispatchError;
use crate::domain::models::{
    Action, Decision, TradeReceipt, TradeRequest, TradeSide, TradingConfig,
};
use crate::domain::ports::TradeExecutor;

/// What dispatching a decision did. Informational; the loop only logs it.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The execution service accepted the order.
    Traded(TradeReceipt),
    /// The order could not be placed.
    TradeFailed(TradeDispatchError),
    /// Optimization bookkeeping ran; `total` counts every optimization so far.
    Optimized {
        /// Optimizations performed since start.
        total: u64,
    },
    /// Services were re-probed; these are the ones not reporting `OK`.
    Healed {
        /// Names of the unhealthy services.
        unhealthy: Vec<String>,
    },
    /// Nothing to do.
    Held,
}

/// Order parameters applied to every `BUY`/`SELL`.
#[derive(Debug, Clone)]
pub struct TradeDefaults {
    /// Instrument.
    pub symbol: String,
    /// Position size.
    pub size: f64,
    /// Leverage multiplier.
    pub leverage: u32,
}

impl From<&TradingConfig> for TradeDefaults {
    fn from(config: &TradingConfig) -> Self {
        Self {
            symbol: config.symbol.clone(),
            size: config.size,
            leverage: config.leverage,
        }
    }
}

impl TradeDefaults {
    fn request(&self, side: TradeSide) -> TradeRequest {
        TradeRequest {
            symbol: self.symbol.clone(),
            side,
            size: self.size,
            leverage: self.leverage,
        }
    }
}

/// Executes the action carried by a [`Decision`].
///
/// Every branch absorbs its own failures; `execute` never fails.
pub struct ActionDispatcher {
    executor: Arc<dyn TradeExecutor>,
    collector: Arc<ObservationCollector>,
    defaults: TradeDefaults,
    optimizations: AtomicU64,
}

impl ActionDispatcher {
    /// Create a dispatcher. `HEAL` re-probes the services known to `collector`.
    pub fn new(
        executor: Arc<dyn TradeExecutor>,
        collector: Arc<ObservationCollector>,
        defaults: TradeDefaults,
    ) -> Self {
        Self {
            executor,
            collector,
            defaults,
            optimizations: AtomicU64::new(0),
        }
    }

    /// Number of `OPTIMIZE` decisions handled so far.
    pub fn optimizations(&self) -> u64 {
        self.optimizations.load(Ordering::Relaxed)
    }

    /// Dispatch `decision` to its handler.
    #[instrument(skip_all, fields(action = %decision.action))]
    pub async fn execute(&self, decision: &Decision) -> DispatchOutcome {
        match decision.action {
            Action::Buy => self.trade(TradeSide::Buy).await,
            Action::Sell => self.trade(TradeSide::Sell).await,
            Action::Optimize => self.optimize(),
            Action::Heal => self.heal().await,
            Action::Hold => {
                info!(reason = %decision.reason, "Holding position");
                DispatchOutcome::Held
            }
        }
    }

    async fn trade(&self, side: TradeSide) -> DispatchOutcome {
        let request = self.defaults.request(side);
        match self.executor.execute_trade(&request).await {
            Ok(receipt) => {
                info!(
                    side = %side,
                    symbol = %request.symbol,
                    trade_id = %receipt.trade_id,
                    expected_profit = receipt.expected_profit,
                    "Trade executed"
                );
                DispatchOutcome::Traded(receipt)
            }
            Err(err) => {
                warn!(
                    side = %side,
                    symbol = %request.symbol,
                    network = err.is_network(),
                    error = %err,
                    "Trade dispatch failed"
                );
                DispatchOutcome::TradeFailed(err)
            }
        }
    }

    fn optimize(&self) -> DispatchOutcome {
        let total = self.optimizations.fetch_add(1, Ordering::Relaxed) + 1;
        info!(total, "Optimization pass recorded");
        DispatchOutcome::Optimized { total }
    }

    async fn heal(&self) -> DispatchOutcome {
        let unhealthy: Vec<String> = self
            .collector
            .probe_all()
            .await
            .into_iter()
            .filter(|(_, health)| !health.is_ok())
            .map(|(name, _)| name)
            .collect();

        if unhealthy.is_empty() {
            info!("Heal requested, all services healthy");
        } else {
            warn!(
                services = ?unhealthy,
                count = unhealthy.len(),
                "Services require restart"
            );
        }
        DispatchOutcome::Healed { unhealthy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::NetworkError;
    use crate::domain::models::{ServiceEndpoint, ServiceHealth, TradeId};
    use crate::domain::ports::{HealthProbe, PriceSource};
    use crate::services::observation_collector::SyntheticBalance;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingExecutor {
        requests: Mutex<Vec<TradeRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl TradeExecutor for RecordingExecutor {
        async fn execute_trade(
            &self,
            request: &TradeRequest,
        ) -> Result<TradeReceipt, TradeDispatchError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(NetworkError::Timeout(Duration::from_secs(5)).into());
            }
            Ok(TradeReceipt {
                trade_id: TradeId::Text("t-1".to_string()),
                expected_profit: 12.5,
            })
        }
    }

    struct NamedProbe;

    #[async_trait]
    impl HealthProbe for NamedProbe {
        async fn ping(&self, service: &ServiceEndpoint) -> ServiceHealth {
            if service.name.starts_with("ok") {
                ServiceHealth::Ok
            } else {
                ServiceHealth::Fail
            }
        }
    }

    struct NoPrice;

    #[async_trait]
    impl PriceSource for NoPrice {
        async fn fetch(&self) -> Option<f64> {
            None
        }
    }

    fn dispatcher(executor: Arc<RecordingExecutor>, names: &[&str]) -> ActionDispatcher {
        let services = names
            .iter()
            .map(|name| ServiceEndpoint::new(*name, format!("http://{name}")))
            .collect();
        let collector = ObservationCollector::new(
            Arc::new(NamedProbe),
            Arc::new(NoPrice),
            services,
            SyntheticBalance::Fixed(1000.0),
        );
        ActionDispatcher::new(
            executor,
            Arc::new(collector),
            TradeDefaults::from(&TradingConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_buy_uses_configured_defaults() {
        let executor = Arc::new(RecordingExecutor::default());
        let dispatcher = dispatcher(executor.clone(), &["ok-a"]);

        let outcome = dispatcher
            .execute(&Decision::new(Action::Buy, "edge", 0.9))
            .await;

        assert!(matches!(outcome, DispatchOutcome::Traded(_)));
        let requests = executor.requests.lock().unwrap();
        assert_eq!(
            requests.as_slice(),
            &[TradeRequest {
                symbol: "BTCUSDT".to_string(),
                side: TradeSide::Buy,
                size: 100.0,
                leverage: 10,
            }]
        );
    }

    #[tokio::test]
    async fn test_trade_failure_is_reported() {
        let executor = Arc::new(RecordingExecutor {
            fail: true,
            ..Default::default()
        });
        let dispatcher = dispatcher(executor, &["ok-a"]);

        let outcome = dispatcher
            .execute(&Decision::new(Action::Sell, "risk", 0.9))
            .await;

        match outcome {
            DispatchOutcome::TradeFailed(err) => assert!(err.is_network()),
            other => panic!("expected TradeFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_heal_reports_unhealthy_services() {
        let executor = Arc::new(RecordingExecutor::default());
        let dispatcher = dispatcher(executor.clone(), &["ok-a", "risk", "ok-b", "admin"]);

        let outcome = dispatcher
            .execute(&Decision::new(Action::Heal, "degraded", 0.7))
            .await;

        match outcome {
            DispatchOutcome::Healed { unhealthy } => {
                assert_eq!(unhealthy, vec!["risk".to_string(), "admin".to_string()]);
            }
            other => panic!("expected Healed, got {other:?}"),
        }
        assert!(executor.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_optimize_counts() {
        let dispatcher = dispatcher(Arc::new(RecordingExecutor::default()), &["ok-a"]);
        let decision = Decision::new(Action::Optimize, "tune", 0.5);

        dispatcher.execute(&decision).await;
        let outcome = dispatcher.execute(&decision).await;

        assert!(matches!(outcome, DispatchOutcome::Optimized { total: 2 }));
        assert_eq!(dispatcher.optimizations(), 2);
    }

    #[tokio::test]
    async fn test_hold_is_noop() {
        let executor = Arc::new(RecordingExecutor::default());
        let dispatcher = dispatcher(executor.clone(), &["ok-a"]);

        let outcome = dispatcher
            .execute(&Decision::new(Action::Hold, "wait", 0.3))
            .await;

        assert!(matches!(outcome, DispatchOutcome::Held));
        assert!(executor.requests.lock().unwrap().is_empty());
    }
}
