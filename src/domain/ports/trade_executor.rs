use crate::domain::errors::TradeDispatchError;
use crate::domain::models::{TradeReceipt, TradeRequest};
use async_trait::async_trait;

/// Port for the trade-execution service
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    /// Submit one order. No retries.
    async fn execute_trade(&self, request: &TradeRequest)
        -> Result<TradeReceipt, TradeDispatchError>;
}
