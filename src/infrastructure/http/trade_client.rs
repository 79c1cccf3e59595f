use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;

use super::{classify, excerpt};
use crate::domain::errors::TradeDispatchError;
use crate::domain::models::{TradeReceipt, TradeRequest, TradingConfig};
use crate::domain::ports::TradeExecutor;

/// Client for `POST /execute-trade` on the trade-execution service
#[derive(Debug, Clone)]
pub struct HttpTradeExecutor {
    http_client: ReqwestClient,
    url: String,
    timeout: Duration,
}

impl HttpTradeExecutor {
    /// Create a client from the trading configuration.
    pub fn new(http_client: ReqwestClient, config: &TradingConfig) -> Self {
        Self {
            http_client,
            url: config.url.clone(),
            timeout: config.timeout(),
        }
    }
}

#[async_trait]
impl TradeExecutor for HttpTradeExecutor {
    async fn execute_trade(
        &self,
        request: &TradeRequest,
    ) -> Result<TradeReceipt, TradeDispatchError> {
        let response = self
            .http_client
            .post(&self.url)
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| classify(&err, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| classify(&err, self.timeout))?;

        if !status.is_success() {
            return Err(TradeDispatchError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        serde_json::from_str::<TradeReceipt>(&body)
            .map_err(|err| TradeDispatchError::MalformedResponse(err.to_string()))
    }
}
