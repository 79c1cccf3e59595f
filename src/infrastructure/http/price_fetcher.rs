use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use super::classify;
use crate::domain::models::MarketConfig;
use crate::domain::ports::PriceSource;

/// Ticker payload: `{"symbol": "BTCUSDT", "price": "64000.12"}`
#[derive(Debug, Deserialize)]
struct TickerResponse {
    price: PriceField,
}

/// Exchanges send the price as a decimal string; some proxies send a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceField {
    Text(String),
    Number(f64),
}

impl PriceField {
    fn value(&self) -> Option<f64> {
        let value = match self {
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
            Self::Number(number) => *number,
        };
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

/// Reference price fetcher for a ticker endpoint
#[derive(Debug, Clone)]
pub struct HttpPriceFetcher {
    http_client: ReqwestClient,
    url: String,
    symbol: String,
    timeout: Duration,
}

impl HttpPriceFetcher {
    /// Create a fetcher from the market configuration.
    pub fn new(http_client: ReqwestClient, config: &MarketConfig) -> Self {
        Self {
            http_client,
            url: config.url.clone(),
            symbol: config.symbol.clone(),
            timeout: config.timeout(),
        }
    }
}

#[async_trait]
impl PriceSource for HttpPriceFetcher {
    async fn fetch(&self) -> Option<f64> {
        let response = match self
            .http_client
            .get(&self.url)
            .query(&[("symbol", self.symbol.as_str())])
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(symbol = %self.symbol, error = %classify(&err, self.timeout), "Price fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                symbol = %self.symbol,
                status = response.status().as_u16(),
                "Price source returned non-success status"
            );
            return None;
        }

        match response.json::<TickerResponse>().await {
            Ok(ticker) => {
                let price = ticker.price.value();
                if price.is_none() {
                    warn!(symbol = %self.symbol, "Price source returned an unusable price");
                }
                price
            }
            Err(err) => {
                warn!(symbol = %self.symbol, error = %err, "Price source returned a malformed payload");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_field_parsing() {
        let ticker: TickerResponse =
            serde_json::from_str(r#"{"symbol":"BTCUSDT","price":"64123.45000000"}"#).unwrap();
        assert_eq!(ticker.price.value(), Some(64_123.45));

        let ticker: TickerResponse = serde_json::from_str(r#"{"price": 101.5}"#).unwrap();
        assert_eq!(ticker.price.value(), Some(101.5));
    }

    #[test]
    fn test_unusable_prices_are_absent() {
        assert_eq!(PriceField::Text("abc".to_string()).value(), None);
        assert_eq!(PriceField::Text("-3".to_string()).value(), None);
        assert_eq!(PriceField::Number(0.0).value(), None);
        assert_eq!(PriceField::Text("NaN".to_string()).value(), None);
    }
}
