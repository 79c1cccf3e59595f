//! Outbound HTTP adapters.
//!
//! All adapters share one pooled `reqwest::Client` and apply their own
//! per-request deadline.

pub mod health_probe;
pub mod price_fetcher;
pub mod trade_client;

pub use health_probe::HttpHealthProbe;
pub use price_fetcher::HttpPriceFetcher;
pub use trade_client::HttpTradeExecutor;

use anyhow::{Context, Result};
use reqwest::Client as ReqwestClient;
use std::time::Duration;

use crate::domain::errors::NetworkError;

/// Longest upstream body excerpt kept in errors and logs.
pub(crate) const MAX_BODY_EXCERPT: usize = 256;

/// Build the shared HTTP client.
///
/// No client-wide timeout is set; every call supplies its own.
pub fn build_client() -> Result<ReqwestClient> {
    ReqwestClient::builder()
        .pool_max_idle_per_host(10)
        .tcp_nodelay(true)
        .connect_timeout(Duration::from_secs(5))
        .build()
        .context("Failed to build HTTP client")
}

/// Map a reqwest failure onto the network error taxonomy.
pub(crate) fn classify(err: &reqwest::Error, timeout: Duration) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout(timeout)
    } else if err.is_connect() {
        NetworkError::Connect(err.to_string())
    } else {
        NetworkError::Request(err.to_string())
    }
}

/// Cut `body` to at most `MAX_BODY_EXCERPT` bytes on a char boundary.
pub(crate) fn excerpt(body: &str) -> String {
    if body.len() <= MAX_BODY_EXCERPT {
        return body.to_string();
    }
    let mut end = MAX_BODY_EXCERPT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
