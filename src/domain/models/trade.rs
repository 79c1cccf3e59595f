//! Trade-execution request and receipt.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    /// Long.
    Buy,
    /// Short.
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        })
    }
}

/// Body of `POST /execute-trade`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRequest {
    /// Instrument, e.g. `BTCUSDT`.
    pub symbol: String,
    /// Buy or sell.
    pub side: TradeSide,
    /// Position size in quote currency.
    pub size: f64,
    /// Leverage multiplier.
    pub leverage: u32,
}

/// Identifier returned by the execution service, which may be a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TradeId {
    /// Textual identifier.
    Text(String),
    /// Numeric identifier.
    Number(i64),
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(id) => f.write_str(id),
            Self::Number(id) => write!(f, "{id}"),
        }
    }
}

/// Successful response of the execution service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeReceipt {
    /// Identifier of the executed trade.
    pub trade_id: TradeId,
    /// Profit the execution service expects from the trade.
    pub expected_profit: f64,
}
