use async_trait::async_trait;

/// Port for the external reference price quote
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the current price; `None` on any failure.
    async fn fetch(&self) -> Option<f64>;
}
