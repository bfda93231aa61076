use async_trait::async_trait;

use crate::{FetchError, Position, RawSnapshot, SentinelError, TickerScore};

/// External market data provider. Rate-limited; the core classifies
/// failures but never retries them.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch(&self, ticker: &str) -> Result<RawSnapshot, FetchError>;
}

/// Externally-owned durable store for held positions. The core does not
/// manage file formats.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn load_portfolio(&self) -> anyhow::Result<Vec<Position>>;
    async fn save_portfolio(&self, positions: &[Position]) -> anyhow::Result<()>;
}

/// The fetch-calculate-score pipeline for a single ticker. The radar
/// and the portfolio tracker both run against this seam, which keeps
/// their batch logic testable without a live data source.
#[async_trait]
pub trait TickerAnalyzer: Send + Sync {
    async fn analyze(&self, ticker: &str) -> Result<TickerScore, SentinelError>;
}
