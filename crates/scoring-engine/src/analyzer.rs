use std::sync::Arc;

use async_trait::async_trait;

use indicator_engine::IndicatorEngine;
use sentinel_core::{MarketDataSource, SentinelError, TickerAnalyzer, TickerScore};

use crate::scorer::Scorer;

/// Fetch-then-score pipeline for a single ticker. Both the radar and
/// the portfolio tracker drive their runs through this one path.
pub struct SnapshotAnalyzer {
    source: Arc<dyn MarketDataSource>,
    engine: IndicatorEngine,
    scorer: Scorer,
}

impl SnapshotAnalyzer {
    pub fn new(source: Arc<dyn MarketDataSource>, engine: IndicatorEngine, scorer: Scorer) -> Self {
        Self {
            source,
            engine,
            scorer,
        }
    }
}

#[async_trait]
impl TickerAnalyzer for SnapshotAnalyzer {
    async fn analyze(&self, ticker: &str) -> Result<TickerScore, SentinelError> {
        let snapshot = self.source.fetch(ticker).await?;
        let indicators = self.engine.calculate(&snapshot);
        let result = self.scorer.score(&indicators)?;

        Ok(TickerScore {
            result,
            market_cap: snapshot.fundamentals.market_cap,
            last_price: snapshot.last_close(),
        })
    }
}
