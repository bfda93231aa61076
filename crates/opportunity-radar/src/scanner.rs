use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use sentinel_core::{RadarConfig, SentinelError, TickerAnalyzer, TickerScore};

use crate::scan::{BucketScan, RadarScan, ScanFailure};

/// Concurrent universe scanner. Fetch concurrency is bounded by a
/// semaphore because the upstream data source is rate-limited; a
/// per-ticker failure is logged, recorded, and skipped.
pub struct RadarScanner {
    analyzer: Arc<dyn TickerAnalyzer>,
    config: RadarConfig,
}

impl RadarScanner {
    pub fn new(analyzer: Arc<dyn TickerAnalyzer>, config: RadarConfig) -> Result<Self, SentinelError> {
        config.validate()?;
        Ok(Self { analyzer, config })
    }

    pub async fn scan(&self, universe: &[String]) -> RadarScan {
        let universe = if universe.len() > self.config.universe_cap {
            tracing::warn!(
                requested = universe.len(),
                cap = self.config.universe_cap,
                "scan universe truncated"
            );
            &universe[..self.config.universe_cap]
        } else {
            universe
        };

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches));
        let mut tasks = JoinSet::new();
        // Task id -> ticker, so a panicked task still lands in failures.
        let mut pending: HashMap<tokio::task::Id, String> = HashMap::new();

        for ticker in universe {
            let analyzer = Arc::clone(&self.analyzer);
            let semaphore = Arc::clone(&semaphore);
            let task_ticker = ticker.clone();
            let handle = tasks.spawn(async move {
                let permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(closed) => return Err(SentinelError::Calculation(closed.to_string())),
                };
                let outcome = analyzer.analyze(&task_ticker).await;
                drop(permit);
                outcome
            });
            pending.insert(handle.id(), ticker.clone());
        }

        let mut scored: Vec<TickerScore> = Vec::new();
        let mut failures: Vec<ScanFailure> = Vec::new();
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, Ok(score))) => {
                    pending.remove(&id);
                    scored.push(score);
                }
                Ok((id, Err(error))) => {
                    let ticker = pending.remove(&id).unwrap_or_default();
                    tracing::warn!(%ticker, %error, "ticker skipped during radar scan");
                    failures.push(ScanFailure {
                        ticker,
                        reason: error.to_string(),
                    });
                }
                Err(join_error) => {
                    let ticker = pending.remove(&join_error.id()).unwrap_or_default();
                    tracing::warn!(%ticker, %join_error, "radar scan task aborted");
                    failures.push(ScanFailure {
                        ticker,
                        reason: join_error.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            scored = scored.len(),
            failed = failures.len(),
            total = universe.len(),
            "radar scan complete"
        );

        self.assemble(scored, failures)
    }

    fn assemble(&self, scored: Vec<TickerScore>, mut failures: Vec<ScanFailure>) -> RadarScan {
        let mut buckets: BTreeMap<_, Vec<TickerScore>> = BTreeMap::new();
        for score in scored {
            match score.market_cap {
                Some(cap) if cap > 0.0 => {
                    buckets
                        .entry(self.config.bucket_for(cap))
                        .or_default()
                        .push(score);
                }
                _ => {
                    // Without a market cap there is no bucket to rank in.
                    failures.push(ScanFailure {
                        ticker: score.result.ticker.clone(),
                        reason: "market cap unavailable".to_string(),
                    });
                }
            }
        }

        failures.sort_by(|a, b| a.ticker.cmp(&b.ticker));

        let buckets = buckets
            .into_iter()
            .map(|(bucket, mut members)| {
                members.sort_by(|a, b| {
                    b.result
                        .score
                        .total_cmp(&a.result.score)
                        .then_with(|| a.result.ticker.cmp(&b.result.ticker))
                });

                let scored = members.len();
                let qualifying = members
                    .iter()
                    .filter(|m| m.result.score >= self.config.opportunity_threshold)
                    .map(|m| (m.result.ticker.clone(), m.result.score))
                    .collect();

                let ranked = members
                    .into_iter()
                    .take(self.config.top_k)
                    .map(|m| m.result)
                    .collect();

                (
                    bucket,
                    BucketScan {
                        ranked,
                        qualifying,
                        scored,
                    },
                )
            })
            .collect();

        RadarScan {
            taken_at: Utc::now(),
            buckets,
            failures,
        }
    }
}
