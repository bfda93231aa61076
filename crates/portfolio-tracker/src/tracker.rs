use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use notification_service::NotificationService;
use sentinel_core::{
    NotificationEvent, PortfolioConfig, PortfolioSnapshot, PortfolioStore, SnapshotEntry,
    TickerAnalyzer,
};

use crate::diff::diff_snapshots;
use crate::snapshot::build_snapshot;

/// Outcome of one tracking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub snapshot: PortfolioSnapshot,
    pub events: Vec<NotificationEvent>,
    pub scored: usize,
    pub skipped: usize,
}

/// The per-run pipeline: load positions, score them, snapshot, diff
/// against the previous snapshot, notify. A position that cannot be
/// scored is kept with the gap marked; only configuration problems
/// abort the run.
pub struct PortfolioTracker {
    analyzer: Arc<dyn TickerAnalyzer>,
    store: Arc<dyn PortfolioStore>,
    notifier: Arc<NotificationService>,
    config: PortfolioConfig,
}

impl PortfolioTracker {
    pub fn new(
        analyzer: Arc<dyn TickerAnalyzer>,
        store: Arc<dyn PortfolioStore>,
        notifier: Arc<NotificationService>,
        config: PortfolioConfig,
    ) -> anyhow::Result<Self> {
        config.validate().context("portfolio configuration")?;
        Ok(Self {
            analyzer,
            store,
            notifier,
            config,
        })
    }

    pub async fn run(&self, previous: Option<&PortfolioSnapshot>) -> anyhow::Result<RunReport> {
        let positions = self
            .store
            .load_portfolio()
            .await
            .context("loading portfolio")?;
        let total = positions.len();

        let mut entries = Vec::with_capacity(total);
        let mut scored = 0;
        for position in positions {
            let ticker = position.ticker.clone();
            let (score, last_price) = match self.analyzer.analyze(&ticker).await {
                Ok(ticker_score) => {
                    scored += 1;
                    (Some(ticker_score.result), ticker_score.last_price)
                }
                Err(error) if error.is_recoverable() => {
                    tracing::warn!(%ticker, %error, "position skipped this run");
                    (None, None)
                }
                Err(error) => {
                    return Err(error).with_context(|| format!("scoring {ticker}"));
                }
            };
            entries.push(SnapshotEntry {
                position,
                score,
                last_price,
            });
        }

        let snapshot = build_snapshot(entries, &self.config);
        let events = diff_snapshots(previous, &snapshot, &self.config);

        tracing::info!(
            scored,
            total,
            events = events.len(),
            "portfolio run complete, {scored} of {total} positions scored"
        );

        for event in &events {
            self.notifier.send_event_async(event.clone()).await;
        }

        Ok(RunReport {
            skipped: total - scored,
            snapshot,
            events,
            scored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use notification_service::{Alert, NotificationChannel, NotificationError};
    use sentinel_core::{Position, ScoreResult, SentinelError, TickerScore, Zone};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    struct TableAnalyzer {
        scores: Mutex<BTreeMap<String, f64>>,
    }

    impl TableAnalyzer {
        fn new(rows: &[(&str, f64)]) -> Arc<Self> {
            Arc::new(Self {
                scores: Mutex::new(
                    rows.iter().map(|(t, s)| (t.to_string(), *s)).collect(),
                ),
            })
        }

        fn set(&self, ticker: &str, score: f64) {
            self.scores
                .lock()
                .unwrap()
                .insert(ticker.to_string(), score);
        }

        fn remove(&self, ticker: &str) {
            self.scores.lock().unwrap().remove(ticker);
        }
    }

    #[async_trait]
    impl TickerAnalyzer for TableAnalyzer {
        async fn analyze(&self, ticker: &str) -> Result<TickerScore, SentinelError> {
            let score = self
                .scores
                .lock()
                .unwrap()
                .get(ticker)
                .copied()
                .ok_or_else(|| {
                    SentinelError::InsufficientData(format!("{ticker}: no data"))
                })?;
            let zone = if score >= 80.0 {
                Zone::Favorable
            } else if score >= 40.0 {
                Zone::Neutral
            } else {
                Zone::Unfavorable
            };
            Ok(TickerScore {
                result: ScoreResult {
                    ticker: ticker.to_string(),
                    score,
                    zone,
                    category_scores: BTreeMap::new(),
                    sub_scores: BTreeMap::new(),
                    skipped: Vec::new(),
                },
                market_cap: Some(50e9),
                last_price: Some(110.0),
            })
        }
    }

    struct MemoryStore {
        positions: Mutex<Vec<Position>>,
    }

    impl MemoryStore {
        fn with(tickers: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                positions: Mutex::new(
                    tickers
                        .iter()
                        .map(|t| Position {
                            ticker: t.to_string(),
                            shares: 10.0,
                            cost_basis: Some(100.0),
                            added_at: Utc::now(),
                        })
                        .collect(),
                ),
            })
        }
    }

    #[async_trait]
    impl PortfolioStore for MemoryStore {
        async fn load_portfolio(&self) -> anyhow::Result<Vec<Position>> {
            Ok(self.positions.lock().unwrap().clone())
        }

        async fn save_portfolio(&self, positions: &[Position]) -> anyhow::Result<()> {
            *self.positions.lock().unwrap() = positions.to_vec();
            Ok(())
        }
    }

    struct CountingChannel {
        sent: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl NotificationChannel for CountingChannel {
        async fn send(&self, _alert: &Alert) -> Result<(), NotificationError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn tracker(
        analyzer: Arc<TableAnalyzer>,
        store: Arc<MemoryStore>,
        sent: Arc<AtomicUsize>,
    ) -> PortfolioTracker {
        let notifier = Arc::new(NotificationService::new(vec![Box::new(CountingChannel {
            sent,
        })]));
        PortfolioTracker::new(analyzer, store, notifier, PortfolioConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn first_run_builds_baseline_without_events() {
        init_logging();
        let analyzer = TableAnalyzer::new(&[("AAA", 85.0), ("BBB", 62.0)]);
        let store = MemoryStore::with(&["AAA", "BBB"]);
        let sent = Arc::new(AtomicUsize::new(0));
        let tracker = tracker(analyzer, store, sent.clone());

        let report = tracker.run(None).await.unwrap();
        assert_eq!(report.scored, 2);
        assert_eq!(report.skipped, 0);
        assert!(report.events.is_empty());
        assert_eq!(report.snapshot.top, ["AAA", "BBB"]);
        assert_eq!(sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_run_diffs_and_notifies() {
        let analyzer = TableAnalyzer::new(&[("AAA", 85.0), ("BBB", 62.0)]);
        let store = MemoryStore::with(&["AAA", "BBB"]);
        let sent = Arc::new(AtomicUsize::new(0));
        let tracker = tracker(analyzer.clone(), store, sent.clone());

        let baseline = tracker.run(None).await.unwrap();
        analyzer.set("BBB", 70.0);
        let report = tracker.run(Some(&baseline.snapshot)).await.unwrap();

        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].kind(), "score_shift");
        assert_eq!(sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn lost_coverage_is_skipped_and_reported() {
        let analyzer = TableAnalyzer::new(&[("AAA", 85.0), ("BBB", 62.0)]);
        let store = MemoryStore::with(&["AAA", "BBB"]);
        let sent = Arc::new(AtomicUsize::new(0));
        let tracker = tracker(analyzer.clone(), store, sent.clone());

        let baseline = tracker.run(None).await.unwrap();
        analyzer.remove("BBB");
        let report = tracker.run(Some(&baseline.snapshot)).await.unwrap();

        assert_eq!(report.scored, 1);
        assert_eq!(report.skipped, 1);
        let kinds: Vec<_> = report.events.iter().map(|e| e.kind()).collect();
        assert!(kinds.contains(&"coverage_lost"));
        // The position is held, just unranked.
        assert!(report.snapshot.entry("BBB").is_some());
        assert!(!report.snapshot.in_top("BBB"));
    }

    #[tokio::test]
    async fn rerun_against_own_snapshot_is_idempotent() {
        let analyzer = TableAnalyzer::new(&[("AAA", 85.0)]);
        let store = MemoryStore::with(&["AAA"]);
        let sent = Arc::new(AtomicUsize::new(0));
        let tracker = tracker(analyzer, store, sent.clone());

        let first = tracker.run(None).await.unwrap();
        let second = tracker.run(Some(&first.snapshot)).await.unwrap();
        assert!(second.events.is_empty());
        assert_eq!(sent.load(Ordering::SeqCst), 0);
    }
}
