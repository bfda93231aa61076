use chrono::Utc;

use sentinel_core::{PortfolioConfig, PortfolioSnapshot, SnapshotEntry};

/// Assembles a snapshot from scored entries: entries sorted by ticker,
/// top-N ranking by score descending with ticker ascending on ties.
/// Unscored positions are held in the entry list but never ranked.
pub fn build_snapshot(mut entries: Vec<SnapshotEntry>, config: &PortfolioConfig) -> PortfolioSnapshot {
    entries.sort_by(|a, b| a.position.ticker.cmp(&b.position.ticker));

    let mut ranked: Vec<(&str, f64)> = entries
        .iter()
        .filter_map(|e| {
            e.score
                .as_ref()
                .map(|s| (e.position.ticker.as_str(), s.score))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let top = ranked
        .into_iter()
        .take(config.top_n)
        .map(|(ticker, _)| ticker.to_string())
        .collect();

    PortfolioSnapshot {
        taken_at: Utc::now(),
        entries,
        top,
    }
}
