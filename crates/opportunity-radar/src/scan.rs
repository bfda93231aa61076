use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sentinel_core::{CapBucket, NotificationEvent, ScoreResult};

/// A ticker the scan could not score, with the classified reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanFailure {
    pub ticker: String,
    pub reason: String,
}

/// Ranked outcome for one market-cap bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketScan {
    /// Top-K results, score descending, ticker ascending on ties.
    pub ranked: Vec<ScoreResult>,
    /// Tickers at or above the opportunity threshold with their scores,
    /// over the full bucket. Wider than `ranked` when more than K
    /// tickers qualify.
    pub qualifying: BTreeMap<String, f64>,
    /// How many tickers were scored into this bucket, before the top-K
    /// truncation and regardless of the threshold.
    pub scored: usize,
}

/// Outcome of one radar pass over the universe. The diff baseline for
/// the next pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarScan {
    pub taken_at: DateTime<Utc>,
    pub buckets: BTreeMap<CapBucket, BucketScan>,
    pub failures: Vec<ScanFailure>,
}

impl RadarScan {
    pub fn bucket(&self, bucket: CapBucket) -> Option<&BucketScan> {
        self.buckets.get(&bucket)
    }

    pub fn scored_count(&self) -> usize {
        self.buckets.values().map(|b| b.scored).sum()
    }
}

/// Emits NewOpportunity for every ticker newly qualifying in its
/// bucket. The first scan has no baseline and emits nothing.
pub fn diff_scans(previous: Option<&RadarScan>, current: &RadarScan) -> Vec<NotificationEvent> {
    let previous = match previous {
        Some(scan) => scan,
        None => return Vec::new(),
    };

    static EMPTY: BTreeMap<String, f64> = BTreeMap::new();

    let mut events = Vec::new();
    for (bucket, scan) in &current.buckets {
        let known = previous
            .bucket(*bucket)
            .map(|b| &b.qualifying)
            .unwrap_or(&EMPTY);

        for (ticker, score) in &scan.qualifying {
            if known.contains_key(ticker) {
                continue;
            }
            events.push(NotificationEvent::NewOpportunity {
                ticker: ticker.clone(),
                bucket: *bucket,
                score: *score,
            });
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result(ticker: &str, score: f64) -> ScoreResult {
        ScoreResult {
            ticker: ticker.to_string(),
            score,
            zone: sentinel_core::Zone::Favorable,
            category_scores: BTreeMap::new(),
            sub_scores: BTreeMap::new(),
            skipped: Vec::new(),
        }
    }

    fn scan(entries: &[(CapBucket, &str, f64)]) -> RadarScan {
        scan_with_top_k(entries, usize::MAX)
    }

    fn scan_with_top_k(entries: &[(CapBucket, &str, f64)], top_k: usize) -> RadarScan {
        let mut buckets: BTreeMap<CapBucket, BucketScan> = BTreeMap::new();
        for (bucket, ticker, score) in entries {
            let entry = buckets.entry(*bucket).or_default();
            if entry.ranked.len() < top_k {
                entry.ranked.push(result(ticker, *score));
            }
            entry.qualifying.insert(ticker.to_string(), *score);
            entry.scored += 1;
        }
        RadarScan {
            taken_at: Utc::now(),
            buckets,
            failures: Vec::new(),
        }
    }

    #[test]
    fn first_scan_emits_nothing() {
        let current = scan(&[(CapBucket::MegaCap, "AAA", 85.0)]);
        assert!(diff_scans(None, &current).is_empty());
    }

    #[test]
    fn new_qualifier_emits_opportunity() {
        let previous = scan(&[(CapBucket::MegaCap, "AAA", 85.0)]);
        let current = scan(&[
            (CapBucket::MegaCap, "AAA", 85.0),
            (CapBucket::MegaCap, "BBB", 78.0),
        ]);
        let events = diff_scans(Some(&previous), &current);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            NotificationEvent::NewOpportunity {
                ticker: "BBB".to_string(),
                bucket: CapBucket::MegaCap,
                score: 78.0,
            }
        );
    }

    #[test]
    fn qualifier_below_top_k_keeps_its_score() {
        // Eight mega caps, all above the threshold, with the display
        // ranking cut at five. The newcomers outside the ranking must
        // still carry their real scores, not a placeholder.
        let before: Vec<(CapBucket, String, f64)> = (0..5)
            .map(|i| (CapBucket::MegaCap, format!("T{i:02}"), 90.0 - i as f64))
            .collect();
        let after: Vec<(CapBucket, String, f64)> = (0..8)
            .map(|i| (CapBucket::MegaCap, format!("T{i:02}"), 90.0 - i as f64))
            .collect();
        fn borrow(rows: &[(CapBucket, String, f64)]) -> Vec<(CapBucket, &str, f64)> {
            rows.iter().map(|(b, t, s)| (*b, t.as_str(), *s)).collect()
        }
        let previous = scan_with_top_k(&borrow(&before), 5);
        let current = scan_with_top_k(&borrow(&after), 5);
        assert_eq!(current.bucket(CapBucket::MegaCap).unwrap().ranked.len(), 5);

        let events = diff_scans(Some(&previous), &current);
        assert_eq!(events.len(), 3);
        let scores: Vec<(&str, f64)> = events
            .iter()
            .map(|e| match e {
                NotificationEvent::NewOpportunity { ticker, score, .. } => {
                    (ticker.as_str(), *score)
                }
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(scores, [("T05", 85.0), ("T06", 84.0), ("T07", 83.0)]);
    }

    #[test]
    fn scored_count_ignores_threshold_and_truncation() {
        let mut current = scan_with_top_k(
            &[
                (CapBucket::MegaCap, "AAA", 90.0),
                (CapBucket::MegaCap, "BBB", 80.0),
                (CapBucket::MidCap, "CCC", 75.0),
            ],
            1,
        );
        // A ticker scored below the opportunity threshold still counts.
        let mega = current.buckets.get_mut(&CapBucket::MegaCap).unwrap();
        mega.qualifying.remove("BBB");
        assert_eq!(current.scored_count(), 3);
    }

    #[test]
    fn qualifier_moving_buckets_counts_as_new() {
        // Growth moved the ticker from MidCap to LargeCap; in its new
        // bucket it is a fresh opportunity.
        let previous = scan(&[(CapBucket::MidCap, "GRW", 75.0)]);
        let current = scan(&[(CapBucket::LargeCap, "GRW", 76.0)]);
        let events = diff_scans(Some(&previous), &current);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].ticker(), "GRW");
    }

    #[test]
    fn dropped_qualifier_emits_nothing() {
        let previous = scan(&[
            (CapBucket::MegaCap, "AAA", 85.0),
            (CapBucket::MegaCap, "BBB", 78.0),
        ]);
        let current = scan(&[(CapBucket::MegaCap, "AAA", 85.0)]);
        assert!(diff_scans(Some(&previous), &current).is_empty());
    }

    #[test]
    fn unchanged_scans_are_quiet() {
        let previous = scan(&[
            (CapBucket::MegaCap, "AAA", 85.0),
            (CapBucket::MidCap, "CCC", 72.0),
        ]);
        assert!(diff_scans(Some(&previous), &previous.clone()).is_empty());
    }
}
