use sentinel_core::{NotificationEvent, PortfolioConfig, PortfolioSnapshot, Zone};

/// Compares two consecutive snapshots and emits the changes worth
/// notifying. The first run has no baseline and emits nothing; every
/// rule below compares like against like, so diffing a snapshot with
/// itself is always quiet.
pub fn diff_snapshots(
    previous: Option<&PortfolioSnapshot>,
    current: &PortfolioSnapshot,
    config: &PortfolioConfig,
) -> Vec<NotificationEvent> {
    let previous = match previous {
        Some(snapshot) => snapshot,
        None => return Vec::new(),
    };

    let mut events = Vec::new();

    // Top-N membership changes, in ranking order.
    for (index, ticker) in current.top.iter().enumerate() {
        if !previous.in_top(ticker) {
            let score = current.score_of(ticker).map(|s| s.score).unwrap_or_default();
            events.push(NotificationEvent::TopTenEntry {
                ticker: ticker.clone(),
                rank: index + 1,
                score,
            });
        }
    }
    for ticker in &previous.top {
        if !current.in_top(ticker) {
            // Prefer the fresh score; fall back to the last known one
            // when the ticker lost coverage this run.
            let score = current
                .score_of(ticker)
                .or_else(|| previous.score_of(ticker))
                .map(|s| s.score)
                .unwrap_or_default();
            events.push(NotificationEvent::TopTenExit {
                ticker: ticker.clone(),
                score,
            });
        }
    }

    // Per-position changes, in ticker order.
    for entry in &current.entries {
        let ticker = &entry.position.ticker;
        let before = previous.score_of(ticker);

        match (&entry.score, before) {
            (Some(now), Some(was)) => {
                if (now.score - was.score).abs() >= config.score_shift_threshold {
                    events.push(NotificationEvent::ScoreShift {
                        ticker: ticker.clone(),
                        previous: was.score,
                        current: now.score,
                    });
                }
                if now.zone == Zone::Favorable && was.zone != Zone::Favorable {
                    events.push(NotificationEvent::BuyZoneEntry {
                        ticker: ticker.clone(),
                        previous_zone: was.zone,
                        score: now.score,
                    });
                }
            }
            (None, Some(_)) => {
                events.push(NotificationEvent::CoverageLost {
                    ticker: ticker.clone(),
                    reason: "position could not be scored this run".to_string(),
                });
            }
            // Newly added or still-uncovered positions have no baseline
            // to diff against.
            (_, None) => {}
        }
    }

    events
}
