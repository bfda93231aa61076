use serde::{Deserialize, Serialize};

use sentinel_core::PortfolioSnapshot;

/// Valuation metrics for one held position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionMetrics {
    pub ticker: String,
    pub market_value: Option<f64>,
    /// Share of the portfolio's total market value, percent.
    pub weight_pct: Option<f64>,
    /// Return against cost basis, percent.
    pub return_pct: Option<f64>,
    pub score: Option<f64>,
}

/// Whole-portfolio valuation rollup. Positions without a price or cost
/// basis are carried with the gaps marked, never silently priced at
/// zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub positions: Vec<PositionMetrics>,
    pub total_invested: f64,
    pub total_value: f64,
    pub gain_loss: f64,
    pub return_pct: Option<f64>,
    /// Mean composite score over the scored positions.
    pub average_score: Option<f64>,
}

impl PortfolioSummary {
    pub fn from_snapshot(snapshot: &PortfolioSnapshot) -> Self {
        let mut total_invested = 0.0;
        let mut total_value = 0.0;
        for entry in &snapshot.entries {
            if let Some(cost) = entry.position.cost_basis {
                total_invested += entry.position.shares * cost;
            }
            if let Some(price) = entry.last_price {
                total_value += entry.position.shares * price;
            }
        }

        let positions = snapshot
            .entries
            .iter()
            .map(|entry| {
                let market_value = entry.last_price.map(|p| entry.position.shares * p);
                let weight_pct = market_value.and_then(|v| {
                    (total_value > 0.0).then(|| v / total_value * 100.0)
                });
                let return_pct = match (entry.last_price, entry.position.cost_basis) {
                    (Some(price), Some(cost)) if cost > 0.0 => {
                        Some((price - cost) / cost * 100.0)
                    }
                    _ => None,
                };
                PositionMetrics {
                    ticker: entry.position.ticker.clone(),
                    market_value,
                    weight_pct,
                    return_pct,
                    score: entry.score.as_ref().map(|s| s.score),
                }
            })
            .collect();

        let scored: Vec<f64> = snapshot
            .entries
            .iter()
            .filter_map(|e| e.score.as_ref().map(|s| s.score))
            .collect();
        let average_score = if scored.is_empty() {
            None
        } else {
            Some(scored.iter().sum::<f64>() / scored.len() as f64)
        };

        let gain_loss = total_value - total_invested;
        let return_pct =
            (total_invested > 0.0).then(|| gain_loss / total_invested * 100.0);

        Self {
            positions,
            total_invested,
            total_value,
            gain_loss,
            return_pct,
            average_score,
        }
    }
}
