use std::collections::BTreeMap;

use sentinel_core::{
    Category, IndicatorSet, ScoreResult, ScoringConfig, SentinelError, Zone,
};

use crate::rules::ScoreRules;

/// Composite scorer. Validates its configuration and rule table once at
/// construction; scoring itself is a pure function of the indicator set.
pub struct Scorer {
    config: ScoringConfig,
    rules: ScoreRules,
}

impl Scorer {
    pub fn new(config: ScoringConfig, rules: ScoreRules) -> Result<Self, SentinelError> {
        config.validate()?;
        rules.validate()?;
        Ok(Self { config, rules })
    }

    pub fn with_defaults() -> Result<Self, SentinelError> {
        Self::new(ScoringConfig::default(), ScoreRules::default())
    }

    pub fn score(&self, indicators: &IndicatorSet) -> Result<ScoreResult, SentinelError> {
        let mut sub_scores = BTreeMap::new();
        let mut skipped = Vec::new();
        // Per category: (weighted sub-score sum, weight sum).
        let mut accum: BTreeMap<Category, (f64, f64)> = BTreeMap::new();

        for rule in &self.rules.0 {
            match indicators.get(rule.indicator).value() {
                Some(value) => {
                    let sub = rule.kind.evaluate(value);
                    sub_scores.insert(rule.indicator, sub);
                    let entry = accum.entry(rule.indicator.category()).or_insert((0.0, 0.0));
                    entry.0 += rule.weight * sub;
                    entry.1 += rule.weight;
                }
                None => skipped.push(rule.indicator),
            }
        }

        // Unavailable indicators drop out and the remaining weights
        // renormalize; an empty category drops out the same way.
        let category_scores: BTreeMap<Category, f64> = accum
            .iter()
            .filter(|(_, (_, weight_sum))| *weight_sum > 0.0)
            .map(|(cat, (sum, weight_sum))| (*cat, sum / weight_sum))
            .collect();

        if category_scores.is_empty() {
            return Err(SentinelError::InsufficientData(format!(
                "{}: no scorable indicators",
                indicators.ticker
            )));
        }

        let weights = &self.config.weights;
        let mut weighted = 0.0;
        let mut weight_sum = 0.0;
        for (category, score) in &category_scores {
            let weight = match category {
                Category::Technical => weights.technical,
                Category::Fundamental => weights.fundamental,
            };
            weighted += weight * score;
            weight_sum += weight;
        }

        let score = (weighted / weight_sum).clamp(1.0, 100.0);
        let zone = self.zone_for(score);

        tracing::debug!(
            ticker = %indicators.ticker,
            score,
            zone = zone.label(),
            scored = sub_scores.len(),
            skipped = skipped.len(),
            "ticker scored"
        );

        Ok(ScoreResult {
            ticker: indicators.ticker.clone(),
            score,
            zone,
            category_scores,
            sub_scores,
            skipped,
        })
    }

    fn zone_for(&self, score: f64) -> Zone {
        let zones = &self.config.zones;
        if score >= zones.favorable_min {
            Zone::Favorable
        } else if score >= zones.neutral_min {
            Zone::Neutral
        } else {
            Zone::Unfavorable
        }
    }
}
