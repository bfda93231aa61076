use serde::{Deserialize, Serialize};

use sentinel_core::{Indicator, SentinelError};

/// How a raw indicator reading maps to a sub-score in [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Ordered upper bounds: the first band whose bound the value is
    /// strictly below supplies the sub-score, otherwise `default`.
    ThresholdBands {
        bands: Vec<(f64, f64)>,
        default: f64,
    },
    /// Piecewise-linear mapping over ascending breakpoints, clamped at
    /// both ends.
    LinearInterpolation { breakpoints: Vec<(f64, f64)> },
}

impl RuleKind {
    pub fn evaluate(&self, value: f64) -> f64 {
        let raw = match self {
            RuleKind::ThresholdBands { bands, default } => bands
                .iter()
                .find(|(upper, _)| value < *upper)
                .map(|(_, score)| *score)
                .unwrap_or(*default),
            RuleKind::LinearInterpolation { breakpoints } => {
                interpolate(breakpoints, value)
            }
        };
        raw.clamp(0.0, 100.0)
    }

    fn validate(&self, indicator: Indicator) -> Result<(), SentinelError> {
        match self {
            RuleKind::ThresholdBands { bands, default } => {
                for window in bands.windows(2) {
                    if window[1].0 <= window[0].0 {
                        return Err(SentinelError::Configuration(format!(
                            "rule for {}: band bounds must be strictly ascending",
                            indicator.as_str()
                        )));
                    }
                }
                for score in bands.iter().map(|(_, s)| *s).chain([*default]) {
                    if !(0.0..=100.0).contains(&score) {
                        return Err(SentinelError::Configuration(format!(
                            "rule for {}: sub-score {score} outside [0, 100]",
                            indicator.as_str()
                        )));
                    }
                }
            }
            RuleKind::LinearInterpolation { breakpoints } => {
                if breakpoints.len() < 2 {
                    return Err(SentinelError::Configuration(format!(
                        "rule for {}: interpolation needs at least two breakpoints",
                        indicator.as_str()
                    )));
                }
                for window in breakpoints.windows(2) {
                    if window[1].0 <= window[0].0 {
                        return Err(SentinelError::Configuration(format!(
                            "rule for {}: breakpoints must be strictly ascending",
                            indicator.as_str()
                        )));
                    }
                }
                for (_, score) in breakpoints {
                    if !(0.0..=100.0).contains(score) {
                        return Err(SentinelError::Configuration(format!(
                            "rule for {}: sub-score {score} outside [0, 100]",
                            indicator.as_str()
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn interpolate(breakpoints: &[(f64, f64)], value: f64) -> f64 {
    let first = match breakpoints.first() {
        Some(p) => *p,
        None => return 0.0,
    };
    let last = match breakpoints.last() {
        Some(p) => *p,
        None => return 0.0,
    };
    if value <= first.0 {
        return first.1;
    }
    if value >= last.0 {
        return last.1;
    }
    for window in breakpoints.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        if value <= x1 {
            let t = (value - x0) / (x1 - x0);
            return y0 + t * (y1 - y0);
        }
    }
    last.1
}

/// One indicator's contribution to the composite score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRule {
    pub indicator: Indicator,
    /// Relative weight within the indicator's category.
    pub weight: f64,
    pub kind: RuleKind,
}

/// The full rule table. Exactly one rule per indicator; validated on
/// construction so a bad table can never reach a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRules(pub Vec<ScoreRule>);

impl ScoreRules {
    pub fn validate(&self) -> Result<(), SentinelError> {
        for indicator in Indicator::ALL {
            let count = self.0.iter().filter(|r| r.indicator == indicator).count();
            if count != 1 {
                return Err(SentinelError::Configuration(format!(
                    "rule table must cover {} exactly once, found {count}",
                    indicator.as_str()
                )));
            }
        }
        for rule in &self.0 {
            if rule.weight <= 0.0 {
                return Err(SentinelError::Configuration(format!(
                    "rule for {}: weight must be positive",
                    rule.indicator.as_str()
                )));
            }
            rule.kind.validate(rule.indicator)?;
        }
        Ok(())
    }

    /// Parse and validate a JSON rule table, for deployments that
    /// override the built-in one.
    pub fn from_json_str(raw: &str) -> Result<Self, SentinelError> {
        let rules: ScoreRules = serde_json::from_str(raw)
            .map_err(|e| SentinelError::Configuration(format!("invalid rule table JSON: {e}")))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn rule(&self, indicator: Indicator) -> Option<&ScoreRule> {
        self.0.iter().find(|r| r.indicator == indicator)
    }
}

/// Sub-score for `points` out of `max` band points.
fn pts(points: f64, max: f64) -> f64 {
    points / max * 100.0
}

fn above_ma(weight: f64, indicator: Indicator) -> ScoreRule {
    // Distance from the MA in percent: at or above scores full.
    ScoreRule {
        indicator,
        weight,
        kind: RuleKind::ThresholdBands {
            bands: vec![(0.0, 0.0)],
            default: 100.0,
        },
    }
}

impl Default for ScoreRules {
    /// The built-in table. Weights are the point totals of the original
    /// hand-tuned model; band sub-scores are those point bands rescaled
    /// to [0, 100].
    fn default() -> Self {
        ScoreRules(vec![
            // Moving averages: the long MA dominates.
            above_ma(2.0, Indicator::PriceVsMa50),
            above_ma(3.0, Indicator::PriceVsMa100),
            above_ma(5.0, Indicator::PriceVsMa200),
            // RSI: oversold to mildly-weak readings score best, the
            // model favors entries near support.
            ScoreRule {
                indicator: Indicator::Rsi,
                weight: 4.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![(40.0, 100.0), (60.0, pts(3.0, 4.0)), (70.0, pts(2.0, 4.0))],
                    default: pts(1.0, 4.0),
                },
            },
            ScoreRule {
                indicator: Indicator::MacdBullish,
                weight: 3.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![(0.5, pts(1.0, 3.0))],
                    default: 100.0,
                },
            },
            // %B: near the lower band scores best.
            ScoreRule {
                indicator: Indicator::BollingerPercentB,
                weight: 3.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![(0.2, 100.0), (0.8, pts(2.0, 3.0))],
                    default: pts(1.0, 3.0),
                },
            },
            ScoreRule {
                indicator: Indicator::VolumeVariation,
                weight: 5.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![
                        (-20.0, pts(1.0, 5.0)),
                        (0.0, pts(2.0, 5.0)),
                        (20.0, pts(3.0, 5.0)),
                        (50.0, pts(4.0, 5.0)),
                    ],
                    default: 100.0,
                },
            },
            // Lower beta reads as lower portfolio risk.
            ScoreRule {
                indicator: Indicator::Beta,
                weight: 8.0,
                kind: RuleKind::LinearInterpolation {
                    breakpoints: vec![(0.5, 100.0), (1.0, 70.0), (1.5, 35.0), (2.0, 10.0)],
                },
            },
            // Valuation vs sector: cheaper than peers scores higher.
            ScoreRule {
                indicator: Indicator::PeVsSector,
                weight: 8.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![
                        (0.7, 100.0),
                        (0.9, pts(6.0, 8.0)),
                        (1.1, pts(4.0, 8.0)),
                        (1.3, pts(2.0, 8.0)),
                    ],
                    default: pts(1.0, 8.0),
                },
            },
            ScoreRule {
                indicator: Indicator::PbVsSector,
                weight: 7.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![
                        (0.7, 100.0),
                        (0.9, pts(5.0, 7.0)),
                        (1.1, pts(4.0, 7.0)),
                        (1.3, pts(2.0, 7.0)),
                    ],
                    default: pts(1.0, 7.0),
                },
            },
            // Margins vs sector: wider than peers scores higher.
            ScoreRule {
                indicator: Indicator::MarginVsSector,
                weight: 7.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![
                        (0.7, pts(1.0, 7.0)),
                        (0.9, pts(2.0, 7.0)),
                        (1.1, pts(4.0, 7.0)),
                        (1.3, pts(5.0, 7.0)),
                    ],
                    default: 100.0,
                },
            },
            ScoreRule {
                indicator: Indicator::DebtVsSector,
                weight: 8.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![
                        (0.5, 100.0),
                        (0.8, pts(6.0, 8.0)),
                        (1.0, pts(5.0, 8.0)),
                        (1.3, pts(3.0, 8.0)),
                        (1.8, pts(2.0, 8.0)),
                    ],
                    default: pts(1.0, 8.0),
                },
            },
            ScoreRule {
                indicator: Indicator::SalesGrowth5y,
                weight: 8.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![
                        (-5.0, 0.0),
                        (0.0, pts(1.0, 8.0)),
                        (5.0, pts(2.0, 8.0)),
                        (10.0, pts(4.0, 8.0)),
                        (20.0, pts(6.0, 8.0)),
                    ],
                    default: 100.0,
                },
            },
            ScoreRule {
                indicator: Indicator::EpsGrowth5y,
                weight: 7.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![
                        (-5.0, 0.0),
                        (0.0, pts(1.0, 7.0)),
                        (8.0, pts(2.0, 7.0)),
                        (15.0, pts(4.0, 7.0)),
                        (25.0, pts(5.0, 7.0)),
                    ],
                    default: 100.0,
                },
            },
            ScoreRule {
                indicator: Indicator::DividendYield,
                weight: 4.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![
                        (0.01, 0.0),
                        (1.5, pts(1.0, 4.0)),
                        (2.5, pts(2.0, 4.0)),
                        (4.0, pts(3.0, 4.0)),
                    ],
                    default: 100.0,
                },
            },
            ScoreRule {
                indicator: Indicator::DividendGrowth3y,
                weight: 4.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![(0.0, 0.0), (5.0, pts(2.0, 4.0)), (10.0, pts(3.0, 4.0))],
                    default: 100.0,
                },
            },
            // Payout sweet spot 30-60%: pays out without starving growth.
            ScoreRule {
                indicator: Indicator::PayoutRatio,
                weight: 3.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![
                        (0.01, 0.0),
                        (20.0, pts(1.0, 3.0)),
                        (30.0, pts(2.0, 3.0)),
                        (60.0, 100.0),
                        (75.0, pts(2.0, 3.0)),
                    ],
                    default: pts(1.0, 3.0),
                },
            },
            // Shrinking share count (buybacks) scores best, dilution worst.
            ScoreRule {
                indicator: Indicator::SharesTrend3y,
                weight: 7.0,
                kind: RuleKind::ThresholdBands {
                    bands: vec![
                        (-5.0, 100.0),
                        (-2.0, pts(5.0, 7.0)),
                        (0.0, pts(4.0, 7.0)),
                        (3.0, pts(2.0, 7.0)),
                        (7.0, pts(1.0, 7.0)),
                    ],
                    default: 0.0,
                },
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        ScoreRules::default().validate().unwrap();
    }

    #[test]
    fn default_table_covers_every_indicator() {
        let rules = ScoreRules::default();
        for indicator in Indicator::ALL {
            assert!(rules.rule(indicator).is_some(), "{indicator:?} uncovered");
        }
    }

    #[test]
    fn threshold_bands_pick_first_match() {
        let kind = RuleKind::ThresholdBands {
            bands: vec![(0.7, 100.0), (1.1, 50.0)],
            default: 10.0,
        };
        assert_eq!(kind.evaluate(0.5), 100.0);
        assert_eq!(kind.evaluate(0.9), 50.0);
        assert_eq!(kind.evaluate(2.0), 10.0);
    }

    #[test]
    fn interpolation_clamps_at_the_ends() {
        let kind = RuleKind::LinearInterpolation {
            breakpoints: vec![(0.5, 100.0), (1.5, 20.0)],
        };
        assert_eq!(kind.evaluate(0.1), 100.0);
        assert_eq!(kind.evaluate(3.0), 20.0);
        assert!((kind.evaluate(1.0) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn duplicate_rule_rejected() {
        let mut rules = ScoreRules::default();
        let dup = rules.0[0].clone();
        rules.0.push(dup);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn unordered_bands_rejected() {
        let rules = ScoreRules(vec![ScoreRule {
            indicator: Indicator::Rsi,
            weight: 1.0,
            kind: RuleKind::ThresholdBands {
                bands: vec![(60.0, 50.0), (40.0, 100.0)],
                default: 10.0,
            },
        }]);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn cheap_pe_scores_full() {
        let rules = ScoreRules::default();
        let rule = rules.rule(Indicator::PeVsSector).unwrap();
        assert_eq!(rule.kind.evaluate(0.6), 100.0);
        assert!(rule.kind.evaluate(1.5) < 15.0);
    }

    #[test]
    fn buybacks_outscore_dilution() {
        let rules = ScoreRules::default();
        let rule = rules.rule(Indicator::SharesTrend3y).unwrap();
        assert!(rule.kind.evaluate(-6.0) > rule.kind.evaluate(5.0));
        assert_eq!(rule.kind.evaluate(10.0), 0.0);
    }

    #[test]
    fn rule_table_round_trips_through_json() {
        let rules = ScoreRules::default();
        let raw = serde_json::to_string(&rules).unwrap();
        let parsed = ScoreRules::from_json_str(&raw).unwrap();
        assert_eq!(parsed.0.len(), rules.0.len());
    }

    #[test]
    fn partial_table_rejected_at_load() {
        // A table missing most indicators must fail before any scan.
        let raw = serde_json::to_string(&ScoreRules(vec![ScoreRules::default().0[0].clone()]))
            .unwrap();
        assert!(matches!(
            ScoreRules::from_json_str(&raw),
            Err(SentinelError::Configuration(_))
        ));
    }
}
