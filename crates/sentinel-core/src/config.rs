use serde::{Deserialize, Serialize};

use crate::{CapBucket, SentinelError};

/// Tolerance for weight sums that must equal 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Window lengths and normalization settings for the indicator engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ma_short: usize,
    pub ma_mid: usize,
    pub ma_long: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub volume_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ma_short: 50,
            ma_mid: 100,
            ma_long: 200,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            volume_window: 30,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), SentinelError> {
        let windows = [
            ("ma_short", self.ma_short),
            ("ma_mid", self.ma_mid),
            ("ma_long", self.ma_long),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_period", self.bollinger_period),
            ("volume_window", self.volume_window),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(SentinelError::Configuration(format!(
                    "indicator window {name} must be positive"
                )));
            }
        }
        if self.macd_slow <= self.macd_fast {
            return Err(SentinelError::Configuration(
                "macd_slow must exceed macd_fast".to_string(),
            ));
        }
        if self.bollinger_std_dev <= 0.0 {
            return Err(SentinelError::Configuration(
                "bollinger_std_dev must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Category weights for the final aggregation. Must be positive and sum
/// to 1.0 within tolerance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub technical: f64,
    pub fundamental: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            technical: 0.4,
            fundamental: 0.6,
        }
    }
}

impl CategoryWeights {
    pub fn validate(&self) -> Result<(), SentinelError> {
        if self.technical <= 0.0 || self.fundamental <= 0.0 {
            return Err(SentinelError::Configuration(
                "category weights must be positive".to_string(),
            ));
        }
        let sum = self.technical + self.fundamental;
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(SentinelError::Configuration(format!(
                "category weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

/// Score boundaries that map the composite score to a zone label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneBands {
    /// Scores at or above this are Favorable.
    pub favorable_min: f64,
    /// Scores at or above this (and below favorable) are Neutral.
    pub neutral_min: f64,
}

impl Default for ZoneBands {
    fn default() -> Self {
        Self {
            favorable_min: 80.0,
            neutral_min: 40.0,
        }
    }
}

impl ZoneBands {
    pub fn validate(&self) -> Result<(), SentinelError> {
        if !(1.0..=100.0).contains(&self.favorable_min)
            || !(1.0..=100.0).contains(&self.neutral_min)
        {
            return Err(SentinelError::Configuration(
                "zone boundaries must lie within [1, 100]".to_string(),
            ));
        }
        if self.neutral_min >= self.favorable_min {
            return Err(SentinelError::Configuration(
                "neutral_min must be below favorable_min".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scorer configuration: category weights and zone boundaries. The
/// per-indicator rule table ships with the scoring engine and is
/// validated there.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: CategoryWeights,
    pub zones: ZoneBands,
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), SentinelError> {
        self.weights.validate()?;
        self.zones.validate()
    }
}

/// Portfolio ranking and diff thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// Size of the ranked membership list ("top 10").
    pub top_n: usize,
    /// Minimum absolute score change that triggers a ScoreShift event.
    pub score_shift_threshold: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            score_shift_threshold: 5.0,
        }
    }
}

impl PortfolioConfig {
    pub fn validate(&self) -> Result<(), SentinelError> {
        if self.top_n == 0 {
            return Err(SentinelError::Configuration(
                "top_n must be at least 1".to_string(),
            ));
        }
        if self.score_shift_threshold <= 0.0 {
            return Err(SentinelError::Configuration(
                "score_shift_threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Radar scan configuration: capitalization bucket boundaries, ranking
/// depth, and the opportunity threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Market cap at or above which a ticker is MegaCap, in dollars.
    pub mega_cap_min: f64,
    pub large_cap_min: f64,
    pub mid_cap_min: f64,
    /// Ranked results kept per bucket.
    pub top_k: usize,
    /// Score at or above which a ticker qualifies as an opportunity.
    pub opportunity_threshold: f64,
    /// Bound on concurrent fetches; the data source is rate-limited.
    pub max_concurrent_fetches: usize,
    /// Most tickers examined per scan; protects the daily fetch quota.
    pub universe_cap: usize,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            mega_cap_min: 200e9,
            large_cap_min: 10e9,
            mid_cap_min: 2e9,
            top_k: 5,
            opportunity_threshold: 70.0,
            max_concurrent_fetches: 4,
            universe_cap: 200,
        }
    }
}

impl RadarConfig {
    pub fn validate(&self) -> Result<(), SentinelError> {
        if !(self.mid_cap_min > 0.0
            && self.large_cap_min > self.mid_cap_min
            && self.mega_cap_min > self.large_cap_min)
        {
            return Err(SentinelError::Configuration(
                "cap bucket boundaries must be positive and strictly increasing".to_string(),
            ));
        }
        if self.top_k == 0 {
            return Err(SentinelError::Configuration(
                "top_k must be at least 1".to_string(),
            ));
        }
        if !(1.0..=100.0).contains(&self.opportunity_threshold) {
            return Err(SentinelError::Configuration(
                "opportunity_threshold must lie within [1, 100]".to_string(),
            ));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(SentinelError::Configuration(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if self.universe_cap == 0 {
            return Err(SentinelError::Configuration(
                "universe_cap must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bucket_for(&self, market_cap: f64) -> CapBucket {
        if market_cap >= self.mega_cap_min {
            CapBucket::MegaCap
        } else if market_cap >= self.large_cap_min {
            CapBucket::LargeCap
        } else if market_cap >= self.mid_cap_min {
            CapBucket::MidCap
        } else {
            CapBucket::SmallCap
        }
    }
}

/// The full externally-loaded configuration surface of the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub indicators: IndicatorConfig,
    pub scoring: ScoringConfig,
    pub portfolio: PortfolioConfig,
    pub radar: RadarConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON configuration document. Any violation
    /// is a fatal configuration error; nothing is discovered mid-scan.
    pub fn from_json_str(raw: &str) -> Result<Self, SentinelError> {
        let config: EngineConfig = serde_json::from_str(raw)
            .map_err(|e| SentinelError::Configuration(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SentinelError> {
        self.indicators.validate()?;
        self.scoring.validate()?;
        self.portfolio.validate()?;
        self.radar.validate()
    }
}
