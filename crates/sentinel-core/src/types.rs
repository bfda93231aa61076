use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar data, oldest to newest in a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Reported company fundamentals, as delivered by the data source.
/// Every field is optional; downstream indicators mark themselves
/// unavailable instead of inventing zeros.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fundamentals {
    pub pe_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    /// Five-year average gross margin, percent.
    pub gross_margin_5y_avg: Option<f64>,
    /// Five-year sales growth, percent.
    pub sales_growth_5y: Option<f64>,
    /// Five-year EPS growth, percent.
    pub eps_growth_5y: Option<f64>,
    pub debt_to_equity: Option<f64>,
    /// Dividend payout ratio, percent of earnings.
    pub payout_ratio: Option<f64>,
    /// Trailing dividend yield, percent.
    pub dividend_yield: Option<f64>,
    /// Three-year dividend growth, percent.
    pub dividend_growth_3y: Option<f64>,
    /// Three-year change in shares outstanding, percent.
    /// Negative means the company has been buying back stock.
    pub shares_trend_3y: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub beta: Option<f64>,
    pub market_cap: Option<f64>,
}

/// Peer-average ratios used to normalize valuation fundamentals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectorAverages {
    pub pe_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    /// Average gross margin across peers, percent.
    pub gross_margin: Option<f64>,
    pub debt_to_equity: Option<f64>,
}

/// Everything the data source knows about one ticker at fetch time.
/// Immutable once constructed; the pipeline only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub ticker: String,
    pub name: Option<String>,
    pub sector_name: Option<String>,
    /// Daily bars ordered oldest to newest.
    pub bars: Vec<Bar>,
    pub fundamentals: Fundamentals,
    pub sector: Option<SectorAverages>,
}

impl RawSnapshot {
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }
}

/// Scoring category an indicator contributes to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    Technical,
    Fundamental,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technical => "technical",
            Category::Fundamental => "fundamental",
        }
    }
}

/// The fixed set of indicators the engine derives per ticker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Indicator {
    /// Percent distance of the last close from the 50-day moving average.
    PriceVsMa50,
    /// Percent distance from the 100-day moving average.
    PriceVsMa100,
    /// Percent distance from the 200-day moving average.
    PriceVsMa200,
    /// 14-period relative strength index, 0-100.
    Rsi,
    /// 1.0 when the MACD line sits above its signal line, else 0.0.
    MacdBullish,
    /// Position of the last close within the Bollinger bands (%B).
    BollingerPercentB,
    /// Percent change of the latest volume vs its 30-day average.
    VolumeVariation,
    /// Market beta from the company profile.
    Beta,
    /// Company P/E divided by the sector average P/E.
    PeVsSector,
    /// Company P/B divided by the sector average P/B.
    PbVsSector,
    /// Company gross margin divided by the sector average.
    MarginVsSector,
    /// Company debt/equity divided by the sector average.
    DebtVsSector,
    SalesGrowth5y,
    EpsGrowth5y,
    DividendYield,
    DividendGrowth3y,
    PayoutRatio,
    SharesTrend3y,
}

impl Indicator {
    pub const ALL: [Indicator; 18] = [
        Indicator::PriceVsMa50,
        Indicator::PriceVsMa100,
        Indicator::PriceVsMa200,
        Indicator::Rsi,
        Indicator::MacdBullish,
        Indicator::BollingerPercentB,
        Indicator::VolumeVariation,
        Indicator::Beta,
        Indicator::PeVsSector,
        Indicator::PbVsSector,
        Indicator::MarginVsSector,
        Indicator::DebtVsSector,
        Indicator::SalesGrowth5y,
        Indicator::EpsGrowth5y,
        Indicator::DividendYield,
        Indicator::DividendGrowth3y,
        Indicator::PayoutRatio,
        Indicator::SharesTrend3y,
    ];

    pub fn category(&self) -> Category {
        match self {
            Indicator::PriceVsMa50
            | Indicator::PriceVsMa100
            | Indicator::PriceVsMa200
            | Indicator::Rsi
            | Indicator::MacdBullish
            | Indicator::BollingerPercentB
            | Indicator::VolumeVariation
            | Indicator::Beta => Category::Technical,
            _ => Category::Fundamental,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::PriceVsMa50 => "price_vs_ma50",
            Indicator::PriceVsMa100 => "price_vs_ma100",
            Indicator::PriceVsMa200 => "price_vs_ma200",
            Indicator::Rsi => "rsi",
            Indicator::MacdBullish => "macd_bullish",
            Indicator::BollingerPercentB => "bollinger_percent_b",
            Indicator::VolumeVariation => "volume_variation",
            Indicator::Beta => "beta",
            Indicator::PeVsSector => "pe_vs_sector",
            Indicator::PbVsSector => "pb_vs_sector",
            Indicator::MarginVsSector => "margin_vs_sector",
            Indicator::DebtVsSector => "debt_vs_sector",
            Indicator::SalesGrowth5y => "sales_growth_5y",
            Indicator::EpsGrowth5y => "eps_growth_5y",
            Indicator::DividendYield => "dividend_yield",
            Indicator::DividendGrowth3y => "dividend_growth_3y",
            Indicator::PayoutRatio => "payout_ratio",
            Indicator::SharesTrend3y => "shares_trend_3y",
        }
    }
}

/// A computed indicator, or an explicit marker that it could not be
/// computed (short price history, missing fundamental field). Absence
/// is carried through scoring and never collapses to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IndicatorValue {
    Available(f64),
    Unavailable,
}

impl IndicatorValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            IndicatorValue::Available(v) => Some(*v),
            IndicatorValue::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, IndicatorValue::Available(_))
    }
}

impl From<Option<f64>> for IndicatorValue {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(v) => IndicatorValue::Available(v),
            None => IndicatorValue::Unavailable,
        }
    }
}

/// Where the last close sits relative to the technical support band
/// (200-day MA and lower Bollinger band).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryZoneState {
    /// Price is at or below the support band.
    Active,
    /// Price is above the band; a pullback would be needed.
    AwaitPullback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryZone {
    pub current_price: f64,
    pub zone_low: f64,
    pub zone_high: f64,
    pub state: EntryZoneState,
    /// How far the price sits above the band, percent. Zero when active.
    pub distance_pct: f64,
}

/// Derived indicators for one ticker. Every configured indicator is
/// present as a key; the value says whether it could be computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub ticker: String,
    pub values: BTreeMap<Indicator, IndicatorValue>,
    pub entry_zone: Option<EntryZone>,
}

impl IndicatorSet {
    pub fn new(ticker: impl Into<String>) -> Self {
        let mut values = BTreeMap::new();
        for indicator in Indicator::ALL {
            values.insert(indicator, IndicatorValue::Unavailable);
        }
        Self {
            ticker: ticker.into(),
            values,
            entry_zone: None,
        }
    }

    pub fn set(&mut self, indicator: Indicator, value: impl Into<IndicatorValue>) {
        self.values.insert(indicator, value.into());
    }

    pub fn get(&self, indicator: Indicator) -> IndicatorValue {
        self.values
            .get(&indicator)
            .copied()
            .unwrap_or(IndicatorValue::Unavailable)
    }

    pub fn available_count(&self) -> usize {
        self.values.values().filter(|v| v.is_available()).count()
    }
}

/// Categorical classification derived from the composite score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Zone {
    Favorable,
    Neutral,
    Unfavorable,
}

impl Zone {
    pub fn label(&self) -> &'static str {
        match self {
            Zone::Favorable => "favorable buy zone",
            Zone::Neutral => "neutral",
            Zone::Unfavorable => "unfavorable",
        }
    }
}

/// Composite scoring output for one ticker. A pure function of the
/// indicator set and the scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub ticker: String,
    /// Composite score, clamped to [1, 100].
    pub score: f64,
    pub zone: Zone,
    /// Weighted category aggregates that produced the score.
    pub category_scores: BTreeMap<Category, f64>,
    /// Per-indicator sub-scores in [0, 100], available indicators only.
    pub sub_scores: BTreeMap<Indicator, f64>,
    /// Indicators excluded as unavailable; weights were renormalized
    /// over the rest.
    pub skipped: Vec<Indicator>,
}

/// A scored ticker plus the profile context ranking needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerScore {
    pub result: ScoreResult,
    pub market_cap: Option<f64>,
    pub last_price: Option<f64>,
}

/// A held position. Persistence belongs to the external store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub shares: f64,
    pub cost_basis: Option<f64>,
    pub added_at: DateTime<Utc>,
}

/// One portfolio position together with its scoring outcome for a run.
/// `score` is None when the ticker lost data coverage this run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub position: Position,
    pub score: Option<ScoreResult>,
    pub last_price: Option<f64>,
}

/// Immutable scored state of the portfolio at one instant; the diff
/// baseline for the next run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub taken_at: DateTime<Utc>,
    /// Entries ordered by ticker.
    pub entries: Vec<SnapshotEntry>,
    /// Top-N tickers by score descending, ticker ascending on ties.
    pub top: Vec<String>,
}

impl PortfolioSnapshot {
    pub fn entry(&self, ticker: &str) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| e.position.ticker == ticker)
    }

    pub fn score_of(&self, ticker: &str) -> Option<&ScoreResult> {
        self.entry(ticker).and_then(|e| e.score.as_ref())
    }

    pub fn in_top(&self, ticker: &str) -> bool {
        self.top.iter().any(|t| t == ticker)
    }

    /// 1-based rank within the top list.
    pub fn rank_of(&self, ticker: &str) -> Option<usize> {
        self.top.iter().position(|t| t == ticker).map(|i| i + 1)
    }
}

/// Market-capitalization partition of the scan universe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CapBucket {
    MegaCap,
    LargeCap,
    MidCap,
    SmallCap,
}

impl CapBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapBucket::MegaCap => "Mega Cap",
            CapBucket::LargeCap => "Large Cap",
            CapBucket::MidCap => "Mid Cap",
            CapBucket::SmallCap => "Small Cap",
        }
    }
}

impl std::fmt::Display for CapBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change worth telling the user about, produced by the diff engine
/// or the radar and consumed by the notifier. Never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NotificationEvent {
    TopTenEntry {
        ticker: String,
        rank: usize,
        score: f64,
    },
    TopTenExit {
        ticker: String,
        score: f64,
    },
    ScoreShift {
        ticker: String,
        previous: f64,
        current: f64,
    },
    BuyZoneEntry {
        ticker: String,
        previous_zone: Zone,
        score: f64,
    },
    NewOpportunity {
        ticker: String,
        bucket: CapBucket,
        score: f64,
    },
    /// A held position was scored last run but could not be scored now.
    CoverageLost {
        ticker: String,
        reason: String,
    },
}

impl NotificationEvent {
    pub fn ticker(&self) -> &str {
        match self {
            NotificationEvent::TopTenEntry { ticker, .. }
            | NotificationEvent::TopTenExit { ticker, .. }
            | NotificationEvent::ScoreShift { ticker, .. }
            | NotificationEvent::BuyZoneEntry { ticker, .. }
            | NotificationEvent::NewOpportunity { ticker, .. }
            | NotificationEvent::CoverageLost { ticker, .. } => ticker,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::TopTenEntry { .. } => "top_ten_entry",
            NotificationEvent::TopTenExit { .. } => "top_ten_exit",
            NotificationEvent::ScoreShift { .. } => "score_shift",
            NotificationEvent::BuyZoneEntry { .. } => "buy_zone_entry",
            NotificationEvent::NewOpportunity { .. } => "new_opportunity",
            NotificationEvent::CoverageLost { .. } => "coverage_lost",
        }
    }
}
