use sentinel_core::{
    EntryZone, EntryZoneState, Indicator, IndicatorConfig, IndicatorSet, RawSnapshot,
};

use crate::indicators::{bollinger, macd, rsi, sma, volume_variation};

/// Derives the full indicator set for one ticker. Pure function of the
/// snapshot and the static configuration; no side effects.
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn calculate(&self, snapshot: &RawSnapshot) -> IndicatorSet {
        let mut set = IndicatorSet::new(snapshot.ticker.clone());
        let closes: Vec<f64> = snapshot.bars.iter().map(|b| b.close).collect();
        let last_close = closes.last().copied();

        // Moving-average distances.
        let ma_long = sma(&closes, self.config.ma_long);
        set.set(
            Indicator::PriceVsMa50,
            ma_distance(last_close, sma(&closes, self.config.ma_short)),
        );
        set.set(
            Indicator::PriceVsMa100,
            ma_distance(last_close, sma(&closes, self.config.ma_mid)),
        );
        set.set(Indicator::PriceVsMa200, ma_distance(last_close, ma_long));

        set.set(Indicator::Rsi, rsi(&closes, self.config.rsi_period));

        let macd_state = macd(
            &closes,
            self.config.macd_fast,
            self.config.macd_slow,
            self.config.macd_signal,
        );
        set.set(
            Indicator::MacdBullish,
            macd_state.map(|m| if m.bullish { 1.0 } else { 0.0 }),
        );

        let bands = bollinger(
            &closes,
            self.config.bollinger_period,
            self.config.bollinger_std_dev,
        );
        set.set(Indicator::BollingerPercentB, bands.map(|b| b.percent_b));

        set.set(
            Indicator::VolumeVariation,
            volume_variation(&snapshot.bars, self.config.volume_window),
        );

        let fundamentals = &snapshot.fundamentals;
        set.set(Indicator::Beta, fundamentals.beta);

        // Sector-normalized valuation ratios. Without peer averages the
        // comparison is meaningless, so these stay unavailable.
        let sector = snapshot.sector.as_ref();
        set.set(
            Indicator::PeVsSector,
            positive_ratio(fundamentals.pe_ratio, sector.and_then(|s| s.pe_ratio)),
        );
        set.set(
            Indicator::PbVsSector,
            positive_ratio(
                fundamentals.price_to_book,
                sector.and_then(|s| s.price_to_book),
            ),
        );
        set.set(
            Indicator::MarginVsSector,
            positive_ratio(
                fundamentals.gross_margin_5y_avg,
                sector.and_then(|s| s.gross_margin),
            ),
        );
        set.set(
            Indicator::DebtVsSector,
            ratio_over(
                fundamentals.debt_to_equity,
                sector.and_then(|s| s.debt_to_equity),
            ),
        );

        set.set(Indicator::SalesGrowth5y, fundamentals.sales_growth_5y);
        set.set(Indicator::EpsGrowth5y, fundamentals.eps_growth_5y);
        set.set(Indicator::DividendYield, fundamentals.dividend_yield);
        set.set(Indicator::DividendGrowth3y, fundamentals.dividend_growth_3y);
        set.set(Indicator::PayoutRatio, fundamentals.payout_ratio);
        set.set(Indicator::SharesTrend3y, fundamentals.shares_trend_3y);

        set.entry_zone = entry_zone(last_close, ma_long, bands.map(|b| b.lower));

        tracing::debug!(
            ticker = %snapshot.ticker,
            available = set.available_count(),
            total = Indicator::ALL.len(),
            "indicator set computed"
        );

        set
    }
}

fn ma_distance(price: Option<f64>, ma: Option<f64>) -> Option<f64> {
    match (price, ma) {
        (Some(p), Some(m)) if m > 0.0 => Some((p - m) / m * 100.0),
        _ => None,
    }
}

/// Company value over sector average; both sides must be positive.
fn positive_ratio(company: Option<f64>, sector: Option<f64>) -> Option<f64> {
    match (company, sector) {
        (Some(c), Some(s)) if c > 0.0 && s > 0.0 => Some(c / s),
        _ => None,
    }
}

/// Like `positive_ratio` but tolerates a zero numerator (a debt-free
/// company is a valid, excellent reading).
fn ratio_over(company: Option<f64>, sector: Option<f64>) -> Option<f64> {
    match (company, sector) {
        (Some(c), Some(s)) if c >= 0.0 && s > 0.0 => Some(c / s),
        _ => None,
    }
}

/// Support band between the long moving average and the lower Bollinger
/// band. The price being inside or below the band marks a technically
/// favorable entry.
fn entry_zone(price: Option<f64>, ma_long: Option<f64>, lower_band: Option<f64>) -> Option<EntryZone> {
    let (price, ma_long, lower_band) = match (price, ma_long, lower_band) {
        (Some(p), Some(m), Some(l)) if p > 0.0 => (p, m, l),
        _ => return None,
    };

    let zone_low = ma_long.min(lower_band);
    let zone_high = ma_long.max(lower_band);
    let (state, distance_pct) = if price <= zone_high {
        (EntryZoneState::Active, 0.0)
    } else {
        (EntryZoneState::AwaitPullback, (price - zone_high) / price * 100.0)
    };

    Some(EntryZone {
        current_price: price,
        zone_low,
        zone_high,
        state,
        distance_pct,
    })
}
