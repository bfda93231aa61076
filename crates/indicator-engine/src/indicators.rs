use serde::{Deserialize, Serialize};

use sentinel_core::Bar;

/// Simple moving average of the trailing `period` values.
/// None when the series is shorter than the window.
pub fn sma(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() < period {
        return None;
    }
    let tail = &data[data.len() - period..];
    Some(tail.iter().sum::<f64>() / period as f64)
}

/// Exponential moving average seeded with the SMA of the first
/// `period` values, then folded over the rest of the series.
pub fn ema(data: &[f64], period: usize) -> Option<f64> {
    ema_series(data, period).and_then(|s| s.last().copied())
}

fn ema_series(data: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || data.len() < period {
        return None;
    }
    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed = data[..period].iter().sum::<f64>() / period as f64;

    let mut series = Vec::with_capacity(data.len() - period + 1);
    let mut current = seed;
    series.push(current);
    for value in &data[period..] {
        current = (value - current) * multiplier + current;
        series.push(current);
    }
    Some(series)
}

/// Relative Strength Index with Wilder smoothing over the whole series.
/// Returns 100 when there are no down moves in the window.
pub fn rsi(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() < period + 1 {
        return None;
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);
    for pair in data.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// MACD state at the end of the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    pub bullish: bool,
}

/// MACD from fast/slow EMAs plus a signal-line EMA over the MACD
/// series. Needs `slow + signal_period` closes for a meaningful
/// signal line.
pub fn macd(data: &[f64], fast: usize, slow: usize, signal_period: usize) -> Option<Macd> {
    if fast == 0 || signal_period == 0 || slow <= fast || data.len() < slow + signal_period {
        return None;
    }

    let ema_fast = ema_series(data, fast)?;
    let ema_slow = ema_series(data, slow)?;

    // The slow series starts later; align the fast series to it.
    let offset = slow - fast;
    let macd_line: Vec<f64> = ema_slow
        .iter()
        .enumerate()
        .map(|(i, slow_val)| ema_fast[i + offset] - slow_val)
        .collect();

    let signal = ema(&macd_line, signal_period)?;
    let macd = *macd_line.last()?;

    Some(Macd {
        macd,
        signal,
        bullish: macd > signal,
    })
}

/// Bollinger bands at the end of the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bollinger {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// Position of the last close within the bands: 0 at the lower
    /// band, 1 at the upper, 0.5 when the bands collapse.
    pub percent_b: f64,
}

pub fn bollinger(data: &[f64], period: usize, std_devs: f64) -> Option<Bollinger> {
    if period == 0 || data.len() < period {
        return None;
    }
    let tail = &data[data.len() - period..];
    let last = *data.last()?;

    let mean = tail.iter().sum::<f64>() / period as f64;
    let variance = tail.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();

    let upper = mean + std_devs * std_dev;
    let lower = mean - std_devs * std_dev;
    let percent_b = if upper > lower {
        (last - lower) / (upper - lower)
    } else {
        0.5
    };

    Some(Bollinger {
        upper,
        middle: mean,
        lower,
        percent_b,
    })
}

/// Percent change of the latest volume against its trailing average.
pub fn volume_variation(bars: &[Bar], window: usize) -> Option<f64> {
    if window == 0 || bars.len() < window {
        return None;
    }
    let latest = bars.last()?.volume;
    let tail = &bars[bars.len() - window..];
    let average = tail.iter().map(|b| b.volume).sum::<f64>() / window as f64;
    if average <= 0.0 {
        return None;
    }
    Some((latest - average) / average * 100.0)
}
