//! Average True Range (Wilder's smoothing)

use super::source::finite;
use crate::settings::AtrSettings;
use crate::types::{series_from_values, Series};
use crate::Candle;

/// True range of `candle` against the previous close
///
/// Without a previous close the range collapses to `high - low`. A
/// non-finite field yields a gap.
pub fn candle_true_range(candle: &Candle, prev_close: Option<f64>) -> Option<f64> {
    let high = finite(candle.high)?;
    let low = finite(candle.low)?;
    finite(candle.close)?;

    let hl = high - low;
    match prev_close {
        None => Some(hl),
        Some(prev) => {
            let prev = finite(prev)?;
            let hc = (high - prev).abs();
            let lc = (low - prev).abs();
            Some(hl.max(hc).max(lc))
        }
    }
}

/// Calculate True Range; the first bar uses its own high-low range
pub fn true_range(candles: &[Candle]) -> Vec<Option<f64>> {
    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let prev_close = i.checked_sub(1).map(|p| candles[p].close);
            candle_true_range(candle, prev_close)
        })
        .collect()
}

/// Apply Wilder's smoothing to a series with possible gaps
///
/// The seed is the mean of the first `period` valid values, emitted at the
/// index of the last of them. After that `avg = (avg * (period - 1) + x) / period`
/// runs until the first gap, where the chain ends.
pub fn wilders_smooth(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if period == 0 {
        return result;
    }

    let mut sum = 0.0;
    let mut count = 0usize;
    let mut seed_index = None;

    for (i, value) in values.iter().enumerate() {
        if let Some(v) = value {
            sum += v;
            count += 1;
            if count == period {
                result[i] = Some(sum / period as f64);
                seed_index = Some(i);
                break;
            }
        }
    }

    let Some(seed_index) = seed_index else {
        return result;
    };

    let mut smoothed = sum / period as f64;
    for i in seed_index + 1..values.len() {
        let Some(v) = values[i] else {
            break;
        };
        smoothed = (smoothed * (period - 1) as f64 + v) / period as f64;
        result[i] = Some(smoothed);
    }

    result
}

/// Calculate Average True Range (ATR) using Wilder's smoothing
pub fn atr(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    wilders_smooth(&true_range(candles), period)
}

/// ATR as a plottable series
pub fn compute_atr(candles: &[Candle], settings: &AtrSettings) -> Series {
    if settings.length == 0 || candles.len() < settings.length {
        return Series::new();
    }
    series_from_values(candles, &atr(candles, settings.length))
}
