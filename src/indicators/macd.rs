//! Normalized MACD
//!
//! Classic fast/slow EMA difference and signal line, each rescaled into
//! [-1, 1] by the min-max range of its trailing `norm_lookback` window.

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use super::ema::{ema, GapPolicy};
use super::source::closes;
use crate::settings::MacdSettings;
use crate::types::{retain_increasing_time, series_from_values, Series};
use crate::Candle;

/// Histogram bar shading, derived from sign and slope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistogramTone {
    /// Normalisation window not yet full
    Neutral,
    /// Non-negative and above the previous bar
    GrowingAbove,
    /// Non-negative and not above the previous bar
    FadingAbove,
    /// Negative and below the previous bar
    GrowingBelow,
    /// Negative and not below the previous bar
    FadingBelow,
}

impl HistogramTone {
    /// Tone of `value` given the previous bar's histogram value
    pub fn classify(value: f64, previous: f64) -> Self {
        if value >= 0.0 {
            if value > previous {
                HistogramTone::GrowingAbove
            } else {
                HistogramTone::FadingAbove
            }
        } else if value < previous {
            HistogramTone::GrowingBelow
        } else {
            HistogramTone::FadingBelow
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBar {
    pub time: i64,
    pub value: f64,
    pub tone: HistogramTone,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MacdOutput {
    pub macd: Series,
    pub signal: Series,
    pub histogram: Vec<HistogramBar>,
}

/// Rescale `value` into [-1, 1] against the window's range; 0 for a flat window
fn normalize(value: f64, window: &[Option<f64>]) -> f64 {
    match window.iter().flatten().minmax() {
        MinMaxResult::MinMax(min, max) if max != min => 2.0 * (value - min) / (max - min) - 1.0,
        _ => 0.0,
    }
}

/// Raw (unnormalised) MACD line and signal line
pub fn macd_raw(
    values: &[Option<f64>],
    fast_length: usize,
    slow_length: usize,
    signal_length: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let ema_fast = ema(values, fast_length, GapPolicy::Freeze);
    let ema_slow = ema(values, slow_length, GapPolicy::Freeze);

    let macd: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(fast, slow)| Some((*fast)? - (*slow)?))
        .collect();
    let signal = ema(&macd, signal_length, GapPolicy::Freeze);

    (macd, signal)
}

/// Normalized MACD on close prices
pub fn compute_macd(candles: &[Candle], settings: &MacdSettings) -> MacdOutput {
    let lookback = settings.norm_lookback;
    let required = settings
        .fast_length
        .max(settings.slow_length)
        .max(lookback);
    if lookback == 0 || candles.len() < required {
        return MacdOutput::default();
    }

    let (macd_line, signal_line) = macd_raw(
        &closes(candles),
        settings.fast_length,
        settings.slow_length,
        settings.signal_length,
    );

    let n = candles.len();
    let mut macd_norm = vec![None; n];
    let mut signal_norm = vec![None; n];
    let mut histogram = Vec::with_capacity(n);
    let mut previous = 0.0;

    for i in 0..n {
        let time = candles[i].time;
        if i + 1 < lookback {
            histogram.push(HistogramBar {
                time,
                value: 0.0,
                tone: HistogramTone::Neutral,
            });
            previous = 0.0;
            continue;
        }

        let start = i + 1 - lookback;
        macd_norm[i] = macd_line[i].map(|m| normalize(m, &macd_line[start..=i]));
        signal_norm[i] = signal_line[i].map(|s| normalize(s, &signal_line[start..=i]));

        match (macd_norm[i], signal_norm[i]) {
            (Some(m), Some(s)) => {
                let value = m - s;
                histogram.push(HistogramBar {
                    time,
                    value,
                    tone: HistogramTone::classify(value, previous),
                });
                previous = value;
            }
            _ => previous = 0.0,
        }
    }

    retain_increasing_time(&mut histogram, |bar| bar.time);

    MacdOutput {
        macd: series_from_values(candles, &macd_norm),
        signal: series_from_values(candles, &signal_norm),
        histogram,
    }
}
