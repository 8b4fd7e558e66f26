//! SuperTrend
//!
//! ATR-offset bands around `hl2` with hysteresis. The ATR here is a simple
//! rolling mean of true range rather than Wilder's smoothing.

use serde::Serialize;

use super::atr::candle_true_range;
use super::source::{candle_value, finite, PriceSource};
use super::window::rolling_mean;
use crate::settings::SuperTrendSettings;
use crate::types::retain_increasing_time;
use crate::Candle;

/// Direction of the SuperTrend state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    #[default]
    Up,
    Down,
}

impl Trend {
    /// +1 for up, -1 for down
    pub fn sign(&self) -> i8 {
        match self {
            Trend::Up => 1,
            Trend::Down => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SuperTrendPoint {
    pub time: i64,
    pub value: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy)]
struct BandState {
    upper: f64,
    lower: f64,
    trend: Trend,
}

/// True range where the first bar is measured against its own close
fn supertrend_true_range(candles: &[Candle]) -> Vec<Option<f64>> {
    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let prev_close = if i > 0 { candles[i - 1].close } else { candle.close };
            candle_true_range(candle, Some(prev_close))
        })
        .collect()
}

/// Rolling-mean ATR used by SuperTrend, index-aligned with the candles
pub fn supertrend_atr(candles: &[Candle], atr_length: usize) -> Vec<Option<f64>> {
    rolling_mean(&supertrend_true_range(candles), atr_length)
}

/// Advance the band state machine by one bar
fn step(prev: Option<(BandState, f64)>, basic_upper: f64, basic_lower: f64, close: f64) -> BandState {
    let Some((prev, prev_close)) = prev else {
        return BandState {
            upper: basic_upper,
            lower: basic_lower,
            trend: Trend::Up,
        };
    };

    let upper = if basic_upper < prev.upper || prev_close > prev.upper {
        basic_upper
    } else {
        prev.upper
    };
    let lower = if basic_lower > prev.lower || prev_close < prev.lower {
        basic_lower
    } else {
        prev.lower
    };

    let trend = if close > prev.upper {
        Trend::Up
    } else if close < prev.lower {
        Trend::Down
    } else {
        prev.trend
    };

    BandState {
        upper,
        lower,
        trend,
    }
}

/// SuperTrend line with its trend state per bar
///
/// A bar without a valid ATR, `hl2` or close is a gap; the next valid bar
/// starts over from the basic bands in an up trend.
pub fn compute_supertrend(candles: &[Candle], settings: &SuperTrendSettings) -> Vec<SuperTrendPoint> {
    let atr_length = settings.atr_length;
    if atr_length == 0 || candles.len() < atr_length {
        return Vec::new();
    }

    let atr = supertrend_atr(candles, atr_length);
    let mut points = Vec::with_capacity(candles.len());
    let mut state: Option<(BandState, f64)> = None;

    for (candle, atr) in candles.iter().zip(&atr) {
        let bar = atr.zip(candle_value(candle, PriceSource::Hl2)).zip(finite(candle.close));
        let Some(((atr, hl2), close)) = bar else {
            state = None;
            continue;
        };

        let basic_upper = hl2 + settings.factor * atr;
        let basic_lower = hl2 - settings.factor * atr;
        let current = step(state, basic_upper, basic_lower, close);

        let value = match current.trend {
            Trend::Up => current.lower,
            Trend::Down => current.upper,
        };
        points.push(SuperTrendPoint {
            time: candle.time,
            value,
            trend: current.trend,
        });
        state = Some((current, close));
    }

    retain_increasing_time(&mut points, |p| p.time);
    points
}
