//! Core data types shared by every indicator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural validation errors for candle data
#[derive(Debug, Error, PartialEq)]
pub enum CandleValidationError {
    #[error("{field} is not a finite number ({value})")]
    NonFinite { field: &'static str, value: f64 },

    #[error("high ({high}) must be >= low ({low})")]
    HighLessThanLow { high: f64, low: f64 },

    #[error("volume ({0}) must be >= 0")]
    NegativeVolume(f64),

    #[error("open ({open}) must be between low ({low}) and high ({high})")]
    OpenOutOfRange { open: f64, low: f64, high: f64 },

    #[error("close ({close}) must be between low ({low}) and high ({high})")]
    CloseOutOfRange { close: f64, low: f64, high: f64 },
}

/// OHLCV candlestick keyed by unix time in seconds
///
/// Price fields may hold non-finite values when the candle did not pass
/// through [`crate::sanitize`]; indicators treat those as gaps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    /// Create a candle without validation; see [`Candle::validate`]
    pub fn new_unchecked(
        time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Structural checks: finite fields, `low <= open, close <= high`, volume >= 0
    pub fn validate(&self) -> Result<(), CandleValidationError> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ] {
            if !value.is_finite() {
                return Err(CandleValidationError::NonFinite { field, value });
            }
        }

        if self.high < self.low {
            return Err(CandleValidationError::HighLessThanLow {
                high: self.high,
                low: self.low,
            });
        }

        if self.volume < 0.0 {
            return Err(CandleValidationError::NegativeVolume(self.volume));
        }

        if self.open < self.low || self.open > self.high {
            return Err(CandleValidationError::OpenOutOfRange {
                open: self.open,
                low: self.low,
                high: self.high,
            });
        }

        if self.close < self.low || self.close > self.high {
            return Err(CandleValidationError::CloseOutOfRange {
                close: self.close,
                low: self.low,
                high: self.high,
            });
        }

        Ok(())
    }

    /// Candle open time as a UTC timestamp
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }
}

/// A single plotted value of an output series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: i64,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(time: i64, value: f64) -> Self {
        SeriesPoint { time, value }
    }
}

/// Gap-free output series with strictly increasing timestamps
pub type Series = Vec<SeriesPoint>;

/// Collect `(time, value)` pairs into a [`Series`]
///
/// Gaps (`None`) and non-finite values are omitted, and any point whose time
/// does not strictly exceed the previously kept point is dropped.
pub fn collect_series<I>(points: I) -> Series
where
    I: IntoIterator<Item = (i64, Option<f64>)>,
{
    let mut series = Series::new();
    let mut last_time: Option<i64> = None;

    for (time, value) in points {
        let Some(value) = value.filter(|v| v.is_finite()) else {
            continue;
        };
        if last_time.is_some_and(|last| time <= last) {
            continue;
        }
        series.push(SeriesPoint::new(time, value));
        last_time = Some(time);
    }

    series
}

/// Drop items whose time does not strictly exceed the previously kept item
pub(crate) fn retain_increasing_time<T>(items: &mut Vec<T>, time: impl Fn(&T) -> i64) {
    let mut last_time: Option<i64> = None;
    items.retain(|item| {
        let t = time(item);
        let keep = last_time.map_or(true, |last| t > last);
        if keep {
            last_time = Some(t);
        }
        keep
    });
}

/// Pair an index-aligned value array with the candle timestamps
pub fn series_from_values(candles: &[Candle], values: &[Option<f64>]) -> Series {
    collect_series(
        candles
            .iter()
            .zip(values.iter())
            .map(|(candle, value)| (candle.time, *value)),
    )
}
