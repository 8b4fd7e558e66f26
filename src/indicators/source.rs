//! Source-value extraction
//!
//! Maps a candle to the scalar an indicator runs on. Single-field sources
//! return the field when it is finite; composite sources need every
//! constituent field finite and never average a partial set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::window::rolling_mean;
use crate::Candle;

/// Price (or volume) source for an indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Open,
    #[default]
    Close,
    High,
    Low,
    /// (H+L)/2
    Hl2,
    /// (H+L+C)/3
    Hlc3,
    /// (O+H+L+C)/4
    Ohlc4,
    /// (H+L+C+C)/4
    Hlcc4,
    Volume,
    /// Trailing mean of volume over the indicator length
    VolumeMa,
}

impl PriceSource {
    pub const ALL: [PriceSource; 10] = [
        PriceSource::Open,
        PriceSource::Close,
        PriceSource::High,
        PriceSource::Low,
        PriceSource::Hl2,
        PriceSource::Hlc3,
        PriceSource::Ohlc4,
        PriceSource::Hlcc4,
        PriceSource::Volume,
        PriceSource::VolumeMa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Open => "open",
            PriceSource::Close => "close",
            PriceSource::High => "high",
            PriceSource::Low => "low",
            PriceSource::Hl2 => "hl2",
            PriceSource::Hlc3 => "hlc3",
            PriceSource::Ohlc4 => "ohlc4",
            PriceSource::Hlcc4 => "hlcc4",
            PriceSource::Volume => "volume",
            PriceSource::VolumeMa => "volume_ma",
        }
    }
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PriceSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        PriceSource::ALL
            .into_iter()
            .find(|source| source.as_str() == lower)
            .ok_or_else(|| format!("Unknown price source: {}", s))
    }
}

#[inline]
pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Value of a single-candle source, or `None` for a gap
///
/// [`PriceSource::VolumeMa`] depends on neighbouring candles and is always a
/// gap here; use [`source_value`] or [`source_values`] for it.
pub fn candle_value(candle: &Candle, source: PriceSource) -> Option<f64> {
    match source {
        PriceSource::Open => finite(candle.open),
        PriceSource::Close => finite(candle.close),
        PriceSource::High => finite(candle.high),
        PriceSource::Low => finite(candle.low),
        PriceSource::Hl2 => Some((finite(candle.high)? + finite(candle.low)?) / 2.0),
        PriceSource::Hlc3 => {
            Some((finite(candle.high)? + finite(candle.low)? + finite(candle.close)?) / 3.0)
        }
        PriceSource::Ohlc4 => Some(
            (finite(candle.open)?
                + finite(candle.high)?
                + finite(candle.low)?
                + finite(candle.close)?)
                / 4.0,
        ),
        PriceSource::Hlcc4 => {
            let close = finite(candle.close)?;
            Some((finite(candle.high)? + finite(candle.low)? + close * 2.0) / 4.0)
        }
        PriceSource::Volume => finite(candle.volume),
        PriceSource::VolumeMa => None,
    }
}

/// Source value of the candle at `index`
///
/// `length` is only used by [`PriceSource::VolumeMa`]: the mean volume of the
/// `length` candles ending at `index`, a gap unless all of them carry a
/// finite volume.
pub fn source_value(
    candles: &[Candle],
    index: usize,
    source: PriceSource,
    length: usize,
) -> Option<f64> {
    let candle = candles.get(index)?;
    if source != PriceSource::VolumeMa {
        return candle_value(candle, source);
    }

    if length == 0 || index + 1 < length {
        return None;
    }
    let mut sum = 0.0;
    for c in &candles[index + 1 - length..=index] {
        sum += finite(c.volume)?;
    }
    Some(sum / length as f64)
}

/// Source values for the whole sequence, index-aligned with `candles`
pub fn source_values(candles: &[Candle], source: PriceSource, length: usize) -> Vec<Option<f64>> {
    if source == PriceSource::VolumeMa {
        let volumes: Vec<Option<f64>> = candles.iter().map(|c| finite(c.volume)).collect();
        return rolling_mean(&volumes, length);
    }
    candles.iter().map(|c| candle_value(c, source)).collect()
}

/// Close prices with non-finite values as gaps
pub fn closes(candles: &[Candle]) -> Vec<Option<f64>> {
    source_values(candles, PriceSource::Close, 1)
}
