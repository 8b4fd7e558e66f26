//! Candle sanitation at the ingestion boundary
//!
//! Raw feeds deliver candles with missing or non-finite fields and
//! timestamps in either seconds or milliseconds. This module turns them into
//! [`Candle`]s with explicit substitution rules and records which fields were
//! repaired in a [`FieldValidity`] per candle.
//!
//! Substitution rules:
//! - `close` invalid: use `open`; drop the candle when both are invalid
//! - `open`, `high`, `low` invalid: use the (possibly substituted) close
//! - `volume` invalid: 0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::indicators::source::finite;
use crate::Candle;

/// Timestamps above this are taken to be milliseconds
pub const MILLIS_THRESHOLD: f64 = 1e11;

/// Candle as delivered by a feed, before any repair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawCandle {
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl RawCandle {
    pub fn new(time: f64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        RawCandle {
            time: Some(time),
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
        }
    }
}

impl From<Candle> for RawCandle {
    fn from(c: Candle) -> Self {
        RawCandle::new(c.time as f64, c.open, c.high, c.low, c.close, c.volume)
    }
}

/// Which fields were usable as supplied (`true`) or substituted (`false`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidity {
    pub open: bool,
    pub high: bool,
    pub low: bool,
    pub close: bool,
    pub volume: bool,
}

impl Default for FieldValidity {
    fn default() -> Self {
        FieldValidity {
            open: true,
            high: true,
            low: true,
            close: true,
            volume: true,
        }
    }
}

impl FieldValidity {
    pub fn all_valid(&self) -> bool {
        self.open && self.high && self.low && self.close && self.volume
    }

    /// Names of the substituted fields
    pub fn substituted(&self) -> Vec<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
        .into_iter()
        .filter(|(_, valid)| !valid)
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SanitizedCandle {
    pub candle: Candle,
    pub validity: FieldValidity,
}

/// Result of sanitising a whole history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizedHistory {
    /// Ascending, unique by time
    pub candles: Vec<Candle>,
    /// Index-aligned with `candles`
    pub validity: Vec<FieldValidity>,
    /// Raw rows that could not be repaired
    pub dropped: usize,
    /// Kept candles failing [`Candle::validate`], e.g. high below low
    pub inconsistent: usize,
}

impl SanitizedHistory {
    /// Number of kept candles with at least one substituted field
    pub fn repaired(&self) -> usize {
        self.validity.iter().filter(|v| !v.all_valid()).count()
    }
}

/// Normalise a feed timestamp to whole seconds
pub fn normalize_timestamp(time: f64) -> Option<i64> {
    let time = finite(time)?;
    let seconds = if time > MILLIS_THRESHOLD {
        (time / 1000.0).floor()
    } else {
        time.floor()
    };
    Some(seconds as i64)
}

/// Repair a single raw candle, or `None` when it has no usable time or price
pub fn sanitize_candle(raw: &RawCandle) -> Option<SanitizedCandle> {
    let time = normalize_timestamp(raw.time?)?;

    let valid = |field: Option<f64>| field.and_then(finite);
    let open = valid(raw.open);
    let close = valid(raw.close).or(open)?;

    let high = valid(raw.high);
    let low = valid(raw.low);
    let volume = valid(raw.volume);

    let validity = FieldValidity {
        open: open.is_some(),
        high: high.is_some(),
        low: low.is_some(),
        close: valid(raw.close).is_some(),
        volume: volume.is_some(),
    };

    Some(SanitizedCandle {
        candle: Candle {
            time,
            open: open.unwrap_or(close),
            high: high.unwrap_or(close),
            low: low.unwrap_or(close),
            close,
            volume: volume.unwrap_or(0.0),
        },
        validity,
    })
}

/// Sanitise, de-duplicate by time (last occurrence wins) and sort ascending
pub fn sanitize_history(raw: &[RawCandle]) -> SanitizedHistory {
    let mut by_time: BTreeMap<i64, SanitizedCandle> = BTreeMap::new();
    let mut dropped = 0;

    for (index, row) in raw.iter().enumerate() {
        match sanitize_candle(row) {
            Some(sanitized) => {
                if !sanitized.validity.all_valid() {
                    debug!(
                        "Row {}: substituted {:?} at time {}",
                        index,
                        sanitized.validity.substituted(),
                        sanitized.candle.time
                    );
                }
                by_time.insert(sanitized.candle.time, sanitized);
            }
            None => {
                dropped += 1;
                warn!("Row {}: dropped candle without usable time or price", index);
            }
        }
    }

    let (candles, validity): (Vec<Candle>, Vec<FieldValidity>) = by_time
        .into_values()
        .map(|s| (s.candle, s.validity))
        .unzip();

    let mut inconsistent = 0;
    for candle in &candles {
        if let Err(e) = candle.validate() {
            inconsistent += 1;
            debug!("Candle at time {}: {}", candle.time, e);
        }
    }
    if inconsistent > 0 {
        warn!("{} candles have inconsistent OHLCV values", inconsistent);
    }

    let history = SanitizedHistory {
        candles,
        validity,
        dropped,
        inconsistent,
    };

    let repaired = history.repaired();
    if repaired > 0 {
        warn!("Repaired {} candles with missing fields", repaired);
    }
    debug!(
        "Sanitized {} raw rows into {} candles ({} dropped)",
        raw.len(),
        history.candles.len(),
        dropped
    );

    history
}

/// Convert raw candles without repair
///
/// Missing price fields become NaN gaps and missing volume becomes NaN as
/// well; rows without a usable time are skipped. Order and duplicates are
/// left as supplied.
pub fn passthrough(raw: &[RawCandle]) -> Vec<Candle> {
    let field = |value: Option<f64>| value.unwrap_or(f64::NAN);
    raw.iter()
        .filter_map(|row| {
            let time = normalize_timestamp(row.time?)?;
            Some(Candle {
                time,
                open: field(row.open),
                high: field(row.high),
                low: field(row.low),
                close: field(row.close),
                volume: field(row.volume),
            })
        })
        .collect()
}

/// Union two histories by time; `incoming` wins on collision
pub fn merge_history(existing: &[Candle], incoming: &[Candle]) -> Vec<Candle> {
    let mut by_time: BTreeMap<i64, Candle> = existing.iter().map(|c| (c.time, *c)).collect();
    by_time.extend(incoming.iter().map(|c| (c.time, *c)));
    by_time.into_values().collect()
}
