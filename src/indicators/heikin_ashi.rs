//! Heikin-Ashi candle transform
//!
//! Expects sanitized candles; a non-finite field propagates into every
//! following bar through the open recurrence.

use crate::Candle;

/// Transform OHLC candles into Heikin-Ashi candles
///
/// Time and volume are carried over unchanged.
pub fn heikin_ashi(candles: &[Candle]) -> Vec<Candle> {
    let mut result: Vec<Candle> = Vec::with_capacity(candles.len());

    for candle in candles {
        let ha_close = (candle.open + candle.high + candle.low + candle.close) / 4.0;
        let ha_open = match result.last() {
            Some(prev) => (prev.open + prev.close) / 2.0,
            None => (candle.open + candle.close) / 2.0,
        };

        result.push(Candle {
            time: candle.time,
            open: ha_open,
            high: candle.high.max(ha_open).max(ha_close),
            low: candle.low.min(ha_open).min(ha_close),
            close: ha_close,
            volume: candle.volume,
        });
    }

    result
}
