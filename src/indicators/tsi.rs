//! True Strength Index
//!
//! `tsi = 100 * EMA(EMA(pc, long), short) / EMA(EMA(|pc|, long), short)`
//! with a signal EMA on top. Both EMAs freeze across gaps.
//!
//! The display warm-up (`long + short + signal` bars) is applied as a
//! separate filter in [`compute_tsi`]; [`tsi`] itself reports every
//! computable value.

use serde::Serialize;

use super::ema::{ema, GapPolicy};
use super::source::closes;
use crate::settings::TsiSettings;
use crate::types::{collect_series, Series};
use crate::Candle;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TsiOutput {
    pub tsi: Series,
    pub signal: Series,
}

fn double_smooth(values: &[Option<f64>], long_length: usize, short_length: usize) -> Vec<Option<f64>> {
    let first = ema(values, long_length, GapPolicy::Freeze);
    ema(&first, short_length, GapPolicy::Freeze)
}

/// Unfiltered TSI and signal lines, index-aligned with `values`
pub fn tsi(
    values: &[Option<f64>],
    long_length: usize,
    short_length: usize,
    signal_length: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let change: Vec<Option<f64>> = (0..values.len())
        .map(|i| {
            let prev = values[i.checked_sub(1)?]?;
            Some(values[i]? - prev)
        })
        .collect();
    let abs_change: Vec<Option<f64>> = change.iter().map(|c| c.map(f64::abs)).collect();

    let numerator = double_smooth(&change, long_length, short_length);
    let denominator = double_smooth(&abs_change, long_length, short_length);

    let line: Vec<Option<f64>> = numerator
        .iter()
        .zip(&denominator)
        .map(|(num, den)| {
            let (num, den) = ((*num)?, (*den)?);
            (den != 0.0).then(|| 100.0 * num / den)
        })
        .collect();
    let signal = ema(&line, signal_length, GapPolicy::Freeze);

    (line, signal)
}

/// TSI and signal with the leading warm-up bars removed
pub fn compute_tsi(candles: &[Candle], settings: &TsiSettings) -> TsiOutput {
    if candles.len() < 2 {
        return TsiOutput::default();
    }

    let (line, signal) = tsi(
        &closes(candles),
        settings.long_length,
        settings.short_length,
        settings.signal_length,
    );

    let warmup = settings.warmup();
    let after_warmup = |values: &[Option<f64>]| {
        collect_series(
            candles
                .iter()
                .zip(values)
                .enumerate()
                .filter(|(i, _)| *i >= warmup)
                .map(|(_, (candle, value))| (candle.time, *value)),
        )
    };

    TsiOutput {
        tsi: after_warmup(&line),
        signal: after_warmup(&signal),
    }
}
