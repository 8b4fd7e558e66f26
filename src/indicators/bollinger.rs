//! Bollinger Bands

use serde::Serialize;

use super::round_to;
use super::source::source_values;
use crate::settings::BollingerSettings;
use crate::types::{collect_series, Series};
use crate::Candle;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BollingerOutput {
    pub basis: Series,
    pub upper: Series,
    pub lower: Series,
}

/// Unrounded (basis, upper, lower) at the index of each full window
pub fn bollinger_bands(
    values: &[Option<f64>],
    period: usize,
    num_std: f64,
) -> Vec<Option<(f64, f64, f64)>> {
    let mut result = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }

    for i in period - 1..values.len() {
        let window: Option<Vec<f64>> = values[i + 1 - period..=i].iter().copied().collect();
        let Some(window) = window else {
            continue;
        };

        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|&x| {
                let diff = x - mean;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        let std_dev = variance.sqrt();

        result[i] = Some((mean, mean + num_std * std_dev, mean - num_std * std_dev));
    }

    result
}

/// Bollinger Bands shifted by `offset` bars and rounded to `precision`
///
/// Points whose shifted index falls outside the candle sequence are dropped.
pub fn compute_bollinger(candles: &[Candle], settings: &BollingerSettings) -> BollingerOutput {
    if settings.length == 0 || candles.len() < settings.length {
        return BollingerOutput::default();
    }

    let values = source_values(candles, settings.source, settings.length);
    let bands = bollinger_bands(&values, settings.length, settings.std_dev);
    let n = candles.len() as i64;

    let shifted: Vec<(i64, (f64, f64, f64))> = bands
        .iter()
        .enumerate()
        .filter_map(|(i, band)| {
            let band = (*band)?;
            let target = i64::try_from(i).ok()?.checked_add(settings.offset)?;
            (0..n)
                .contains(&target)
                .then(|| (candles[target as usize].time, band))
        })
        .collect();

    let precision = settings.precision;
    let line = |pick: fn(&(f64, f64, f64)) -> f64| {
        collect_series(
            shifted
                .iter()
                .map(|(time, band)| (*time, Some(round_to(pick(band), precision)))),
        )
    };

    BollingerOutput {
        basis: line(|b| b.0),
        upper: line(|b| b.1),
        lower: line(|b| b.2),
    }
}
