//! Relative Strength Index (Wilder's smoothing)
//!
//! Optional SMA smoothing of the RSI line and Bollinger bands around the
//! smoothed line, as drawn in the RSI pane.

use serde::Serialize;

use super::source::source_values;
use super::window::rolling_mean;
use crate::settings::{RsiSettings, SmoothingType};
use crate::types::{series_from_values, Series};
use crate::Candle;

/// RSI pane output; every series is independently gap-filtered
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RsiOutput {
    pub rsi: Series,
    pub smoothed: Series,
    pub bb_upper: Series,
    pub bb_lower: Series,
}

/// Per-bar gains and losses; a gap at either end of a delta counts as no move
fn gains_losses(values: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    let mut gains = Vec::with_capacity(values.len());
    let mut losses = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        let delta = match (i.checked_sub(1).and_then(|p| values[p]), values[i]) {
            (Some(prev), Some(curr)) => curr - prev,
            _ => 0.0,
        };
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    (gains, losses)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss != 0.0 {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    } else if avg_gain == 0.0 {
        50.0
    } else {
        100.0
    }
}

/// Calculate RSI over raw source values
///
/// The first `period` gains/losses are averaged at index `period - 1`, then
/// Wilder's recurrence `avg = (avg * (period - 1) + x) / period` takes over.
pub fn rsi(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 || values.len() < period {
        return vec![None; values.len()];
    }

    let (gains, losses) = gains_losses(values);
    let mut result = vec![None; values.len()];

    let seed_gain: f64 = gains[..period].iter().sum();
    let seed_loss: f64 = losses[..period].iter().sum();
    let mut avg_gain = seed_gain / period as f64;
    let mut avg_loss = seed_loss / period as f64;
    result[period - 1] = Some(rsi_from_averages(avg_gain, avg_loss));

    for i in period..values.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        result[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    result
}

/// Bands of `mean ± std_dev * sigma` over each full window
///
/// Uses the population variance `E[x²] - E[x]²`, clamped at zero before the
/// square root.
fn moment_bands(
    values: &[Option<f64>],
    length: usize,
    std_dev: f64,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let mut upper = vec![None; values.len()];
    let mut lower = vec![None; values.len()];
    if length == 0 || values.len() < length {
        return (upper, lower);
    }

    for i in length - 1..values.len() {
        let window = &values[i + 1 - length..=i];
        let Some((sum, sum_sq)) = window
            .iter()
            .try_fold((0.0, 0.0), |(s, sq), v| v.map(|x| (s + x, sq + x * x)))
        else {
            continue;
        };

        let mean = sum / length as f64;
        let variance = sum_sq / length as f64 - mean * mean;
        let sigma = variance.max(0.0).sqrt();
        upper[i] = Some(mean + std_dev * sigma);
        lower[i] = Some(mean - std_dev * sigma);
    }

    (upper, lower)
}

/// RSI with optional smoothing and bands
pub fn compute_rsi(candles: &[Candle], settings: &RsiSettings) -> RsiOutput {
    if settings.length == 0 || candles.len() < settings.length {
        return RsiOutput::default();
    }

    let values = source_values(candles, settings.source, settings.length);
    let rsi_values = rsi(&values, settings.length);

    let mut output = RsiOutput {
        rsi: series_from_values(candles, &rsi_values),
        ..Default::default()
    };

    let smoothing_length = settings.smoothing_length;
    if settings.smoothing_type == SmoothingType::Sma
        && smoothing_length > 0
        && candles.len() >= smoothing_length
    {
        let smoothed = rolling_mean(&rsi_values, smoothing_length);
        let (upper, lower) = moment_bands(&smoothed, smoothing_length, settings.bb_std_dev);

        output.smoothed = series_from_values(candles, &smoothed);
        output.bb_upper = series_from_values(candles, &upper);
        output.bb_lower = series_from_values(candles, &lower);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new_unchecked(i as i64, c, c + 1.0, c - 1.0, c, 1.0))
            .collect()
    }

    fn no_smoothing(length: usize) -> RsiSettings {
        RsiSettings {
            length,
            smoothing_type: SmoothingType::None,
            ..Default::default()
        }
    }

    #[test]
    fn test_rsi_bounds() {
        let closes = vec![
            44.0, 44.25, 44.5, 43.75, 44.5, 44.25, 44.0, 43.5, 44.0, 44.5, 45.0, 45.25, 45.5, 45.0,
            44.75,
        ];
        let values: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
        let result = rsi(&values, 14);

        assert!(result[12].is_none());
        let rsi_val = result.last().unwrap().unwrap();
        assert!((0.0..=100.0).contains(&rsi_val));
    }

    #[test]
    fn test_rsi_seed_value() {
        // deltas: +1, -1, +2 over period 4 (first bar has no delta)
        let values = vec![Some(10.0), Some(11.0), Some(10.0), Some(12.0)];
        let result = rsi(&values, 4);

        let avg_gain = 3.0 / 4.0;
        let avg_loss = 1.0 / 4.0;
        let expected = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);
        assert_relative_eq!(result[3].unwrap(), expected);
        assert_relative_eq!(result[3].unwrap(), 75.0);
    }

    #[test]
    fn test_rsi_wilder_recurrence() {
        let values = vec![Some(10.0), Some(11.0), Some(10.0), Some(12.0), Some(11.0)];
        let result = rsi(&values, 4);

        let avg_gain = (0.75 * 3.0 + 0.0) / 4.0;
        let avg_loss = (0.25 * 3.0 + 1.0) / 4.0;
        assert_relative_eq!(
            result[4].unwrap(),
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        );
    }

    #[test]
    fn test_flat_prices_give_fifty() {
        let candles = candles_from_closes(&[100.0; 30]);
        let output = compute_rsi(&candles, &no_smoothing(14));

        assert_eq!(output.rsi.len(), 17);
        assert!(output.rsi.iter().all(|p| p.value == 50.0));
    }

    #[test]
    fn test_rising_prices_give_hundred() {
        let closes: Vec<f64> = (100..=130).map(|x| x as f64).collect();
        let candles = candles_from_closes(&closes);
        let output = compute_rsi(&candles, &no_smoothing(14));

        assert_eq!(output.rsi.first().unwrap().time, 13);
        assert!(output.rsi.iter().all(|p| p.value == 100.0));
    }

    #[test]
    fn test_falling_prices_give_zero() {
        let closes: Vec<f64> = (100..=130).rev().map(|x| x as f64).collect();
        let candles = candles_from_closes(&closes);
        let output = compute_rsi(&candles, &no_smoothing(14));

        assert!(output.rsi.iter().all(|p| p.value == 0.0));
    }

    #[test]
    fn test_gap_counts_as_no_move() {
        let values = vec![Some(10.0), None, Some(12.0), Some(13.0)];
        let (gains, losses) = gains_losses(&values);
        assert_eq!(gains, vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(losses, vec![0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_smoothing_and_bands() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();
        let candles = candles_from_closes(&closes);
        let settings = RsiSettings {
            length: 14,
            smoothing_length: 5,
            ..Default::default()
        };
        let output = compute_rsi(&candles, &settings);

        // RSI starts at 13, smoothing at 17, bands at 21
        assert_eq!(output.rsi.len(), 47);
        assert_eq!(output.smoothed.first().unwrap().time, 17);
        assert_eq!(output.bb_upper.first().unwrap().time, 21);
        assert_eq!(output.bb_upper.len(), output.bb_lower.len());

        for (upper, lower) in output.bb_upper.iter().zip(&output.bb_lower) {
            assert_eq!(upper.time, lower.time);
            assert!(upper.value >= lower.value);
        }

        let at = |series: &Series, time: i64| series.iter().find(|p| p.time == time).unwrap().value;
        let manual: f64 = (13..=17).map(|t| at(&output.rsi, t)).sum::<f64>() / 5.0;
        assert_relative_eq!(at(&output.smoothed, 17), manual, epsilon = 1e-9);
    }

    #[test]
    fn test_no_smoothing_leaves_secondary_series_empty() {
        let candles = candles_from_closes(&[1.0, 2.0, 3.0, 2.0, 1.0, 2.0]);
        let output = compute_rsi(&candles, &no_smoothing(3));
        assert_eq!(output.rsi.len(), 4);
        assert!(output.smoothed.is_empty());
        assert!(output.bb_upper.is_empty());
        assert!(output.bb_lower.is_empty());
    }
}
