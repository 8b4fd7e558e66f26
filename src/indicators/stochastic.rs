//! Stochastic Oscillator
//!
//! %K = 100 * (close - lowest low) / (highest high - lowest low)
//! %D = SMA of %K

use serde::Serialize;

use super::round_to;
use super::source::{source_values, PriceSource};
use super::window::{rolling_max, rolling_mean, rolling_min};
use crate::settings::StochasticSettings;
use crate::types::{series_from_values, Series};
use crate::Candle;

/// %K assigned to a window with no price range
pub const FLAT_RANGE_K: f64 = 50.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StochasticOutput {
    pub k: Series,
    pub d: Series,
}

/// Raw %K and %D, index-aligned with the candles
pub fn stochastic(
    candles: &[Candle],
    k_period: usize,
    d_period: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let highs = source_values(candles, PriceSource::High, k_period);
    let lows = source_values(candles, PriceSource::Low, k_period);
    let closes = source_values(candles, PriceSource::Close, k_period);

    let highest = rolling_max(&highs, k_period);
    let lowest = rolling_min(&lows, k_period);

    let k: Vec<Option<f64>> = (0..candles.len())
        .map(|i| {
            let (high, low, close) = (highest[i]?, lowest[i]?, closes[i]?);
            let range = high - low;
            if range != 0.0 {
                Some(100.0 * (close - low) / range)
            } else {
                Some(FLAT_RANGE_K)
            }
        })
        .collect();
    let d = rolling_mean(&k, d_period);

    (k, d)
}

/// Stochastic %K / %D rounded to `precision`
pub fn compute_stochastic(candles: &[Candle], settings: &StochasticSettings) -> StochasticOutput {
    if settings.length == 0 || candles.len() < settings.length {
        return StochasticOutput::default();
    }

    let (k, d) = stochastic(candles, settings.length, settings.d_length);
    let rounded = |values: Vec<Option<f64>>| -> Vec<Option<f64>> {
        values
            .into_iter()
            .map(|v| v.map(|x| round_to(x, settings.precision)))
            .collect()
    };

    StochasticOutput {
        k: series_from_values(candles, &rounded(k)),
        d: series_from_values(candles, &rounded(d)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(high: &[f64], low: &[f64], close: &[f64]) -> Vec<Candle> {
        (0..high.len())
            .map(|i| Candle::new_unchecked(i as i64, close[i], high[i], low[i], close[i], 0.0))
            .collect()
    }

    #[test]
    fn test_stochastic() {
        let high = vec![5.0, 6.0, 7.0, 8.0, 9.0, 8.0, 7.0, 8.0, 9.0, 10.0];
        let low = vec![4.0, 5.0, 6.0, 7.0, 8.0, 7.0, 6.0, 7.0, 8.0, 9.0];
        let close = vec![4.5, 5.5, 6.5, 7.5, 8.5, 7.5, 6.5, 7.5, 8.5, 9.5];
        let candles = bars(&high, &low, &close);

        let (k, d) = stochastic(&candles, 5, 3);

        assert!(k[3].is_none());
        // window 0..=4: low 4, high 9, close 8.5
        assert_eq!(k[4], Some(90.0));
        assert!(d[5].is_none());
        assert!(d[6].is_some());

        for value in k.iter().chain(d.iter()).flatten() {
            assert!((0.0..=100.0).contains(value), "out of range: {}", value);
        }
    }

    #[test]
    fn test_flat_window_is_fifty() {
        let candles = bars(&[10.0; 5], &[10.0; 5], &[10.0; 5]);
        let output = compute_stochastic(
            &candles,
            &StochasticSettings {
                length: 3,
                d_length: 2,
                precision: 2,
            },
        );

        assert_eq!(output.k.len(), 3);
        assert!(output.k.iter().all(|p| p.value == FLAT_RANGE_K));
        assert_eq!(output.d.len(), 2);
        assert!(output.d.iter().all(|p| p.value == FLAT_RANGE_K));
    }

    #[test]
    fn test_invalid_bar_blocks_windows() {
        let mut candles = bars(
            &[5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
            &[4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
            &[4.5, 5.5, 6.5, 7.5, 8.5, 9.5],
        );
        candles[2].low = f64::NAN;
        let (k, d) = stochastic(&candles, 2, 2);

        assert!(k[1].is_some());
        assert!(k[2].is_none());
        assert!(k[3].is_none());
        assert!(k[4].is_some());
        assert!(d[4].is_none());
        assert!(d[5].is_some());
    }

    #[test]
    fn test_precision_rounding() {
        let candles = bars(&[3.0, 3.0, 3.0], &[0.0, 0.0, 0.0], &[1.0, 2.0, 1.0]);
        let output = compute_stochastic(
            &candles,
            &StochasticSettings {
                length: 3,
                d_length: 1,
                precision: 2,
            },
        );
        assert_eq!(output.k[0].value, 33.33);
    }
}
