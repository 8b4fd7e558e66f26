//! Volume Profile (price-by-volume)
//!
//! Buckets every candle's volume by its typical price `(H+L+C)/3` into
//! equal-width bins spanning the whole input range.

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use super::source::{candle_value, finite, PriceSource};
use crate::settings::VolumeProfileSettings;
use crate::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeBin {
    pub low: f64,
    pub high: f64,
    pub volume: f64,
    /// Volume relative to the fullest bin, in [0, 1]
    pub normalized_volume: f64,
    pub center: f64,
}

/// Bin index of `price`, clamped into `[0, bins)`
fn bin_index(price: f64, min: f64, bin_size: f64, bins: usize) -> usize {
    let raw = ((price - min) / bin_size).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(bins - 1)
    }
}

/// Volume profile bins, lowest price first
///
/// Empty when there is no price range or no volume at all.
pub fn compute_volume_profile(candles: &[Candle], settings: &VolumeProfileSettings) -> Vec<VolumeBin> {
    let bins = settings.price_bins;
    if bins == 0 {
        return Vec::new();
    }

    let samples: Vec<(f64, f64)> = candles
        .iter()
        .filter_map(|c| {
            let price = candle_value(c, PriceSource::Hlc3)?;
            Some((price, finite(c.volume).unwrap_or(0.0)))
        })
        .collect();

    let (min, max) = match samples.iter().map(|(price, _)| *price).minmax() {
        MinMaxResult::MinMax(min, max) if max > min => (min, max),
        _ => return Vec::new(),
    };

    let bin_size = (max - min) / bins as f64;
    let mut volumes = vec![0.0; bins];
    for (price, volume) in &samples {
        volumes[bin_index(*price, min, bin_size, bins)] += volume;
    }

    let max_volume = volumes.iter().copied().fold(0.0, f64::max);
    if max_volume <= 0.0 {
        return Vec::new();
    }

    volumes
        .into_iter()
        .enumerate()
        .map(|(i, volume)| {
            let low = min + i as f64 * bin_size;
            let high = min + (i + 1) as f64 * bin_size;
            VolumeBin {
                low,
                high,
                volume,
                normalized_volume: volume / max_volume,
                center: (low + high) / 2.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat(time: i64, price: f64, volume: f64) -> Candle {
        Candle::new_unchecked(time, price, price, price, price, volume)
    }

    fn settings(price_bins: usize) -> VolumeProfileSettings {
        VolumeProfileSettings { price_bins }
    }

    #[test]
    fn test_bins_and_normalization() {
        let candles = vec![flat(0, 10.0, 100.0), flat(1, 15.0, 50.0), flat(2, 20.0, 300.0)];
        let profile = compute_volume_profile(&candles, &settings(2));

        assert_eq!(profile.len(), 2);
        assert_relative_eq!(profile[0].low, 10.0);
        assert_relative_eq!(profile[0].high, 15.0);
        assert_relative_eq!(profile[0].center, 12.5);
        assert_relative_eq!(profile[0].volume, 100.0);
        // 15 sits on the boundary and 20 is clamped into the top bin
        assert_relative_eq!(profile[1].volume, 350.0);
        assert_relative_eq!(profile[1].normalized_volume, 1.0);
        assert_relative_eq!(profile[0].normalized_volume, 100.0 / 350.0);
    }

    #[test]
    fn test_volume_is_conserved() {
        let candles: Vec<Candle> = (0..200)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.37).sin() * 12.0;
                Candle::new_unchecked(i, c, c + 1.5, c - 2.0, c, 10.0 + (i % 7) as f64)
            })
            .collect();
        let profile = compute_volume_profile(&candles, &VolumeProfileSettings::default());

        assert_eq!(profile.len(), 40);
        let total: f64 = candles.iter().map(|c| c.volume).sum();
        let binned: f64 = profile.iter().map(|b| b.volume).sum();
        assert_relative_eq!(total, binned, epsilon = 1e-9);

        for pair in profile.windows(2) {
            assert!(pair[0].low < pair[1].low);
        }
    }

    #[test]
    fn test_degenerate_range_is_empty() {
        let candles = vec![flat(0, 10.0, 5.0), flat(1, 10.0, 7.0)];
        assert!(compute_volume_profile(&candles, &settings(10)).is_empty());
        assert!(compute_volume_profile(&[], &settings(10)).is_empty());
    }

    #[test]
    fn test_zero_volume_is_empty() {
        let candles = vec![flat(0, 10.0, 0.0), flat(1, 12.0, f64::NAN)];
        assert!(compute_volume_profile(&candles, &settings(4)).is_empty());
    }

    #[test]
    fn test_invalid_typical_price_is_skipped() {
        let mut candles = vec![flat(0, 10.0, 1.0), flat(1, 20.0, 2.0), flat(2, 30.0, 4.0)];
        candles[2].high = f64::NAN;
        let profile = compute_volume_profile(&candles, &settings(2));

        let binned: f64 = profile.iter().map(|b| b.volume).sum();
        assert_relative_eq!(binned, 3.0);
        assert_relative_eq!(profile[1].high, 20.0);
    }
}
