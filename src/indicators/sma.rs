//! Simple Moving Average

use super::source::source_values;
use super::window::rolling_mean;
use crate::settings::SmaSettings;
use crate::types::{series_from_values, Series};
use crate::Candle;

/// Calculate Simple Moving Average over raw values
///
/// A point is produced only when all `period` values of its window are
/// present; partial windows are never averaged.
pub fn sma(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling_mean(values, period)
}

/// SMA of the configured source, as a plottable series
pub fn compute_sma(candles: &[Candle], settings: &SmaSettings) -> Series {
    if settings.length == 0 || candles.len() < settings.length {
        return Series::new();
    }

    let values = source_values(candles, settings.source, settings.length);
    series_from_values(candles, &sma(&values, settings.length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::source::PriceSource;
    use crate::SeriesPoint;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new_unchecked(i as i64 * 60, c, c, c, c, 10.0))
            .collect()
    }

    #[test]
    fn test_sma() {
        let values = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
        let result = sma(&values, 3);

        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert_eq!(result[2], Some(2.0));
        assert_eq!(result[3], Some(3.0));
        assert_eq!(result[4], Some(4.0));
    }

    #[test]
    fn test_compute_sma_series() {
        let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let series = compute_sma(
            &candles,
            &SmaSettings {
                length: 3,
                source: PriceSource::Close,
            },
        );

        assert_eq!(
            series,
            vec![
                SeriesPoint::new(120, 2.0),
                SeriesPoint::new(180, 3.0),
                SeriesPoint::new(240, 4.0)
            ]
        );
    }

    #[test]
    fn test_gap_skips_every_window_containing_it() {
        let candles = candles_from_closes(&[1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0, 7.0]);
        let series = compute_sma(
            &candles,
            &SmaSettings {
                length: 3,
                source: PriceSource::Close,
            },
        );

        let times: Vec<i64> = series.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![300, 360]);
        assert_eq!(series[0].value, 5.0);
    }

    #[test]
    fn test_insufficient_data_is_empty() {
        let candles = candles_from_closes(&[1.0, 2.0]);
        assert!(compute_sma(&candles, &SmaSettings::default()).is_empty());
    }

    #[test]
    fn test_duplicate_times_are_filtered() {
        let mut candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        candles[3].time = candles[2].time;
        let series = compute_sma(
            &candles,
            &SmaSettings {
                length: 2,
                source: PriceSource::Close,
            },
        );

        let times: Vec<i64> = series.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![60, 120, 240]);
    }

    #[test]
    fn test_volume_ma_source() {
        let candles = candles_from_closes(&[1.0; 6]);
        let series = compute_sma(
            &candles,
            &SmaSettings {
                length: 2,
                source: PriceSource::VolumeMa,
            },
        );
        // volume_ma needs `length` bars, then the SMA needs `length` of those
        assert_eq!(series.len(), 4);
        assert!(series.iter().all(|p| p.value == 10.0));
    }
}
