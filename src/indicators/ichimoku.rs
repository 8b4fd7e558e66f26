//! Ichimoku Cloud
//!
//! Conversion (tenkan) and base (kijun) lines are rolling high/low midpoints.
//! Both leading spans are read `base_length` bars back; the lagging span reads
//! `lagging_length` bars ahead. The forward plot offset itself is left to the
//! renderer.

use serde::Serialize;

use super::source::{source_values, PriceSource};
use super::window::rolling_midpoint;
use crate::settings::IchimokuSettings;
use crate::types::{series_from_values, Series};
use crate::Candle;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IchimokuOutput {
    pub tenkan: Series,
    pub kijun: Series,
    pub span_a: Series,
    pub span_b: Series,
    pub chikou: Series,
}

/// Value `shift` bars back, or a gap before the start
fn lagged(values: &[Option<f64>], shift: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| i.checked_sub(shift).and_then(|j| values[j]))
        .collect()
}

pub fn compute_ichimoku(candles: &[Candle], settings: &IchimokuSettings) -> IchimokuOutput {
    let n = candles.len();
    if n == 0 {
        return IchimokuOutput::default();
    }

    let highs = source_values(candles, PriceSource::High, 0);
    let lows = source_values(candles, PriceSource::Low, 0);
    let closes = source_values(candles, PriceSource::Close, 0);

    let tenkan = rolling_midpoint(&highs, &lows, settings.conversion_length);
    let kijun = rolling_midpoint(&highs, &lows, settings.base_length);
    let span_b_mid = rolling_midpoint(&highs, &lows, settings.span_b_length);

    let shift = settings.base_length;
    let mid_line: Vec<Option<f64>> = tenkan
        .iter()
        .zip(&kijun)
        .map(|(t, k)| Some(((*t)? + (*k)?) / 2.0))
        .collect();
    let span_a = lagged(&mid_line, shift);
    let span_b = lagged(&span_b_mid, shift);

    let lag = settings.lagging_length;
    let chikou: Vec<Option<f64>> = (0..n)
        .map(|i| i.checked_add(lag).and_then(|j| closes.get(j)).copied().flatten())
        .collect();

    IchimokuOutput {
        tenkan: series_from_values(candles, &tenkan),
        kijun: series_from_values(candles, &kijun),
        span_a: series_from_values(candles, &span_a),
        span_b: series_from_values(candles, &span_b),
        chikou: series_from_values(candles, &chikou),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let mid = 100.0 + i as f64;
                Candle::new_unchecked(i as i64, mid, mid + 1.0, mid - 1.0, mid, 0.0)
            })
            .collect()
    }

    fn small() -> IchimokuSettings {
        IchimokuSettings {
            conversion_length: 2,
            base_length: 3,
            span_b_length: 4,
            lagging_length: 2,
        }
    }

    #[test]
    fn test_conversion_and_base_lines() {
        let output = compute_ichimoku(&ramp(10), &small());

        assert_eq!(output.tenkan.len(), 9);
        assert_eq!(output.tenkan[0].time, 1);
        // window 0..=1: high 102, low 99
        assert_relative_eq!(output.tenkan[0].value, 100.5);

        assert_eq!(output.kijun.len(), 8);
        assert_eq!(output.kijun[0].time, 2);
        assert_relative_eq!(output.kijun[0].value, 101.0);
    }

    #[test]
    fn test_leading_spans_read_back() {
        let candles = ramp(10);
        let output = compute_ichimoku(&candles, &small());

        // span A at i needs tenkan and kijun at i - 3, both valid from index 2
        assert_eq!(output.span_a[0].time, 5);
        let tenkan_2 = (103.0 + 100.0) / 2.0;
        let kijun_2 = (103.0 + 99.0) / 2.0;
        assert_relative_eq!(output.span_a[0].value, (tenkan_2 + kijun_2) / 2.0);

        // span B window of 4 is first valid at 3, read at 6
        assert_eq!(output.span_b[0].time, 6);
        assert_relative_eq!(output.span_b[0].value, (104.0 + 99.0) / 2.0);
        assert_eq!(output.span_b.last().unwrap().time, 9);
    }

    #[test]
    fn test_lagging_span_reads_ahead() {
        let candles = ramp(10);
        let output = compute_ichimoku(&candles, &small());

        assert_eq!(output.chikou.len(), 8);
        assert_eq!(output.chikou[0].time, 0);
        assert_eq!(output.chikou[0].value, candles[2].close);
        assert_eq!(output.chikou.last().unwrap().time, 7);
    }

    #[test]
    fn test_invalid_high_blocks_windows_and_skips_close() {
        let mut candles = ramp(10);
        candles[4].high = f64::NAN;
        candles[6].close = f64::INFINITY;
        let output = compute_ichimoku(&candles, &small());

        let tenkan_times: Vec<i64> = output.tenkan.iter().map(|p| p.time).collect();
        assert_eq!(tenkan_times, vec![1, 2, 3, 6, 7, 8, 9]);

        let chikou_times: Vec<i64> = output.chikou.iter().map(|p| p.time).collect();
        assert!(!chikou_times.contains(&4));
        assert_eq!(chikou_times.len(), 7);
    }

    #[test]
    fn test_lagging_length_beyond_history() {
        let settings = IchimokuSettings {
            lagging_length: usize::MAX,
            ..small()
        };
        let output = compute_ichimoku(&ramp(30), &settings);

        assert!(output.chikou.is_empty());
        assert_eq!(output.tenkan.len(), 29);
    }

    #[test]
    fn test_short_history() {
        let output = compute_ichimoku(&ramp(5), &IchimokuSettings::default());
        assert!(output.tenkan.is_empty());
        assert!(output.kijun.is_empty());
        assert!(output.span_a.is_empty());
        assert!(output.span_b.is_empty());
        assert!(output.chikou.is_empty());
    }
}
