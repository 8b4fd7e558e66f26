//! Indicator evaluation engine
//!
//! Dispatches [`IndicatorSettings`] to the matching indicator and evaluates
//! batches of indicators over the same candle history. Indicators share no
//! state, so a batch can run on the rayon pool without synchronisation.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::SettingsError;
use crate::indicators::{
    compute_atr, compute_bollinger, compute_ichimoku, compute_macd, compute_rsi, compute_sma,
    compute_stochastic, compute_supertrend, compute_tsi, compute_volume_profile, BollingerOutput,
    IchimokuOutput, MacdOutput, RsiOutput, StochasticOutput, SuperTrendPoint, TsiOutput, VolumeBin,
};
use crate::settings::IndicatorSettings;
use crate::types::Series;
use crate::Candle;

/// Output of a single indicator evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum IndicatorOutput {
    Sma(Series),
    Rsi(RsiOutput),
    Macd(MacdOutput),
    Bollinger(BollingerOutput),
    Stochastic(StochasticOutput),
    Atr(Series),
    #[serde(rename = "supertrend")]
    SuperTrend(Vec<SuperTrendPoint>),
    Ichimoku(IchimokuOutput),
    Tsi(TsiOutput),
    VolumeProfile(Vec<VolumeBin>),
}

impl IndicatorOutput {
    /// Total number of points (or bins) across all output lines
    pub fn point_count(&self) -> usize {
        match self {
            IndicatorOutput::Sma(s) | IndicatorOutput::Atr(s) => s.len(),
            IndicatorOutput::Rsi(o) => o.rsi.len() + o.smoothed.len() + o.bb_upper.len() + o.bb_lower.len(),
            IndicatorOutput::Macd(o) => o.macd.len() + o.signal.len() + o.histogram.len(),
            IndicatorOutput::Bollinger(o) => o.basis.len() + o.upper.len() + o.lower.len(),
            IndicatorOutput::Stochastic(o) => o.k.len() + o.d.len(),
            IndicatorOutput::SuperTrend(points) => points.len(),
            IndicatorOutput::Ichimoku(o) => {
                o.tenkan.len() + o.kijun.len() + o.span_a.len() + o.span_b.len() + o.chikou.len()
            }
            IndicatorOutput::Tsi(o) => o.tsi.len() + o.signal.len(),
            IndicatorOutput::VolumeProfile(bins) => bins.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }
}

/// An evaluated indicator together with the settings that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorResult {
    pub settings: IndicatorSettings,
    pub output: IndicatorOutput,
}

/// Evaluate one indicator; settings are validated first
pub fn compute(
    candles: &[Candle],
    settings: &IndicatorSettings,
) -> Result<IndicatorOutput, SettingsError> {
    settings.validate()?;

    let output = match settings {
        IndicatorSettings::Sma(s) => IndicatorOutput::Sma(compute_sma(candles, s)),
        IndicatorSettings::Rsi(s) => IndicatorOutput::Rsi(compute_rsi(candles, s)),
        IndicatorSettings::Macd(s) => IndicatorOutput::Macd(compute_macd(candles, s)),
        IndicatorSettings::Bollinger(s) => IndicatorOutput::Bollinger(compute_bollinger(candles, s)),
        IndicatorSettings::Stochastic(s) => {
            IndicatorOutput::Stochastic(compute_stochastic(candles, s))
        }
        IndicatorSettings::Atr(s) => IndicatorOutput::Atr(compute_atr(candles, s)),
        IndicatorSettings::SuperTrend(s) => {
            IndicatorOutput::SuperTrend(compute_supertrend(candles, s))
        }
        IndicatorSettings::Ichimoku(s) => IndicatorOutput::Ichimoku(compute_ichimoku(candles, s)),
        IndicatorSettings::Tsi(s) => IndicatorOutput::Tsi(compute_tsi(candles, s)),
        IndicatorSettings::VolumeProfile(s) => {
            IndicatorOutput::VolumeProfile(compute_volume_profile(candles, s))
        }
    };

    debug!(
        "{}: {} candles -> {} points",
        settings.name(),
        candles.len(),
        output.point_count()
    );

    Ok(output)
}

/// Evaluate every indicator over the same candles, preserving input order
///
/// All settings are validated before any evaluation starts.
pub fn compute_all(
    candles: &[Candle],
    indicators: &[IndicatorSettings],
    parallel: bool,
) -> Result<Vec<IndicatorResult>, SettingsError> {
    for settings in indicators {
        settings.validate()?;
    }

    let evaluate = |settings: &IndicatorSettings| {
        compute(candles, settings).map(|output| IndicatorResult {
            settings: settings.clone(),
            output,
        })
    };

    if parallel {
        indicators.par_iter().map(evaluate).collect()
    } else {
        indicators.iter().map(evaluate).collect()
    }
}
