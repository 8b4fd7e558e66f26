//! Indicator settings
//!
//! One record per indicator, each carrying only its own recognised fields.
//! [`IndicatorSettings`] is the tagged sum over all of them and is what
//! configuration files deserialize into.

use serde::{Deserialize, Serialize};

use crate::error::{require_length, require_positive, SettingsError};
use crate::indicators::source::PriceSource;

/// Largest rounding precision supported by decimal rounding
pub const MAX_PRECISION: u32 = 28;

fn require_precision(indicator: &'static str, value: u32) -> Result<(), SettingsError> {
    if value > MAX_PRECISION {
        return Err(SettingsError::PrecisionTooLarge {
            indicator,
            value,
            max: MAX_PRECISION,
        });
    }
    Ok(())
}

/// Simple Moving Average settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmaSettings {
    pub length: usize,
    pub source: PriceSource,
}

impl Default for SmaSettings {
    fn default() -> Self {
        SmaSettings {
            length: 9,
            source: PriceSource::Close,
        }
    }
}

impl SmaSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        require_length("sma", "length", self.length)
    }
}

/// Secondary smoothing applied to the RSI line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SmoothingType {
    None,
    #[default]
    #[serde(rename = "SMA", alias = "sma")]
    Sma,
}

/// Relative Strength Index settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiSettings {
    pub length: usize,
    pub source: PriceSource,
    pub smoothing_type: SmoothingType,
    pub smoothing_length: usize,
    pub bb_std_dev: f64,
}

impl Default for RsiSettings {
    fn default() -> Self {
        RsiSettings {
            length: 14,
            source: PriceSource::Close,
            smoothing_type: SmoothingType::Sma,
            smoothing_length: 14,
            bb_std_dev: 2.0,
        }
    }
}

impl RsiSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        require_length("rsi", "length", self.length)?;
        if self.smoothing_type == SmoothingType::Sma {
            require_length("rsi", "smoothing_length", self.smoothing_length)?;
            require_positive("rsi", "bb_std_dev", self.bb_std_dev)?;
        }
        Ok(())
    }
}

/// Normalized MACD settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdSettings {
    pub fast_length: usize,
    pub slow_length: usize,
    pub signal_length: usize,
    pub norm_lookback: usize,
}

impl Default for MacdSettings {
    fn default() -> Self {
        MacdSettings {
            fast_length: 12,
            slow_length: 26,
            signal_length: 9,
            norm_lookback: 100,
        }
    }
}

impl MacdSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        require_length("macd", "fast_length", self.fast_length)?;
        require_length("macd", "slow_length", self.slow_length)?;
        require_length("macd", "signal_length", self.signal_length)?;
        require_length("macd", "norm_lookback", self.norm_lookback)
    }
}

/// Bollinger Bands settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerSettings {
    pub length: usize,
    pub std_dev: f64,
    pub source: PriceSource,
    /// Bars to shift the plotted bands by; negative shifts backwards
    pub offset: i64,
    pub precision: u32,
}

impl Default for BollingerSettings {
    fn default() -> Self {
        BollingerSettings {
            length: 20,
            std_dev: 2.0,
            source: PriceSource::Close,
            offset: 0,
            precision: 2,
        }
    }
}

impl BollingerSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        require_length("bollinger", "length", self.length)?;
        require_positive("bollinger", "std_dev", self.std_dev)?;
        require_precision("bollinger", self.precision)
    }
}

/// Stochastic Oscillator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticSettings {
    pub length: usize,
    pub d_length: usize,
    pub precision: u32,
}

impl Default for StochasticSettings {
    fn default() -> Self {
        StochasticSettings {
            length: 14,
            d_length: 3,
            precision: 2,
        }
    }
}

impl StochasticSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        require_length("stochastic", "length", self.length)?;
        require_length("stochastic", "d_length", self.d_length)?;
        require_precision("stochastic", self.precision)
    }
}

/// Average True Range settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtrSettings {
    pub length: usize,
}

impl Default for AtrSettings {
    fn default() -> Self {
        AtrSettings { length: 14 }
    }
}

impl AtrSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        require_length("atr", "length", self.length)
    }
}

/// SuperTrend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperTrendSettings {
    pub atr_length: usize,
    pub factor: f64,
}

impl Default for SuperTrendSettings {
    fn default() -> Self {
        SuperTrendSettings {
            atr_length: 10,
            factor: 3.0,
        }
    }
}

impl SuperTrendSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        require_length("supertrend", "atr_length", self.atr_length)?;
        require_positive("supertrend", "factor", self.factor)
    }
}

/// Ichimoku Cloud settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IchimokuSettings {
    pub conversion_length: usize,
    pub base_length: usize,
    pub span_b_length: usize,
    pub lagging_length: usize,
}

impl Default for IchimokuSettings {
    fn default() -> Self {
        IchimokuSettings {
            conversion_length: 9,
            base_length: 26,
            span_b_length: 52,
            lagging_length: 26,
        }
    }
}

impl IchimokuSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        require_length("ichimoku", "conversion_length", self.conversion_length)?;
        require_length("ichimoku", "base_length", self.base_length)?;
        require_length("ichimoku", "span_b_length", self.span_b_length)?;
        require_length("ichimoku", "lagging_length", self.lagging_length)
    }
}

/// True Strength Index settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TsiSettings {
    pub long_length: usize,
    pub short_length: usize,
    pub signal_length: usize,
}

impl Default for TsiSettings {
    fn default() -> Self {
        TsiSettings {
            long_length: 25,
            short_length: 13,
            signal_length: 13,
        }
    }
}

impl TsiSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        require_length("tsi", "long_length", self.long_length)?;
        require_length("tsi", "short_length", self.short_length)?;
        require_length("tsi", "signal_length", self.signal_length)
    }

    /// Leading bars hidden from both output lines
    pub fn warmup(&self) -> usize {
        self.long_length
            .saturating_add(self.short_length)
            .saturating_add(self.signal_length)
    }
}

/// Volume Profile settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeProfileSettings {
    pub price_bins: usize,
}

impl Default for VolumeProfileSettings {
    fn default() -> Self {
        VolumeProfileSettings { price_bins: 40 }
    }
}

impl VolumeProfileSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        require_length("volume_profile", "price_bins", self.price_bins)
    }
}

/// Settings for any supported indicator, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndicatorSettings {
    Sma(SmaSettings),
    Rsi(RsiSettings),
    Macd(MacdSettings),
    Bollinger(BollingerSettings),
    Stochastic(StochasticSettings),
    Atr(AtrSettings),
    #[serde(rename = "supertrend")]
    SuperTrend(SuperTrendSettings),
    Ichimoku(IchimokuSettings),
    Tsi(TsiSettings),
    VolumeProfile(VolumeProfileSettings),
}

impl IndicatorSettings {
    /// Short indicator name, matching the `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            IndicatorSettings::Sma(_) => "sma",
            IndicatorSettings::Rsi(_) => "rsi",
            IndicatorSettings::Macd(_) => "macd",
            IndicatorSettings::Bollinger(_) => "bollinger",
            IndicatorSettings::Stochastic(_) => "stochastic",
            IndicatorSettings::Atr(_) => "atr",
            IndicatorSettings::SuperTrend(_) => "supertrend",
            IndicatorSettings::Ichimoku(_) => "ichimoku",
            IndicatorSettings::Tsi(_) => "tsi",
            IndicatorSettings::VolumeProfile(_) => "volume_profile",
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        match self {
            IndicatorSettings::Sma(s) => s.validate(),
            IndicatorSettings::Rsi(s) => s.validate(),
            IndicatorSettings::Macd(s) => s.validate(),
            IndicatorSettings::Bollinger(s) => s.validate(),
            IndicatorSettings::Stochastic(s) => s.validate(),
            IndicatorSettings::Atr(s) => s.validate(),
            IndicatorSettings::SuperTrend(s) => s.validate(),
            IndicatorSettings::Ichimoku(s) => s.validate(),
            IndicatorSettings::Tsi(s) => s.validate(),
            IndicatorSettings::VolumeProfile(s) => s.validate(),
        }
    }

    /// Every indicator with its default settings
    pub fn all_defaults() -> Vec<IndicatorSettings> {
        vec![
            IndicatorSettings::Sma(SmaSettings::default()),
            IndicatorSettings::Rsi(RsiSettings::default()),
            IndicatorSettings::Macd(MacdSettings::default()),
            IndicatorSettings::Bollinger(BollingerSettings::default()),
            IndicatorSettings::Stochastic(StochasticSettings::default()),
            IndicatorSettings::Atr(AtrSettings::default()),
            IndicatorSettings::SuperTrend(SuperTrendSettings::default()),
            IndicatorSettings::Ichimoku(IchimokuSettings::default()),
            IndicatorSettings::Tsi(TsiSettings::default()),
            IndicatorSettings::VolumeProfile(VolumeProfileSettings::default()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        for settings in IndicatorSettings::all_defaults() {
            assert!(
                settings.validate().is_ok(),
                "{} defaults should validate",
                settings.name()
            );
        }
    }

    #[test]
    fn test_zero_length_rejected() {
        let settings = IndicatorSettings::Sma(SmaSettings {
            length: 0,
            ..Default::default()
        });
        assert_eq!(
            settings.validate(),
            Err(SettingsError::ZeroLength {
                indicator: "sma",
                param: "length"
            })
        );
    }

    #[test]
    fn test_non_positive_multipliers_rejected() {
        let bb = BollingerSettings {
            std_dev: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            bb.validate(),
            Err(SettingsError::NonPositive { param: "std_dev", .. })
        ));

        let st = SuperTrendSettings {
            factor: f64::NAN,
            ..Default::default()
        };
        assert!(st.validate().is_err());
    }

    #[test]
    fn test_rsi_smoothing_fields_ignored_without_smoothing() {
        let rsi = RsiSettings {
            smoothing_type: SmoothingType::None,
            smoothing_length: 0,
            ..Default::default()
        };
        assert!(rsi.validate().is_ok());
    }

    #[test]
    fn test_precision_limit() {
        let stoch = StochasticSettings {
            precision: MAX_PRECISION + 1,
            ..Default::default()
        };
        assert!(matches!(
            stoch.validate(),
            Err(SettingsError::PrecisionTooLarge { .. })
        ));
    }

    #[test]
    fn test_tagged_deserialization_fills_defaults() {
        let settings: IndicatorSettings =
            serde_json::from_str(r#"{"type": "rsi", "length": 7, "smoothing_type": "None"}"#)
                .unwrap();
        assert_eq!(
            settings,
            IndicatorSettings::Rsi(RsiSettings {
                length: 7,
                smoothing_type: SmoothingType::None,
                ..Default::default()
            })
        );

        let settings: IndicatorSettings =
            serde_json::from_str(r#"{"type": "supertrend", "factor": 2.5}"#).unwrap();
        assert_eq!(settings.name(), "supertrend");

        let settings: IndicatorSettings =
            serde_json::from_str(r#"{"type": "sma", "source": "volume_ma", "length": 20}"#)
                .unwrap();
        assert_eq!(
            settings,
            IndicatorSettings::Sma(SmaSettings {
                length: 20,
                source: PriceSource::VolumeMa,
            })
        );
    }
}
