//! Indicator settings errors

use thiserror::Error;

/// Malformed indicator settings
///
/// These are caller contract violations; numeric degeneracies in the data
/// itself never produce an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
    /// A window or smoothing length was zero
    #[error("{indicator}: {param} must be > 0")]
    ZeroLength {
        indicator: &'static str,
        param: &'static str,
    },

    /// A multiplier (std-dev, factor) was non-positive or not finite
    #[error("{indicator}: {param} must be a positive finite number, got {value}")]
    NonPositive {
        indicator: &'static str,
        param: &'static str,
        value: f64,
    },

    /// Rounding precision beyond what decimal rounding supports
    #[error("{indicator}: precision {value} exceeds the maximum of {max}")]
    PrecisionTooLarge {
        indicator: &'static str,
        value: u32,
        max: u32,
    },
}

impl SettingsError {
    pub(crate) fn zero_length(indicator: &'static str, param: &'static str) -> Self {
        SettingsError::ZeroLength { indicator, param }
    }

    pub(crate) fn non_positive(indicator: &'static str, param: &'static str, value: f64) -> Self {
        SettingsError::NonPositive {
            indicator,
            param,
            value,
        }
    }
}

/// Fail when `value` is zero
pub(crate) fn require_length(
    indicator: &'static str,
    param: &'static str,
    value: usize,
) -> Result<(), SettingsError> {
    if value == 0 {
        return Err(SettingsError::zero_length(indicator, param));
    }
    Ok(())
}

/// Fail when `value` is not a positive finite number
pub(crate) fn require_positive(
    indicator: &'static str,
    param: &'static str,
    value: f64,
) -> Result<(), SettingsError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SettingsError::non_positive(indicator, param, value));
    }
    Ok(())
}
