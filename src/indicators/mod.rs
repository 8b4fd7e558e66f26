//! Technical indicators
//!
//! Every indicator is a pure function of an immutable candle slice and its
//! settings. Internally values are index-aligned `Vec<Option<f64>>` where
//! `None` is a gap; the public `compute_*` functions return gap-free
//! [`Series`](crate::types::Series) with strictly increasing timestamps.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod heikin_ashi;
pub mod ichimoku;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod source;
pub mod stochastic;
pub mod supertrend;
pub mod tsi;
pub mod volume_profile;
pub mod window;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

pub use atr::{atr, compute_atr, true_range};
pub use bollinger::{compute_bollinger, BollingerOutput};
pub use ema::{ema, GapPolicy};
pub use heikin_ashi::heikin_ashi;
pub use ichimoku::{compute_ichimoku, IchimokuOutput};
pub use macd::{compute_macd, HistogramBar, HistogramTone, MacdOutput};
pub use rsi::{compute_rsi, RsiOutput};
pub use sma::{compute_sma, sma};
pub use source::PriceSource;
pub use stochastic::{compute_stochastic, StochasticOutput};
pub use supertrend::{compute_supertrend, SuperTrendPoint, Trend};
pub use tsi::{compute_tsi, TsiOutput};
pub use volume_profile::{compute_volume_profile, VolumeBin};

/// Round to `precision` decimal places, halves away from zero
///
/// Rounds the exact binary value, so `1.005` (stored just below 1.005)
/// becomes `1.0` at two places. Values outside the decimal range are
/// returned unchanged.
pub fn round_to(value: f64, precision: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .and_then(|d| {
            d.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
                .to_f64()
        })
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(33.333333, 2), 33.33);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(7.0, 4), 7.0);
    }

    #[test]
    fn test_round_to_uses_stored_binary_value() {
        assert_eq!(round_to(1.005, 2), 1.0);
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(0.125, 2), 0.13);
    }

    #[test]
    fn test_round_to_passes_through_out_of_range() {
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(1e30, 2), 1e30);
    }
}
