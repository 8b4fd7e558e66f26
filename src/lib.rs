//! Chart Indicators
//!
//! A technical-indicator engine for OHLCV candle series: moving averages,
//! oscillators, volatility bands, trend followers and volume profiles
//! computed as pure functions over an immutable candle history.
//!
//! Gaps in the input (non-finite or missing fields) are propagated per
//! indicator and never rendered as zeros; every output series is gap-free
//! with strictly increasing timestamps.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod sanitize;
pub mod settings;
pub mod types;

pub use config::Config;
pub use engine::{compute, compute_all, IndicatorOutput, IndicatorResult};
pub use error::SettingsError;
pub use settings::IndicatorSettings;
pub use types::*;
