//! Data loading
//!
//! Reads raw OHLCV candles from CSV or JSON files. Loading is lenient: cells
//! that do not parse become missing fields and are left to
//! [`crate::sanitize`] to repair or drop.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::sanitize::RawCandle;

/// Input file format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("json") => Ok(InputFormat::Json),
            _ => bail!("Unsupported input file (expected .csv or .json): {}", path.display()),
        }
    }
}

/// Load raw candles from a CSV or JSON file
pub fn load_candles(path: impl AsRef<Path>) -> Result<Vec<RawCandle>> {
    let path = path.as_ref();
    let candles = match InputFormat::from_path(path)? {
        InputFormat::Csv => load_csv(path)?,
        InputFormat::Json => load_json(path)?,
    };
    info!("Loaded {} rows from {}", candles.len(), path.display());
    Ok(candles)
}

/// Load a JSON array of raw candles
pub fn load_json(path: impl AsRef<Path>) -> Result<Vec<RawCandle>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file {}", path.display()))?;
    serde_json::from_str(&contents).context("Failed to parse candle JSON")
}

/// Column positions resolved from the CSV header
#[derive(Debug, Clone, Copy)]
struct Columns {
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };
        let require = |name: &str| find(&[name]).with_context(|| format!("Missing {} column", name));

        Ok(Columns {
            time: find(&["time", "timestamp", "datetime", "date"])
                .context("Missing time/datetime column")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find(&["volume"]),
        })
    }
}

/// Parse a time cell as a unix timestamp (seconds or milliseconds) or a date string
fn parse_time(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if let Ok(value) = cell.parse::<f64>() {
        return Some(value);
    }

    cell.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(cell, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|ndt| ndt.and_utc())
        })
        .map(|dt| dt.timestamp() as f64)
}

fn parse_number(record: &csv::StringRecord, index: usize) -> Option<f64> {
    record.get(index)?.trim().parse::<f64>().ok()
}

/// Load OHLCV rows from a CSV file with a header row
///
/// Recognised columns: `time|timestamp|datetime|date`, `open`, `high`,
/// `low`, `close` and optionally `volume`, in any order.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<RawCandle>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
    let columns = Columns::from_headers(reader.headers().context("Failed to read CSV header")?)?;

    let mut candles = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        let time = record.get(columns.time).and_then(parse_time);
        if time.is_none() {
            warn!("Row {}: unparseable time {:?}", row_idx + 1, record.get(columns.time));
        }

        candles.push(RawCandle {
            time,
            open: parse_number(&record, columns.open),
            high: parse_number(&record, columns.high),
            low: parse_number(&record, columns.low),
            close: parse_number(&record, columns.close),
            volume: columns.volume.and_then(|i| parse_number(&record, i)),
        });
    }

    Ok(candles)
}
