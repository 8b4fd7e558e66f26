//! Compute command: load candles, sanitize them and evaluate the configured indicators

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use chart_indicators::data::load_candles;
use chart_indicators::sanitize::{passthrough, sanitize_history};
use chart_indicators::{compute_all, Candle, Config, IndicatorResult};

/// JSON document written per input file
#[derive(Debug, Serialize)]
struct Report {
    source: String,
    candles: usize,
    dropped: usize,
    repaired: usize,
    inconsistent: usize,
    first_time: Option<i64>,
    last_time: Option<i64>,
    indicators: Vec<IndicatorResult>,
}

fn build_report(path: &Path, config: &Config) -> Result<Report> {
    let raw = load_candles(path)?;

    let (candles, dropped, repaired, inconsistent) = if config.sanitize {
        let history = sanitize_history(&raw);
        let repaired = history.repaired();
        (history.candles, history.dropped, repaired, history.inconsistent)
    } else {
        let candles = passthrough(&raw);
        let dropped = raw.len() - candles.len();
        (candles, dropped, 0, 0)
    };

    match (candles.first(), candles.last()) {
        (Some(first), Some(last)) => {
            let stamp = |c: &Candle| {
                c.datetime()
                    .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| c.time.to_string())
            };
            info!("{}: candles from {} to {}", path.display(), stamp(first), stamp(last));
        }
        _ => warn!("{}: no usable candles", path.display()),
    }

    let indicators = compute_all(&candles, &config.indicators, config.parallel)
        .with_context(|| format!("Failed to compute indicators for {}", path.display()))?;

    info!(
        "{}: {} candles ({} dropped, {} repaired), {} indicators",
        path.display(),
        candles.len(),
        dropped,
        repaired,
        indicators.len()
    );

    Ok(Report {
        source: path.display().to_string(),
        candles: candles.len(),
        dropped,
        repaired,
        inconsistent,
        first_time: candles.first().map(|c| c.time),
        last_time: candles.last().map(|c| c.time),
        indicators,
    })
}

/// `<dir>/<input stem>_indicators.json`
fn output_path(dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("candles");
    dir.join(format!("{}_indicators.json", stem))
}

fn write_report(report: &Report, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Results written to {}", path.display());
    Ok(())
}

pub fn run(
    inputs: Vec<PathBuf>,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    sequential: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };
    if sequential {
        config.parallel = false;
    }

    info!(
        "Computing {} indicators for {} input(s) ({})",
        config.indicators.len(),
        inputs.len(),
        if config.parallel { "parallel" } else { "sequential" }
    );

    if let [input] = inputs.as_slice() {
        let report = build_report(input, &config)?;
        return match output {
            Some(path) if path.is_dir() => write_report(&report, &output_path(&path, input)),
            Some(path) => write_report(&report, &path),
            None => {
                let json =
                    serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
                println!("{}", json);
                Ok(())
            }
        };
    }

    let dir = output.unwrap_or_else(|| PathBuf::from("results"));
    if dir.is_file() {
        bail!(
            "Output must be a directory when several inputs are given: {}",
            dir.display()
        );
    }
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{percent:>3}%|{bar:40}| {pos}/{len} [{elapsed}<{eta}] {msg}")?
            .progress_chars("█░ "),
    );

    let run_one = |input: &PathBuf| -> Result<()> {
        let result = build_report(input, &config)
            .and_then(|report| write_report(&report, &output_path(&dir, input)));
        pb.inc(1);
        result
    };

    let results: Vec<Result<()>> = if config.parallel {
        inputs.par_iter().map(run_one).collect()
    } else {
        inputs.iter().map(run_one).collect()
    };
    pb.finish_with_message("done");

    let mut failed = 0;
    for (input, result) in inputs.iter().zip(&results) {
        if let Err(e) = result {
            failed += 1;
            warn!("{}: {:#}", input.display(), e);
        }
    }
    if failed > 0 {
        bail!("{} of {} inputs failed", failed, inputs.len());
    }

    info!("All {} inputs written to {}", inputs.len(), dir.display());
    Ok(())
}
