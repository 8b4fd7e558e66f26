//! Defaults command: print the default indicator configuration

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use chart_indicators::Config;

pub fn run(output: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(&Config::default())
        .context("Failed to serialize default config")?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Default config written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
