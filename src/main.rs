//! Chart indicators - main entry point
//!
//! This binary provides two subcommands:
//! - compute: Compute the configured indicators for one or more candle files
//! - defaults: Print the default indicator configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "chart-indicators")]
#[command(about = "Technical indicators for OHLCV candle series", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute indicators for candle files
    Compute {
        /// Candle files (.csv or .json); repeat for several inputs
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Path to configuration file (defaults to every indicator with default settings)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file, or directory when several inputs are given (stdout if omitted for a single input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Evaluate indicators sequentially instead of in parallel
        #[arg(long)]
        sequential: bool,
    },

    /// Print the default configuration
    Defaults {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn setup_logging(verbose: bool, command_name: &str, file_only: bool) -> Result<()> {
    // Create logs directory
    std::fs::create_dir_all("logs")?;

    // Create log file with naming pattern: {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    if file_only {
        // Keep the console clean for the progress bar
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    } else {
        // Console goes to stderr so stdout stays valid JSON
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(true);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        info!("Logging initialized");
        info!("Log file: {}", log_path.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine command name and whether to use file-only logging
    let (command_name, file_only) = match &cli.command {
        Commands::Compute { input, .. } => ("compute", input.len() > 1),
        Commands::Defaults { .. } => ("defaults", true),
    };

    setup_logging(cli.verbose, command_name, file_only)?;

    match cli.command {
        Commands::Compute {
            input,
            config,
            output,
            sequential,
        } => commands::compute::run(input, config, output, sequential),

        Commands::Defaults { output } => commands::defaults::run(output),
    }
}
