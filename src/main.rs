//! Sales ETL - Monthly CSV Ingestion & Summary Reporting
//!
//! A batch job that loads monthly sales extracts, cleans them, persists the
//! result to SQLite and exports a product summary plus a monthly bar chart.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sales_etl::config::Config;
use sales_etl::pipeline;

/// Monthly sales ETL: load CSV extracts, clean, persist to SQLite, report.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to a TOML configuration file; compiled-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    config
        .ensure_output_dirs()
        .context("failed to create output directories")?;
    init_logging(&config)?;

    if let Err(err) = pipeline::run(&config) {
        tracing::error!(error = %format!("{err:#}"), "run failed");
        return Err(err);
    }
    Ok(())
}

/// Route log output to the configured append-only run log.
fn init_logging(config: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("failed to open log file {}", config.log_path.display()))?;

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .init();
    Ok(())
}
