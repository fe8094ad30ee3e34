//! Run Configuration Module
//! Externalizes the input file list, store and report paths, the month axis
//! and the outlier ceiling as a TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Config lists no months for the report axis")]
    NoMonths,
}

/// Pipeline configuration. The defaults reproduce the reference run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Ordered list of monthly CSV extracts to ingest.
    pub input_files: Vec<PathBuf>,
    /// SQLite database file receiving the cleaned table.
    pub db_path: PathBuf,
    /// Destination of the product summary CSV.
    pub summary_path: PathBuf,
    /// Destination of the monthly totals bar chart; `None` disables the chart.
    pub chart_path: Option<PathBuf>,
    /// Append-only run log.
    pub log_path: PathBuf,
    /// Fixed, ordered month axis for the chart. Months absent from the data
    /// render as zero bars; months in the data but not listed are not charted.
    pub months: Vec<String>,
    /// Rows with `Sales` above this value are dropped as data-entry outliers;
    /// `None` disables the ceiling.
    pub max_sales: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_files: vec![
                PathBuf::from("data/sales_jan.csv"),
                PathBuf::from("data/sales_feb.csv"),
                PathBuf::from("data/sales_mar.csv"),
            ],
            db_path: PathBuf::from("output/sales_data.db"),
            summary_path: PathBuf::from("output/sales_summary.csv"),
            chart_path: Some(PathBuf::from("output/sales_by_month.png")),
            log_path: PathBuf::from("output/etl.log"),
            months: vec!["Jan".into(), "Feb".into(), "Mar".into()],
            max_sales: Some(1_000_000.0),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        if config.months.is_empty() {
            return Err(ConfigError::NoMonths);
        }
        Ok(config)
    }

    /// Create the parent directories of every output artifact.
    pub fn ensure_output_dirs(&self) -> std::io::Result<()> {
        let mut targets: Vec<&Path> = vec![&self.db_path, &self.summary_path, &self.log_path];
        if let Some(chart) = &self.chart_path {
            targets.push(chart);
        }
        for target in targets {
            if let Some(parent) = target.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }
        Ok(())
    }
}
