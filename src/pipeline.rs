//! Pipeline Orchestration Module
//! Wires the four stages of one run: load, clean, persist, report.

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::data::{SalesCleaner, SalesLoader};
use crate::report::{MonthChart, SummaryWriter};
use crate::store::SalesStore;

/// Execute one full run: Loader -> Cleaner -> Persister -> Reporter.
///
/// Data flows strictly forward; re-running on unchanged inputs reproduces
/// identical output files.
pub fn run(config: &Config) -> Result<()> {
    info!(files = config.input_files.len(), "pipeline start");

    let unified = SalesLoader::load_files(&config.input_files)
        .context("loading input extracts failed")?;

    let report = SalesCleaner::clean(&unified, config.max_sales)
        .context("cleaning unified table failed")?;

    let mut store = SalesStore::open(&config.db_path)
        .with_context(|| format!("opening store {} failed", config.db_path.display()))?;
    store
        .replace_sales(&report.frame)
        .context("writing sales table failed")?;
    store.ensure_product_index();

    let summary = store.product_summary().context("summary query failed")?;
    let mut summary_df = SummaryWriter::summary_frame(&summary)?;
    println!("{summary_df}");
    SummaryWriter::write_csv(&mut summary_df, &config.summary_path)
        .with_context(|| format!("exporting {} failed", config.summary_path.display()))?;

    if let Some(chart_path) = &config.chart_path {
        let totals = store.month_totals().context("month totals query failed")?;
        MonthChart::render(&config.months, &totals, chart_path)
            .with_context(|| format!("rendering {} failed", chart_path.display()))?;
    }

    info!("pipeline complete");
    Ok(())
}
