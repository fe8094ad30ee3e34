//! Monthly Chart Module
//! Renders total sales per month as a static PNG bar chart with a fixed,
//! ordered category axis.

use std::collections::HashMap;
use std::path::Path;

use plotters::prelude::*;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to render chart: {0}")]
    Render(String),
}

const CHART_SIZE: (u32, u32) = (800, 600);
const BAR_COLOR: RGBColor = RGBColor(91, 155, 213);

/// Renders the monthly totals bar chart.
pub struct MonthChart;

impl MonthChart {
    /// Align queried month totals onto the configured axis.
    ///
    /// Configured months absent from the data become zero bars; months in the
    /// data but not configured are excluded.
    pub fn align_totals(months: &[String], totals: &[(String, f64)]) -> Vec<f64> {
        let by_month: HashMap<&str, f64> =
            totals.iter().map(|(m, t)| (m.as_str(), *t)).collect();
        months
            .iter()
            .map(|m| by_month.get(m.as_str()).copied().unwrap_or(0.0))
            .collect()
    }

    /// Draw the bar chart to `path` as PNG, one bar per configured month.
    pub fn render(
        months: &[String],
        totals: &[(String, f64)],
        path: &Path,
    ) -> Result<(), ChartError> {
        let values = Self::align_totals(months, totals);
        let y_max = values.iter().cloned().fold(0.0_f64, f64::max);
        // All-zero data still needs a non-degenerate axis.
        let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Total Sales by Month", ("sans-serif", 28))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0i32..months.len() as i32, 0f64..y_max)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let labels = months.to_vec();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(months.len())
            .x_label_formatter(&move |idx: &i32| {
                labels
                    .get(*idx as usize)
                    .cloned()
                    .unwrap_or_default()
            })
            .x_desc("Month")
            .y_desc("Total Sales")
            .draw()
            .map_err(|e| ChartError::Render(e.to_string()))?;

        chart
            .draw_series(values.iter().enumerate().map(|(i, &v)| {
                Rectangle::new(
                    [(i as i32, 0.0), (i as i32 + 1, v)],
                    BAR_COLOR.mix(0.85).filled(),
                )
            }))
            .map_err(|e| ChartError::Render(e.to_string()))?;

        root.present()
            .map_err(|e| ChartError::Render(e.to_string()))?;
        info!(path = %path.display(), bars = months.len(), "month chart rendered");
        Ok(())
    }
}
