//! Summary Export Module
//! Assembles the product aggregate as a DataFrame and writes it out as CSV.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::PRODUCT_COLUMN;

/// Column name of the aggregate measure in the exported summary.
pub const TOTAL_COLUMN: &str = "Total_Sales";

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Failed to write summary: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds and exports the grouped summary.
pub struct SummaryWriter;

impl SummaryWriter {
    /// Assemble the (Product, Total_Sales) frame from queried rows.
    pub fn summary_frame(rows: &[(String, f64)]) -> Result<DataFrame, SummaryError> {
        let products: Vec<String> = rows.iter().map(|(p, _)| p.clone()).collect();
        let totals: Vec<f64> = rows.iter().map(|(_, t)| *t).collect();
        let df = DataFrame::new(vec![
            Column::new(PRODUCT_COLUMN.into(), products),
            Column::new(TOTAL_COLUMN.into(), totals),
        ])?;
        Ok(df)
    }

    /// Write the summary as CSV, overwriting any previous export.
    ///
    /// An empty summary still writes the header line.
    pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), SummaryError> {
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).include_header(true).finish(df)?;
        info!(path = %path.display(), rows = df.height(), "summary exported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn summary_frame_carries_both_columns() {
        let rows = vec![("A".to_string(), 10.0), ("B".to_string(), 20.0)];
        let df = SummaryWriter::summary_frame(&rows).unwrap();
        assert_eq!(df.height(), 2);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec![PRODUCT_COLUMN, TOTAL_COLUMN]);
    }

    #[test]
    fn empty_summary_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");

        let mut df = SummaryWriter::summary_frame(&[]).unwrap();
        SummaryWriter::write_csv(&mut df, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().collect::<Vec<_>>(), vec!["Product,Total_Sales"]);
    }

    #[test]
    fn rewrite_overwrites_the_previous_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");

        let mut first = SummaryWriter::summary_frame(&[
            ("A".to_string(), 10.0),
            ("B".to_string(), 20.0),
        ])
        .unwrap();
        SummaryWriter::write_csv(&mut first, &path).unwrap();

        let mut second = SummaryWriter::summary_frame(&[("A".to_string(), 10.0)]).unwrap();
        SummaryWriter::write_csv(&mut second, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
