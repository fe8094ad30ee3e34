//! Data Cleaner Module
//! Enforces the post-clean invariants: no missing fields, a numeric Sales
//! column, out-of-range rows removed.

use polars::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::{PRODUCT_COLUMN, SALES_COLUMN};

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Unified table is missing required column {0:?}")]
    MissingColumn(String),
}

/// Outcome of a cleaning pass: the new frame plus per-step drop counts.
#[derive(Debug, Clone)]
pub struct CleanReport {
    pub frame: DataFrame,
    /// Rows removed because some field was missing.
    pub dropped_missing: usize,
    /// Rows removed because Sales failed numeric coercion.
    pub dropped_non_numeric: usize,
    /// Rows removed because Sales exceeded the configured ceiling.
    pub dropped_outliers: usize,
}

impl CleanReport {
    /// Total number of rows removed across all steps.
    pub fn dropped_total(&self) -> usize {
        self.dropped_missing + self.dropped_non_numeric + self.dropped_outliers
    }
}

/// Applies the row-exclusion policy to the unified table.
pub struct SalesCleaner;

impl SalesCleaner {
    /// Clean a unified frame, returning a new frame and per-step drop counts.
    ///
    /// The input frame is never mutated; callers keep their pre-clean view.
    /// Rows failing a check are excluded, counted and logged, never treated
    /// as errors.
    pub fn clean(df: &DataFrame, max_sales: Option<f64>) -> Result<CleanReport, CleanerError> {
        // Zero loaded files: nothing to enforce.
        if df.width() == 0 {
            return Ok(CleanReport {
                frame: df.clone(),
                dropped_missing: 0,
                dropped_non_numeric: 0,
                dropped_outliers: 0,
            });
        }

        for required in [PRODUCT_COLUMN, SALES_COLUMN] {
            if df.column(required).is_err() {
                return Err(CleanerError::MissingColumn(required.to_string()));
            }
        }

        let total = df.height();

        // Any missing field disqualifies the row.
        let complete = df.clone().lazy().drop_nulls(None).collect()?;
        let dropped_missing = total - complete.height();

        // Coerce Sales; values that fail to parse become null and are dropped.
        let sales = complete.column(SALES_COLUMN)?.cast(&DataType::Float64)?;
        let mut coerced = complete.clone();
        coerced.with_column(sales)?;
        let numeric = coerced
            .lazy()
            .drop_nulls(Some(vec![col(SALES_COLUMN)]))
            .filter(col(SALES_COLUMN).is_not_nan())
            .collect()?;
        let dropped_non_numeric = complete.height() - numeric.height();

        // Out-of-range Sales are data-entry outliers, not errors.
        let (frame, dropped_outliers) = match max_sales {
            Some(ceiling) => {
                let bounded = numeric
                    .clone()
                    .lazy()
                    .filter(col(SALES_COLUMN).lt_eq(lit(ceiling)))
                    .collect()?;
                let dropped = numeric.height() - bounded.height();
                (bounded, dropped)
            }
            None => (numeric, 0),
        };

        info!(
            rows_in = total,
            rows_out = frame.height(),
            dropped_missing,
            dropped_non_numeric,
            dropped_outliers,
            "cleaning complete"
        );

        Ok(CleanReport {
            frame,
            dropped_missing,
            dropped_non_numeric,
            dropped_outliers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(products: &[Option<&str>], sales: &[Option<&str>]) -> DataFrame {
        DataFrame::new(vec![
            Column::new(PRODUCT_COLUMN.into(), products.to_vec()),
            Column::new(SALES_COLUMN.into(), sales.to_vec()),
        ])
        .unwrap()
    }

    #[test]
    fn drops_are_counted_per_step() {
        let df = frame(
            &[Some("A"), None, Some("B"), Some("C"), Some("D")],
            &[Some("10"), Some("20"), Some("bad"), Some("2000000"), Some("30")],
        );

        let report = SalesCleaner::clean(&df, Some(1_000_000.0)).unwrap();
        assert_eq!(report.dropped_missing, 1);
        assert_eq!(report.dropped_non_numeric, 1);
        assert_eq!(report.dropped_outliers, 1);
        assert_eq!(report.dropped_total(), 3);
        assert_eq!(report.frame.height(), 2);

        // The caller's frame is untouched.
        assert_eq!(df.height(), 5);
    }

    #[test]
    fn sales_is_numeric_and_bounded_after_cleaning() {
        let df = frame(
            &[Some("A"), Some("B")],
            &[Some("10.5"), Some("999999")],
        );

        let report = SalesCleaner::clean(&df, Some(1_000_000.0)).unwrap();
        let sales = report.frame.column(SALES_COLUMN).unwrap();
        assert_eq!(sales.dtype(), &DataType::Float64);

        let values = sales.f64().unwrap();
        assert!(values.into_no_null_iter().all(|v| v <= 1_000_000.0));
        assert!(report.frame.get_columns().iter().all(|c| c.null_count() == 0));
    }

    #[test]
    fn ceiling_disabled_keeps_large_values() {
        let df = frame(&[Some("A")], &[Some("2000000")]);

        let report = SalesCleaner::clean(&df, None).unwrap();
        assert_eq!(report.frame.height(), 1);
        assert_eq!(report.dropped_outliers, 0);
    }

    #[test]
    fn empty_frame_passes_through() {
        let df = DataFrame::empty();
        let report = SalesCleaner::clean(&df, Some(1_000_000.0)).unwrap();
        assert_eq!(report.frame.width(), 0);
        assert_eq!(report.dropped_total(), 0);
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let df = DataFrame::new(vec![Column::new("Amount".into(), vec!["10"])]).unwrap();
        assert!(matches!(
            SalesCleaner::clean(&df, None),
            Err(CleanerError::MissingColumn(_))
        ));
    }
}
