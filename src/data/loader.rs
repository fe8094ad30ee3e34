//! CSV Data Loader Module
//! Reads the monthly extracts, tags each with its Month label and
//! concatenates them into one unified DataFrame using Polars.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::{MONTH_COLUMN, PRODUCT_COLUMN, SALES_COLUMN};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to load {file:?}: {source}")]
    Read { file: PathBuf, source: PolarsError },
    #[error("Filename {0:?} does not match the <prefix>_<month>.<ext> pattern")]
    MalformedFilename(PathBuf),
    #[error("File {file:?} is missing required column {column:?}")]
    MissingColumn { file: PathBuf, column: String },
}

/// Reads the monthly CSV extracts into one unified DataFrame.
pub struct SalesLoader;

impl SalesLoader {
    /// Load every configured file in order and concatenate.
    ///
    /// Column sets are unioned across files; a column absent from one file is
    /// null in that file's rows. An empty input list yields an empty frame.
    /// The first unreadable or malformed file fails the whole run.
    pub fn load_files(paths: &[PathBuf]) -> Result<DataFrame, LoaderError> {
        if paths.is_empty() {
            return Ok(DataFrame::empty());
        }

        let mut frames: Vec<LazyFrame> = Vec::with_capacity(paths.len());
        for path in paths {
            let month = Self::month_label(path)?;
            let df = LazyCsvReader::new(path)
                .with_infer_schema_length(Some(10000))
                .finish()
                .and_then(|lf| lf.collect())
                .map_err(|source| LoaderError::Read {
                    file: path.clone(),
                    source,
                })?;

            for required in [PRODUCT_COLUMN, SALES_COLUMN] {
                if df.column(required).is_err() {
                    return Err(LoaderError::MissingColumn {
                        file: path.clone(),
                        column: required.to_string(),
                    });
                }
            }

            info!(file = %path.display(), rows = df.height(), month = %month, "loaded extract");
            frames.push(df.lazy().with_column(lit(month).alias(MONTH_COLUMN)));
        }

        // Mismatched column dtypes across extracts resolve to their supertype,
        // so a Sales column read as integers in one file and strings in
        // another still concatenates.
        let args = UnionArgs {
            to_supertypes: true,
            ..Default::default()
        };
        let unified = concat_lf_diagonal(frames, args)?.collect()?;
        info!(rows = unified.height(), "unified table assembled");
        Ok(unified)
    }

    /// Derive the month label from a filename of the form `<prefix>_<month>.<ext>`.
    ///
    /// The token after the underscore is capitalized (`sales_jan.csv` -> `Jan`).
    /// Anything else is rejected rather than silently mislabeled.
    pub fn month_label(path: &Path) -> Result<String, LoaderError> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| LoaderError::MalformedFilename(path.to_path_buf()))?;

        let mut parts = stem.split('_');
        let (Some(prefix), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(LoaderError::MalformedFilename(path.to_path_buf()));
        };
        if prefix.is_empty() || token.is_empty() || !token.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(LoaderError::MalformedFilename(path.to_path_buf()));
        }

        Ok(token[..1].to_ascii_uppercase() + &token[1..].to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_extract(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn month_label_capitalizes_the_token() {
        assert_eq!(
            SalesLoader::month_label(Path::new("data/sales_jan.csv")).unwrap(),
            "Jan"
        );
        assert_eq!(
            SalesLoader::month_label(Path::new("sales_FEB.csv")).unwrap(),
            "Feb"
        );
    }

    #[test]
    fn month_label_rejects_nonmatching_filenames() {
        for name in ["salesjan.csv", "sales_2024_jan.csv", "sales_.csv", "_jan.csv", "sales_q1!.csv"] {
            assert!(
                matches!(
                    SalesLoader::month_label(Path::new(name)),
                    Err(LoaderError::MalformedFilename(_))
                ),
                "expected {name:?} to be rejected"
            );
        }
    }

    #[test]
    fn unified_row_count_is_the_sum_of_per_file_counts() {
        let dir = TempDir::new().unwrap();
        let jan = write_extract(&dir, "sales_jan.csv", "Product,Sales\nA,10\nB,20\n");
        let feb = write_extract(&dir, "sales_feb.csv", "Product,Sales\nA,30\n");

        let unified = SalesLoader::load_files(&[jan, feb]).unwrap();
        assert_eq!(unified.height(), 3);

        let months = unified.column(MONTH_COLUMN).unwrap();
        let months = months.str().unwrap();
        assert_eq!(months.get(0), Some("Jan"));
        assert_eq!(months.get(2), Some("Feb"));
    }

    #[test]
    fn missing_required_column_is_an_input_error() {
        let dir = TempDir::new().unwrap();
        let jan = write_extract(&dir, "sales_jan.csv", "Product,Amount\nA,10\n");

        assert!(matches!(
            SalesLoader::load_files(&[jan]),
            Err(LoaderError::MissingColumn { .. })
        ));
    }

    #[test]
    fn unreadable_file_aborts_the_load() {
        let missing = PathBuf::from("no/such/dir/sales_jan.csv");
        assert!(matches!(
            SalesLoader::load_files(&[missing]),
            Err(LoaderError::Read { .. })
        ));
    }

    #[test]
    fn empty_input_list_yields_an_empty_frame() {
        let unified = SalesLoader::load_files(&[]).unwrap();
        assert_eq!(unified.height(), 0);
        assert_eq!(unified.width(), 0);
    }

    #[test]
    fn differing_column_sets_are_unioned() {
        let dir = TempDir::new().unwrap();
        let jan = write_extract(&dir, "sales_jan.csv", "Product,Sales,Region\nA,10,North\n");
        let feb = write_extract(&dir, "sales_feb.csv", "Product,Sales\nB,20\n");

        let unified = SalesLoader::load_files(&[jan, feb]).unwrap();
        assert_eq!(unified.height(), 2);
        let region = unified.column("Region").unwrap();
        assert_eq!(region.null_count(), 1);
    }
}
