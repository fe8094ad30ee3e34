//! Sales Store Module
//! SQLite persistence for the cleaned table: full-replace writes, an
//! idempotent secondary index on Product, and the fixed aggregation queries.

use std::path::Path;

use polars::prelude::*;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use thiserror::Error;
use tracing::{info, warn};

use crate::{MONTH_COLUMN, PRODUCT_COLUMN, SALES_COLUMN};

/// Name of the single relation holding the cleaned rows.
pub const SALES_TABLE: &str = "sales";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Wraps the SQLite connection for the duration of one run.
pub struct SalesStore {
    conn: Connection,
}

impl SalesStore {
    /// Open (or create) the store file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// In-memory store, for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Replace the `sales` table with the given frame.
    ///
    /// Drop, create and insert run inside one transaction; a failure leaves
    /// the previous table intact. A frame with no columns still produces the
    /// minimal schema so downstream queries stay valid.
    pub fn replace_sales(&mut self, df: &DataFrame) -> Result<(), StoreError> {
        let columns: Vec<(String, &'static str)> = if df.width() == 0 {
            vec![
                (PRODUCT_COLUMN.to_string(), "TEXT"),
                (SALES_COLUMN.to_string(), "REAL"),
                (MONTH_COLUMN.to_string(), "TEXT"),
            ]
        } else {
            df.get_columns()
                .iter()
                .map(|c| (c.name().to_string(), sql_type(c.dtype())))
                .collect()
        };

        let column_list = columns
            .iter()
            .map(|(name, ty)| format!("{} {}", quote_ident(name), ty))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; columns.len()].join(", ");
        let insert_sql = format!("INSERT INTO {SALES_TABLE} VALUES ({placeholders})");

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {SALES_TABLE}; CREATE TABLE {SALES_TABLE} ({column_list});"
        ))?;
        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for row in 0..df.height() {
                let mut values: Vec<SqlValue> = Vec::with_capacity(df.width());
                for column in df.get_columns() {
                    values.push(sql_value(column.get(row)?));
                }
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;
        info!(rows = df.height(), "sales table replaced");
        Ok(())
    }

    /// Ensure the non-unique Product index exists.
    ///
    /// Runs outside the insert transaction; a failure here degrades queries
    /// to unindexed scans instead of failing the run.
    pub fn ensure_product_index(&self) {
        let sql = format!(
            "CREATE INDEX IF NOT EXISTS idx_product ON {SALES_TABLE}({})",
            quote_ident(PRODUCT_COLUMN)
        );
        match self.conn.execute(&sql, []) {
            Ok(_) => info!("product index in place"),
            Err(err) => warn!(%err, "index creation failed; continuing without it"),
        }
    }

    /// Total sales per product, ordered by product name.
    pub fn product_summary(&self) -> Result<Vec<(String, f64)>, StoreError> {
        self.grouped_totals(PRODUCT_COLUMN)
    }

    /// Total sales per month label.
    pub fn month_totals(&self) -> Result<Vec<(String, f64)>, StoreError> {
        self.grouped_totals(MONTH_COLUMN)
    }

    fn grouped_totals(&self, key: &str) -> Result<Vec<(String, f64)>, StoreError> {
        let sql = format!(
            "SELECT {k}, SUM({s}) AS Total_Sales FROM {SALES_TABLE} GROUP BY {k} ORDER BY {k}",
            k = quote_ident(key),
            s = quote_ident(SALES_COLUMN),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn sql_type(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Float32 | DataType::Float64 => "REAL",
        DataType::Boolean
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => "INTEGER",
        _ => "TEXT",
    }
}

fn sql_value(value: AnyValue) -> SqlValue {
    match value {
        AnyValue::Null => SqlValue::Null,
        AnyValue::Boolean(v) => SqlValue::Integer(v as i64),
        AnyValue::Int8(v) => SqlValue::Integer(v as i64),
        AnyValue::Int16(v) => SqlValue::Integer(v as i64),
        AnyValue::Int32(v) => SqlValue::Integer(v as i64),
        AnyValue::Int64(v) => SqlValue::Integer(v),
        AnyValue::UInt8(v) => SqlValue::Integer(v as i64),
        AnyValue::UInt16(v) => SqlValue::Integer(v as i64),
        AnyValue::UInt32(v) => SqlValue::Integer(v as i64),
        AnyValue::UInt64(v) => SqlValue::Integer(v as i64),
        AnyValue::Float32(v) => SqlValue::Real(v as f64),
        AnyValue::Float64(v) => SqlValue::Real(v),
        AnyValue::String(v) => SqlValue::Text(v.to_string()),
        AnyValue::StringOwned(v) => SqlValue::Text(v.to_string()),
        other => SqlValue::Text(other.to_string().trim_matches('"').to_string()),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
