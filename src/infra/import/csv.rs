use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::params_from_iter;
use tracing::debug;

use crate::infra::sqlite::schema::{create_text_table, open_connection, quote_identifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub table: String,
    pub columns: Vec<String>,
    pub row_count: i64,
}

/// Loads `csv_path` into `table`, replacing any existing table of that name.
pub fn import_csv_table(db_path: &Path, table: &str, csv_path: &Path) -> Result<ImportResult> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", csv_path.display()))?
        .clone();

    if headers.is_empty() {
        anyhow::bail!("csv header is required")
    }

    let columns: Vec<String> = headers.iter().map(str::to_string).collect();

    let mut conn = open_connection(db_path)?;
    let tx = conn.transaction().context("failed to start transaction")?;

    create_text_table(&tx, table, &columns)?;

    let placeholders = vec!["?"; columns.len()].join(", ");
    let mut insert_row = tx
        .prepare(&format!(
            "INSERT INTO {} VALUES ({placeholders})",
            quote_identifier(table)
        ))
        .context("failed to prepare row insert")?;

    let mut row_count = 0_i64;
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        let values = (0..columns.len()).map(|col_idx| record.get(col_idx).unwrap_or(""));
        insert_row
            .execute(params_from_iter(values))
            .context("failed to insert row")?;
        row_count += 1;
    }
    drop(insert_row);

    tx.commit().context("failed to commit import transaction")?;
    debug!(table, row_count, "imported csv");

    Ok(ImportResult {
        table: table.to_string(),
        columns,
        row_count,
    })
}
