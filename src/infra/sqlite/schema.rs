use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::domain::entities::column::ColumnSpec;

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign key enforcement")?;
    Ok(conn)
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn create_text_table(conn: &Connection, table: &str, columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        anyhow::bail!("table {table} needs at least one column")
    }

    let table_sql = quote_identifier(table);
    let column_sql = columns
        .iter()
        .map(|column| format!("{} TEXT", quote_identifier(column)))
        .collect::<Vec<_>>()
        .join(", ");

    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table_sql};
         CREATE TABLE {table_sql} ({column_sql});"
    ))
    .with_context(|| format!("failed to create table: {table}"))?;

    Ok(())
}

pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid ASC")
        .context("failed to prepare table info query")?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))
        .context("failed to query table info")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect table columns")?;

    if columns.is_empty() {
        anyhow::bail!("table not found or has no columns: {table}")
    }

    Ok(columns)
}

/// One searchable column per table column, addressed by quoted identifier.
pub fn default_column_specs(conn: &Connection, table: &str) -> Result<Vec<ColumnSpec>> {
    let columns = table_columns(conn, table)?
        .into_iter()
        .map(|name| {
            let source = quote_identifier(&name);
            ColumnSpec::new(name).source(source).searchable(true)
        })
        .collect();
    Ok(columns)
}
