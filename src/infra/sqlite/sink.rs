use anyhow::{Context, Result};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::Connection;
use tracing::trace;

use crate::domain::entities::column::ColumnSpec;
use crate::domain::entities::row::Row;
use crate::domain::entities::value::Value;
use crate::infra::sqlite::schema::quote_identifier;
use crate::usecase::ports::sink::{FilterGroup, MatchKind, OrderDirective, QuerySink, SinkError};

/// [`QuerySink`] that renders accumulated clauses into SQLite statements.
///
/// `source` is spliced in as the FROM clause and select expressions are used
/// verbatim; both come from the column declarations, never from the request.
/// Search terms are always bound parameters.
pub struct SqliteSink {
    conn: Connection,
    source: String,
    select: Vec<String>,
    filters: Vec<(String, Vec<SqlValue>)>,
    order: Vec<String>,
    window: Option<(i64, i64)>,
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn select_expr(column: &ColumnSpec) -> String {
    if column.source_field() == column.name() {
        quote_identifier(column.name())
    } else {
        format!("{} AS {}", column.source_field(), quote_identifier(column.name()))
    }
}

fn read_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(value) => Value::Integer(value),
        ValueRef::Real(value) => Value::Real(value),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Value::Text(text.to_string()),
            Err(_) => Value::Bytes(bytes.to_vec()),
        },
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    }
}

fn sink_error(err: anyhow::Error) -> SinkError {
    SinkError::Message(format!("{err:#}"))
}

impl SqliteSink {
    pub fn new(conn: Connection, source: impl Into<String>, select: Vec<String>) -> Self {
        Self {
            conn,
            source: source.into(),
            select,
            filters: Vec::new(),
            order: Vec::new(),
            window: None,
        }
    }

    /// Selects every data-backed column of `table` under its display name.
    pub fn for_columns(conn: Connection, table: &str, columns: &[ColumnSpec]) -> Self {
        let select = columns
            .iter()
            .filter(|column| column.is_data_backed())
            .map(select_expr)
            .collect();
        Self::new(conn, quote_identifier(table), select)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn where_sql(&self) -> (String, Vec<SqlValue>) {
        if self.filters.is_empty() {
            return (String::new(), Vec::new());
        }

        let clauses = self
            .filters
            .iter()
            .map(|(sql, _)| sql.as_str())
            .collect::<Vec<_>>()
            .join(" AND ");
        let params = self
            .filters
            .iter()
            .flat_map(|(_, params)| params.iter().cloned())
            .collect();
        (format!(" WHERE {clauses}"), params)
    }

    fn count_rows(&self) -> Result<i64> {
        let (where_sql, params) = self.where_sql();
        let sql = format!("SELECT COUNT(*) FROM {}{where_sql}", self.source);
        trace!(%sql, "count");

        self.conn
            .query_row(&sql, rusqlite::params_from_iter(params), |row| row.get(0))
            .context("failed to query row count")
    }

    fn fetch_rows(&self) -> Result<Vec<Row>> {
        let select_sql = if self.select.is_empty() {
            "*".to_string()
        } else {
            self.select.join(", ")
        };
        let (where_sql, mut params) = self.where_sql();
        let mut sql = format!("SELECT {select_sql} FROM {}{where_sql}", self.source);

        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order.join(", "));
        }

        if let Some((offset, limit)) = self.window {
            sql.push_str(" LIMIT ? OFFSET ?");
            params.push(SqlValue::Integer(if limit < 0 { -1 } else { limit }));
            params.push(SqlValue::Integer(offset.max(0)));
        }
        trace!(%sql, "fetch");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .context("failed to prepare fetch query")?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params))
            .context("failed to run fetch query")?;
        let mut fetched = Vec::new();
        while let Some(row) = rows.next().context("failed to read fetched row")? {
            let mut record = Row::new();
            for (idx, name) in names.iter().enumerate() {
                let value = row
                    .get_ref(idx)
                    .with_context(|| format!("failed to read column {name}"))?;
                record.set(name.as_str(), read_value(value));
            }
            fetched.push(record);
        }

        Ok(fetched)
    }
}

impl QuerySink for SqliteSink {
    fn count(&mut self) -> Result<i64, SinkError> {
        self.count_rows().map_err(sink_error)
    }

    fn paginate(&mut self, offset: i64, limit: i64) -> Result<(), SinkError> {
        self.window = Some((offset, limit));
        Ok(())
    }

    fn order(&mut self, directives: &[OrderDirective]) -> Result<(), SinkError> {
        self.order.extend(
            directives
                .iter()
                .map(|directive| format!("{} {}", directive.field, directive.direction.as_sql())),
        );
        Ok(())
    }

    fn filter(&mut self, group: &FilterGroup) -> Result<(), SinkError> {
        if group.is_empty() {
            return Ok(());
        }

        let mut parts = Vec::with_capacity(group.len());
        let mut params = Vec::with_capacity(group.len());
        for clause in &group.clauses {
            match clause.matching {
                MatchKind::Contains => {
                    parts.push(format!("{} LIKE ? ESCAPE '\\'", clause.field));
                    params.push(SqlValue::Text(escape_like(&clause.term)));
                }
                MatchKind::Exact => {
                    parts.push(format!("{} = ?", clause.field));
                    params.push(SqlValue::Text(clause.term.clone()));
                }
            }
        }

        self.filters.push((format!("({})", parts.join(" OR ")), params));
        Ok(())
    }

    fn fetch(&mut self) -> Result<Vec<Row>, SinkError> {
        self.fetch_rows().map_err(sink_error)
    }
}
