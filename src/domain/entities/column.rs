use std::fmt;
use std::sync::Arc;

use crate::domain::entities::row::Row;
use crate::domain::entities::value::Value;
use crate::usecase::ports::sink::{QuerySink, SinkError};

/// Rewrites a cell after fetch. `row` is the row being shaped, `original` the
/// untouched raw row.
pub trait RowTransform: Send + Sync {
    fn run(&self, value: Value, row: &Row, original: &Row) -> Value;
}

impl<F> RowTransform for F
where
    F: Fn(Value, &Row, &Row) -> Value + Send + Sync,
{
    fn run(&self, value: Value, row: &Row, original: &Row) -> Value {
        self(value, row, original)
    }
}

/// Rewrites a search term before it reaches the sink.
pub trait FilterTermTransform: Send + Sync {
    fn run(&self, term: &str) -> String;
}

impl<F> FilterTermTransform for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn run(&self, term: &str) -> String {
        self(term)
    }
}

/// Replaces the default "contains" clause for a column. Returning `true`
/// means the hook applied its own constraint to the sink.
pub trait FilterQueryOverride: Send + Sync {
    fn run(
        &self,
        sink: &mut dyn QuerySink,
        column: &ColumnSpec,
        term: &str,
    ) -> Result<bool, SinkError>;
}

impl<F> FilterQueryOverride for F
where
    F: Fn(&mut dyn QuerySink, &ColumnSpec, &str) -> Result<bool, SinkError> + Send + Sync,
{
    fn run(
        &self,
        sink: &mut dyn QuerySink,
        column: &ColumnSpec,
        term: &str,
    ) -> Result<bool, SinkError> {
        self(sink, column, term)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnKind {
    #[default]
    DataBacked,
    Computed,
}

#[derive(Clone)]
pub struct ColumnSpec {
    name: String,
    source_field: String,
    kind: ColumnKind,
    sortable: bool,
    searchable: bool,
    row_transform: Option<Arc<dyn RowTransform>>,
    filter_term_transform: Option<Arc<dyn FilterTermTransform>>,
    filter_query_override: Option<Arc<dyn FilterQueryOverride>>,
}

/// Cuts `"customers.name AS custName"` down to `"customers.name"`.
fn strip_alias(expr: &str) -> &str {
    let upper = expr.to_ascii_uppercase();
    match upper.find(" AS ") {
        Some(idx) => &expr[..idx],
        None => expr,
    }
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source_field: name.clone(),
            name,
            kind: ColumnKind::DataBacked,
            sortable: true,
            searchable: false,
            row_transform: None,
            filter_term_transform: None,
            filter_query_override: None,
        }
    }

    /// Column whose sort/filter target is `expr` with any alias removed.
    pub fn aliased(name: impl Into<String>, expr: &str) -> Self {
        let mut column = Self::new(name);
        column.source_field = strip_alias(expr).to_string();
        column
    }

    /// Column filled in after fetch rather than read from the data source.
    ///
    /// Its output cell follows the fetched fields, so declare computed columns
    /// after the data-backed ones to keep output positions aligned with
    /// directive indices.
    pub fn computed(name: impl Into<String>) -> Self {
        Self::new(name).kind(ColumnKind::Computed)
    }

    /// Uses `expr` as the sort/filter target as-is, with no alias handling.
    pub fn source(mut self, expr: impl Into<String>) -> Self {
        self.source_field = expr.into();
        self
    }

    pub fn kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        if kind == ColumnKind::Computed {
            self.sortable = false;
            self.searchable = false;
        }
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable && self.kind == ColumnKind::DataBacked;
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable && self.kind == ColumnKind::DataBacked;
        self
    }

    pub fn on_row<F>(self, transform: F) -> Self
    where
        F: Fn(Value, &Row, &Row) -> Value + Send + Sync + 'static,
    {
        self.row_handler(transform)
    }

    pub fn row_handler(mut self, handler: impl RowTransform + 'static) -> Self {
        self.row_transform = Some(Arc::new(handler));
        self
    }

    pub fn on_filter_term<F>(self, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.filter_term_handler(transform)
    }

    pub fn filter_term_handler(mut self, handler: impl FilterTermTransform + 'static) -> Self {
        self.filter_term_transform = Some(Arc::new(handler));
        self
    }

    pub fn on_filter_query<F>(self, hook: F) -> Self
    where
        F: Fn(&mut dyn QuerySink, &ColumnSpec, &str) -> Result<bool, SinkError>
            + Send
            + Sync
            + 'static,
    {
        self.filter_query_handler(hook)
    }

    pub fn filter_query_handler(mut self, handler: impl FilterQueryOverride + 'static) -> Self {
        self.filter_query_override = Some(Arc::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_field(&self) -> &str {
        &self.source_field
    }

    pub fn column_kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_computed(&self) -> bool {
        self.kind == ColumnKind::Computed
    }

    pub fn is_data_backed(&self) -> bool {
        self.kind == ColumnKind::DataBacked
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable && self.is_data_backed()
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable && self.is_data_backed()
    }

    pub fn can_row_transform(&self) -> bool {
        self.row_transform.is_some()
    }

    pub fn can_filter_term_transform(&self) -> bool {
        self.filter_term_transform.is_some()
    }

    pub fn can_filter_query_override(&self) -> bool {
        self.filter_query_override.is_some()
    }

    pub fn apply_row_transform(&self, value: Value, row: &Row, original: &Row) -> Value {
        match &self.row_transform {
            Some(transform) => transform.run(value, row, original),
            None => value,
        }
    }

    pub fn apply_filter_term_transform(&self, term: &str) -> String {
        match &self.filter_term_transform {
            Some(transform) => transform.run(term),
            None => term.to_string(),
        }
    }

    pub fn apply_filter_query_override(
        &self,
        sink: &mut dyn QuerySink,
        term: &str,
    ) -> Result<bool, SinkError> {
        match &self.filter_query_override {
            Some(hook) => hook.run(sink, self, term),
            None => Ok(false),
        }
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("name", &self.name)
            .field("source_field", &self.source_field)
            .field("kind", &self.kind)
            .field("sortable", &self.sortable)
            .field("searchable", &self.searchable)
            .field("row_transform", &self.can_row_transform())
            .field("filter_term_transform", &self.can_filter_term_transform())
            .field("filter_query_override", &self.can_filter_query_override())
            .finish()
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for ColumnSpec {
    fn from(name: &str) -> Self {
        ColumnSpec::new(name)
    }
}

impl From<String> for ColumnSpec {
    fn from(name: String) -> Self {
        ColumnSpec::new(name)
    }
}

impl From<(&str, &str)> for ColumnSpec {
    fn from((name, expr): (&str, &str)) -> Self {
        ColumnSpec::aliased(name, expr)
    }
}
