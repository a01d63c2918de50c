//! Server-side processing for the legacy DataTables grid protocol.
//!
//! A [`DataTable`] turns a flat request parameter bag into a sequence of
//! operations against any [`QuerySink`] (count, paginate, filter, re-count,
//! order, fetch) and reshapes the fetched rows into the envelope the grid
//! client consumes.

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod usecase;

pub use config::{ColumnConfig, GridConfig};
pub use domain::entities::column::{
    ColumnKind, ColumnSpec, FilterQueryOverride, FilterTermTransform, RowTransform,
};
pub use domain::entities::envelope::{Envelope, ShapedRow};
pub use domain::entities::request::{
    FilterDirective, FilterRequest, RequestParams, SortDirection, SortDirective,
};
pub use domain::entities::row::Row;
pub use domain::entities::value::Value;
pub use error::{DirectiveKind, GridError, GridResult};
pub use infra::memory::sink::MemorySink;
pub use infra::sqlite::sink::SqliteSink;
pub use usecase::ports::sink::{
    FilterClause, FilterGroup, MatchKind, OrderDirective, QuerySink, SinkError,
};
pub use usecase::services::table_service::DataTable;
