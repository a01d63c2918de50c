use thiserror::Error;

use crate::domain::entities::request::SortDirection;
use crate::domain::entities::row::Row;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("{0}")]
    Message(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDirective {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Field contains the term, case rules per backend default.
    Contains,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub field: String,
    pub term: String,
    pub matching: MatchKind,
}

impl FilterClause {
    pub fn contains(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            term: term.into(),
            matching: MatchKind::Contains,
        }
    }

    pub fn exact(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            term: term.into(),
            matching: MatchKind::Exact,
        }
    }
}

/// Clauses OR-ed together; successive groups are AND-ed by the sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterGroup {
    pub clauses: Vec<FilterClause>,
}

impl FilterGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(clause: FilterClause) -> Self {
        Self {
            clauses: vec![clause],
        }
    }

    pub fn push(&mut self, clause: FilterClause) {
        self.clauses.push(clause);
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }
}

/// The operations a data source must offer to back a grid request.
///
/// Calls accumulate state: one sink serves exactly one request. `count` must
/// ignore pagination and ordering, and reflect every filter group applied so
/// far. A negative `limit` means unbounded; a negative `offset` means zero.
pub trait QuerySink {
    fn count(&mut self) -> Result<i64, SinkError>;
    fn paginate(&mut self, offset: i64, limit: i64) -> Result<(), SinkError>;
    fn order(&mut self, directives: &[OrderDirective]) -> Result<(), SinkError>;
    fn filter(&mut self, group: &FilterGroup) -> Result<(), SinkError>;
    fn fetch(&mut self) -> Result<Vec<Row>, SinkError>;
}

impl<S: QuerySink + ?Sized> QuerySink for Box<S> {
    fn count(&mut self) -> Result<i64, SinkError> {
        (**self).count()
    }

    fn paginate(&mut self, offset: i64, limit: i64) -> Result<(), SinkError> {
        (**self).paginate(offset, limit)
    }

    fn order(&mut self, directives: &[OrderDirective]) -> Result<(), SinkError> {
        (**self).order(directives)
    }

    fn filter(&mut self, group: &FilterGroup) -> Result<(), SinkError> {
        (**self).filter(group)
    }

    fn fetch(&mut self) -> Result<Vec<Row>, SinkError> {
        (**self).fetch()
    }
}
