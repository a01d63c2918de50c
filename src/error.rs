use std::fmt;

use thiserror::Error;

use crate::usecase::ports::sink::SinkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Sort,
    Filter,
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectiveKind::Sort => f.write_str("sort"),
            DirectiveKind::Filter => f.write_str("filter"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid column reference in {kind} directive: {index} (columns: {declared})")]
    InvalidColumn {
        kind: DirectiveKind,
        index: i64,
        declared: usize,
    },

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type GridResult<T> = Result<T, GridError>;
