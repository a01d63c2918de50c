use std::cmp::Ordering;

use crate::domain::entities::request::SortDirection;
use crate::domain::entities::row::Row;
use crate::domain::entities::value::Value;
use crate::usecase::ports::sink::{
    FilterClause, FilterGroup, MatchKind, OrderDirective, QuerySink, SinkError,
};

/// In-process sink over a fixed set of rows.
///
/// Fields are addressed by row field name, so a column's source field must
/// match the key the rows carry.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    rows: Vec<Row>,
    filters: Vec<FilterGroup>,
    order: Vec<OrderDirective>,
    window: Option<(i64, i64)>,
}

impl MemorySink {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    fn matches(&self, row: &Row) -> bool {
        self.filters
            .iter()
            .all(|group| {
                group.is_empty() || group.clauses.iter().any(|clause| clause_matches(clause, row))
            })
    }
}

fn clause_matches(clause: &FilterClause, row: &Row) -> bool {
    let Some(value) = row.get(&clause.field) else {
        return false;
    };
    if value.is_null() {
        return false;
    }

    let text = value.to_text();
    match clause.matching {
        MatchKind::Contains => text.to_lowercase().contains(&clause.term.to_lowercase()),
        MatchKind::Exact => text == clause.term,
    }
}

fn compare_rows(order: &[OrderDirective], a: &Row, b: &Row) -> Ordering {
    for directive in order {
        let left = a.get(&directive.field).unwrap_or(&Value::Null);
        let right = b.get(&directive.field).unwrap_or(&Value::Null);
        let ordering = match directive.direction {
            SortDirection::Asc => left.sort_cmp(right),
            SortDirection::Desc => right.sort_cmp(left),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl QuerySink for MemorySink {
    fn count(&mut self) -> Result<i64, SinkError> {
        let count = self.rows.iter().filter(|row| self.matches(row)).count();
        Ok(count as i64)
    }

    fn paginate(&mut self, offset: i64, limit: i64) -> Result<(), SinkError> {
        self.window = Some((offset, limit));
        Ok(())
    }

    fn order(&mut self, directives: &[OrderDirective]) -> Result<(), SinkError> {
        self.order.extend_from_slice(directives);
        Ok(())
    }

    fn filter(&mut self, group: &FilterGroup) -> Result<(), SinkError> {
        self.filters.push(group.clone());
        Ok(())
    }

    fn fetch(&mut self) -> Result<Vec<Row>, SinkError> {
        let mut rows: Vec<Row> = self
            .rows
            .iter()
            .filter(|row| self.matches(row))
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare_rows(&self.order, a, b));

        let Some((offset, limit)) = self.window else {
            return Ok(rows);
        };
        let skip = usize::try_from(offset).unwrap_or(0);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(skip).take(take).collect())
    }
}
