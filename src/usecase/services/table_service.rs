use tracing::{debug, debug_span, warn};

use crate::config::GridConfig;
use crate::domain::entities::column::ColumnSpec;
use crate::domain::entities::envelope::Envelope;
use crate::domain::entities::request::RequestParams;
use crate::error::{DirectiveKind, GridError, GridResult};
use crate::usecase::ports::sink::{FilterClause, FilterGroup, OrderDirective, QuerySink};
use crate::usecase::services::shaping::shape_rows;

/// Drives one grid request through a [`QuerySink`].
///
/// The sink accumulates clauses, so a `DataTable` serves a single request.
pub struct DataTable<S: QuerySink> {
    sink: S,
    request: RequestParams,
    columns: Vec<ColumnSpec>,
    reserved_keys: Vec<String>,
}

struct ResolvedFilter<'a> {
    column: &'a ColumnSpec,
    term: String,
}

impl<S: QuerySink> DataTable<S> {
    pub fn new<I, C>(sink: S, request: RequestParams, columns: I) -> GridResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnSpec>,
    {
        let columns: Vec<ColumnSpec> = columns.into_iter().map(Into::into).collect();
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].iter().any(|other| other.name() == column.name()) {
                return Err(GridError::DuplicateColumn(column.name().to_string()));
            }
        }

        Ok(Self {
            sink,
            request,
            columns,
            reserved_keys: GridConfig::default().reserved_keys,
        })
    }

    pub fn with_config(mut self, config: &GridConfig) -> Self {
        self.reserved_keys = config.reserved_keys.clone();
        self
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn request(&self) -> &RequestParams {
        &self.request
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn produce_json(&mut self) -> GridResult<String> {
        let envelope = self.produce()?;
        Ok(serde_json::to_string(&envelope)?)
    }

    pub fn produce(&mut self) -> GridResult<Envelope> {
        let echo = self.request.echo_token();
        let span = debug_span!("produce", echo);
        let _guard = span.enter();

        let columns = &self.columns;
        let request = &self.request;
        let sink = &mut self.sink;

        let order = resolve_order(columns, request)?;
        let filters = if request.is_filter_requested() {
            Some(resolve_filters(columns, request)?)
        } else {
            None
        };

        let total_count = sink.count()?;
        let mut filtered_count = total_count;
        debug!(total_count, "counted source rows");

        let (start, length) = (request.pagination_start(), request.pagination_length());
        sink.paginate(start, length)?;
        debug!(start, length, "applied pagination window");

        if let Some(filters) = filters {
            let mut group = FilterGroup::new();
            for filter in filters {
                let term = filter.column.apply_filter_term_transform(&filter.term);
                if filter.column.apply_filter_query_override(&mut *sink, &term)? {
                    debug!(column = filter.column.name(), "filter handled by column hook");
                    continue;
                }
                group.push(FilterClause::contains(filter.column.source_field(), term));
            }

            if !group.is_empty() {
                sink.filter(&group)?;
            }
            filtered_count = sink.count()?;
            debug!(clauses = group.len(), filtered_count, "applied filter group");
        }

        sink.order(&order)?;
        debug!(directives = order.len(), "applied ordering");

        let rows = sink.fetch()?;
        debug!(rows = rows.len(), "fetched rows");

        Ok(Envelope {
            echo,
            total_count,
            filtered_count,
            rows: shape_rows(columns, &self.reserved_keys, rows),
        })
    }
}

fn resolve_column<'a>(
    columns: &'a [ColumnSpec],
    kind: DirectiveKind,
    index: i64,
) -> GridResult<&'a ColumnSpec> {
    usize::try_from(index)
        .ok()
        .and_then(|idx| columns.get(idx))
        .ok_or_else(|| {
            warn!(%kind, index, declared = columns.len(), "rejected column reference");
            GridError::InvalidColumn {
                kind,
                index,
                declared: columns.len(),
            }
        })
}

fn resolve_order(
    columns: &[ColumnSpec],
    request: &RequestParams,
) -> GridResult<Vec<OrderDirective>> {
    let mut order = Vec::new();
    for directive in request.sort_directives() {
        let column = resolve_column(columns, DirectiveKind::Sort, directive.column_idx)?;
        if column.is_sortable() && directive.enabled {
            order.push(OrderDirective {
                field: column.source_field().to_string(),
                direction: directive.direction,
            });
        }
    }
    Ok(order)
}

fn resolve_filters<'a>(
    columns: &'a [ColumnSpec],
    request: &RequestParams,
) -> GridResult<Vec<ResolvedFilter<'a>>> {
    let filter = request.filter_request();
    let mut resolved = Vec::new();
    for directive in &filter.columns {
        let column = resolve_column(columns, DirectiveKind::Filter, directive.column_idx)?;
        if !column.is_searchable() || !directive.enabled {
            continue;
        }

        let term = if directive.term.is_empty() {
            filter.term.clone()
        } else {
            directive.term.clone()
        };
        resolved.push(ResolvedFilter { column, term });
    }
    Ok(resolved)
}
