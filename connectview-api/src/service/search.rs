//! Filtering and ordering of the connector table

use std::cmp::Ordering;

use connectview_core::models::{ConnectorQuery, ConnectorRecord, SortColumn, SortOrder};

/// Filter `records` by the query's search text, then sort them
///
/// The sort is stable, so records comparing equal keep their input order in
/// both directions.
#[must_use]
pub fn apply(records: Vec<ConnectorRecord>, query: &ConnectorQuery) -> Vec<ConnectorRecord> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut records: Vec<_> = match needle {
        Some(needle) => records
            .into_iter()
            .filter(|r| matches_search(r, &needle))
            .collect(),
        None => records,
    };

    records.sort_by(|a, b| match query.sort_order {
        SortOrder::Asc => compare(a, b, query.order_by),
        SortOrder::Desc => compare(b, a, query.order_by),
    });
    records
}

/// `needle` must already be lowercase
fn matches_search(record: &ConnectorRecord, needle: &str) -> bool {
    [
        record.name.as_str(),
        record.connect_display_name.as_str(),
        record.status.state.as_str(),
        record.connector_type.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

fn compare(a: &ConnectorRecord, b: &ConnectorRecord, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Name => a.name.cmp(&b.name),
        SortColumn::Connect => a.connect.cmp(&b.connect),
        SortColumn::Type => a.connector_type.as_str().cmp(b.connector_type.as_str()),
        SortColumn::Status => a.status.state.cmp(&b.status.state),
    }
}
