use crate::domain::entities::column::ColumnSpec;
use crate::domain::entities::envelope::ShapedRow;
use crate::domain::entities::row::Row;
use crate::domain::entities::value::Value;
use crate::domain::sanitize::sanitize_value;

pub fn find_column<'a>(columns: &'a [ColumnSpec], name: &str) -> Option<&'a ColumnSpec> {
    columns.iter().find(|column| column.name() == name)
}

/// Drops undeclared fields, runs row transforms, sanitizes every cell, and
/// splits reserved keys out as trailing metadata.
pub fn shape_rows(
    columns: &[ColumnSpec],
    reserved_keys: &[String],
    rows: Vec<Row>,
) -> Vec<ShapedRow> {
    rows.into_iter()
        .map(|row| shape_row(columns, reserved_keys, row))
        .collect()
}

fn shape_row(columns: &[ColumnSpec], reserved_keys: &[String], mut original: Row) -> ShapedRow {
    for column in columns.iter().filter(|column| column.is_computed()) {
        original.set(column.name(), Value::Text(String::new()));
    }

    let mut working = original.clone();
    for (name, value) in original.iter() {
        let reserved = reserved_keys.iter().any(|key| key == name);
        match find_column(columns, name) {
            Some(column) => {
                let transformed = column.apply_row_transform(value.clone(), &working, &original);
                working.set(name, sanitize_value(transformed));
            }
            None if reserved => {
                working.set(name, sanitize_value(value.clone()));
            }
            None => {
                working.remove(name);
            }
        }
    }

    strip_keys(reserved_keys, working)
}

fn strip_keys(reserved_keys: &[String], row: Row) -> ShapedRow {
    let mut values = Vec::with_capacity(row.len());
    let mut found = Vec::new();
    for (name, value) in row.into_fields() {
        if reserved_keys.contains(&name) {
            found.push((name, value));
        } else {
            values.push(value);
        }
    }

    let metadata = reserved_keys
        .iter()
        .filter_map(|key| {
            let idx = found.iter().position(|(name, _)| name == key)?;
            Some(found.swap_remove(idx))
        })
        .collect();

    ShapedRow { values, metadata }
}
