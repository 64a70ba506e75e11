//! Table controls over JSON rows described by a [`TableSchema`].

use crate::config::{PersistTarget, TableSchema};
use crate::controls::TableControls;
use crate::error::Result;
use crate::filtering::{FilterCategory, parse_date};
use crate::persistence::MemoryStorage;
use crate::state::SortValue;
use crate::url_params::DocumentLocation;
use serde_json::Value;
use std::collections::HashMap;

/// Look up a field of a JSON row. A leading `/` makes it a JSON pointer.
fn field<'a>(item: &'a Value, name: &str) -> Option<&'a Value> {
    if name.starts_with('/') {
        item.pointer(name)
    } else {
        item.get(name)
    }
}

/// Text form of a row field, as matched by filters.
///
/// Arrays are comma-joined so label categories see one token per element.
#[must_use]
pub fn field_text(item: &Value, name: &str) -> String {
    field(item, name).map_or_else(String::new, value_text)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(values) => values.iter().map(value_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Sort projection of a JSON value: numbers, then dates, then text.
#[must_use]
pub fn sort_value(value: Option<&Value>) -> SortValue {
    match value {
        None | Some(Value::Null) => SortValue::Missing,
        Some(Value::Number(n)) => n.as_f64().map_or(SortValue::Missing, SortValue::Number),
        Some(Value::String(s)) => parse_date(s).map_or_else(|| SortValue::from(s.as_str()), SortValue::Date),
        Some(other) => SortValue::Text(value_text(other)),
    }
}

/// Build controls over JSON rows from a schema.
///
/// Storage persistence gets a fresh in-memory backend, so a one-shot
/// evaluation behaves as if nothing was stored yet.
pub fn json_table(
    schema: &TableSchema,
    items: Vec<Value>,
    location: DocumentLocation,
    remote: bool,
) -> Result<TableControls<Value>> {
    let mut builder = TableControls::<Value>::builder(schema.options.clone());

    for column in &schema.columns {
        let label = if column.label.is_empty() {
            column.key.clone()
        } else {
            column.label.clone()
        };
        builder = builder.column(column.key.clone(), label);
    }
    for column in &schema.sortable_columns {
        builder = builder.sortable(column.clone());
    }
    for (column, remote_field) in &schema.remote_sort_fields {
        builder = builder.remote_sort_field(column.clone(), remote_field.clone());
    }
    for filter in &schema.implicit_filters {
        builder = builder.implicit_filter(filter.clone());
    }

    for spec in &schema.filters {
        let item_field = spec.item_field().to_string();
        let mut category = FilterCategory::new(spec.key.clone(), spec.filter_kind(), spec.title.clone())
            .with_item_value(move |item: &Value| field_text(item, &item_field));
        if let Some(placeholder) = &spec.placeholder {
            category = category.with_placeholder(placeholder.clone());
        }
        if let Some(server_field) = &spec.server_field {
            category = category.with_server_field(server_field.clone());
        }
        if let Some(operator) = spec.operator {
            category = category.with_operator(operator);
        }
        builder = builder.filter_category(category);
    }

    let id_field = schema.id_field.clone();
    let sortable = schema.sortable_columns.clone();
    builder = builder
        .row_key(move |item: &Value| field_text(item, &id_field))
        .sort_values(move |item: &Value| {
            sortable
                .iter()
                .map(|column| (column.clone(), sort_value(field(item, column))))
                .collect::<HashMap<_, _>>()
        });

    if schema.options.persist_to.uses(PersistTarget::Storage) {
        builder = builder.storage(MemoryStorage::shared());
    }
    builder = if remote { builder.remote() } else { builder.local(items) };
    builder.location(location).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_text() {
        let item = json!({
            "id": 7,
            "name": "openssl",
            "labels": ["crypto", "tls"],
            "meta": {"ecosystem": "deb"}
        });
        assert_eq!(field_text(&item, "id"), "7");
        assert_eq!(field_text(&item, "name"), "openssl");
        assert_eq!(field_text(&item, "labels"), "crypto,tls");
        assert_eq!(field_text(&item, "/meta/ecosystem"), "deb");
        assert_eq!(field_text(&item, "missing"), "");
    }

    #[test]
    fn test_sort_value_projection() {
        assert_eq!(sort_value(Some(&json!(3.5))), SortValue::Number(3.5));
        assert_eq!(sort_value(Some(&json!("zlib"))), SortValue::Text("zlib".to_string()));
        assert!(matches!(sort_value(Some(&json!("2024-02-01"))), SortValue::Date(_)));
        assert_eq!(sort_value(Some(&Value::Null)), SortValue::Missing);
        assert_eq!(sort_value(None), SortValue::Missing);
    }
}
