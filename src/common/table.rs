use polars::frame::DataFrame;
use polars::prelude::AnyValue;

/// Render a column's values as strings for grouping and keying.
/// Returns `None` when the column is absent from the table.
pub(crate) fn column_as_strings(table: &DataFrame, name: &str) -> Option<Vec<String>> {
    let series = table.column(name).ok()?.as_materialized_series().clone();
    Some(
        (0..series.len())
            .map(|i| series.get(i).map(|v| any_value_key(&v)).unwrap_or_default())
            .collect(),
    )
}

fn any_value_key(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}
