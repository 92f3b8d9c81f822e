//! Shapefile reading and writing for feature layers.

use std::fs;
use std::path::Path;

use ahash::AHashSet;
use anyhow::{anyhow, Context, Result};
use polars::frame::DataFrame;
use polars::prelude::{AnyValue, Column, DataType};
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};

use crate::common;
use crate::crs::Crs;
use crate::layer::FeatureLayer;

/// Read a shapefile (geometry + dBASE attributes + `.prj` sidecar) into a layer.
///
/// A missing or unrecognized `.prj` yields a layer with no CRS, which the
/// overlay engine treats as a skip condition — legacy catchment files
/// routinely ship without one.
pub fn read_layer(path: &Path) -> Result<FeatureLayer> {
    let mut reader = shapefile::Reader::from_path(path)
        .with_context(|| format!("failed to open shapefile: {}", path.display()))?;

    let mut geoms = Vec::new();
    let mut records = Vec::new();
    for item in reader.iter_shapes_and_records() {
        let (shape, record) = item
            .with_context(|| format!("error reading shape/record from {}", path.display()))?;
        geoms.push(common::shape_to_multipolygon(shape)?);
        records.push(record);
    }

    let table = records_to_dataframe(&records)?;
    let crs = read_prj(path);
    FeatureLayer::new(geoms, table, crs)
}

fn read_prj(shp_path: &Path) -> Option<Crs> {
    let wkt = fs::read_to_string(shp_path.with_extension("prj")).ok()?;
    Crs::from_prj_wkt(&wkt)
}

/// Convert dBASE records into a DataFrame, one column per attribute field.
/// Column types follow the first record's field types.
fn records_to_dataframe(records: &[Record]) -> Result<DataFrame> {
    let Some(first) = records.first() else {
        return Ok(DataFrame::empty());
    };

    // dBASE records iterate in hash order; sort names for a stable schema.
    let mut names: Vec<String> = first.clone().into_iter().map(|(name, _)| name).collect();
    names.sort();

    let mut columns = Vec::with_capacity(names.len());
    for name in &names {
        let column = match first.get(name) {
            Some(
                FieldValue::Numeric(_)
                | FieldValue::Float(_)
                | FieldValue::Double(_)
                | FieldValue::Currency(_),
            ) => Column::new(
                name.as_str().into(),
                records
                    .iter()
                    .map(|r| numeric_field(r.get(name)))
                    .collect::<Vec<Option<f64>>>(),
            ),
            Some(FieldValue::Integer(_)) => Column::new(
                name.as_str().into(),
                records
                    .iter()
                    .map(|r| match r.get(name) {
                        Some(FieldValue::Integer(v)) => Some(*v as i64),
                        _ => None,
                    })
                    .collect::<Vec<Option<i64>>>(),
            ),
            Some(FieldValue::Logical(_)) => Column::new(
                name.as_str().into(),
                records
                    .iter()
                    .map(|r| match r.get(name) {
                        Some(FieldValue::Logical(v)) => *v,
                        _ => None,
                    })
                    .collect::<Vec<Option<bool>>>(),
            ),
            _ => Column::new(
                name.as_str().into(),
                records
                    .iter()
                    .map(|r| character_field(r.get(name)))
                    .collect::<Vec<Option<String>>>(),
            ),
        };
        columns.push(column);
    }

    Ok(DataFrame::new(columns)?)
}

fn numeric_field(value: Option<&FieldValue>) -> Option<f64> {
    match value {
        Some(FieldValue::Numeric(v)) => *v,
        Some(FieldValue::Float(v)) => v.map(f64::from),
        Some(FieldValue::Double(v)) => Some(*v),
        Some(FieldValue::Currency(v)) => Some(*v),
        Some(FieldValue::Integer(v)) => Some(*v as f64),
        _ => None,
    }
}

fn character_field(value: Option<&FieldValue>) -> Option<String> {
    match value {
        Some(FieldValue::Character(v)) => v.as_ref().map(|s| s.trim().to_string()),
        Some(FieldValue::Memo(s)) => Some(s.clone()),
        Some(other) => Some(format!("{other:?}")),
        None => None,
    }
}

/// Write a layer to `path` as a shapefile, mapping attribute columns back to
/// dBASE fields.
///
/// Column names longer than the 10-byte dBASE limit are truncated (and
/// deduplicated) in the `.dbf`; the CSV output keeps the full names. A `.prj`
/// sidecar is written whenever the layer has a CRS with a known WKT form.
pub fn write_layer(layer: &FeatureLayer, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        common::ensure_dir_exists(parent)?;
    }

    let fields = dbf_fields(layer.table());

    let mut builder = TableWriterBuilder::new();
    for (dbf_name, column) in &fields {
        let name = FieldName::try_from(dbf_name.as_str())
            .map_err(|e| anyhow!("invalid dBASE field name {dbf_name:?}: {e:?}"))?;
        builder = match column.dtype() {
            DataType::Float64 | DataType::Float32 => builder.add_numeric_field(name, 24, 10),
            DataType::Int64 | DataType::Int32 | DataType::UInt32 | DataType::UInt64 => {
                builder.add_numeric_field(name, 20, 0)
            }
            DataType::Boolean => builder.add_logical_field(name),
            _ => builder.add_character_field(name, 128),
        };
    }

    let mut writer = shapefile::Writer::from_path(path, builder)
        .with_context(|| format!("failed to create shapefile: {}", path.display()))?;

    for (i, mp) in layer.geoms().iter().enumerate() {
        let mut record = Record::default();
        for (dbf_name, column) in &fields {
            record.insert(dbf_name.clone(), field_value(column, i)?);
        }
        writer
            .write_shape_and_record(&common::multipolygon_to_shape(mp), &record)
            .with_context(|| format!("failed to write feature {i} to {}", path.display()))?;
    }
    drop(writer);

    if let Some(wkt) = layer.crs().and_then(|crs| crs.esri_wkt()) {
        let prj = path.with_extension("prj");
        fs::write(&prj, wkt)
            .with_context(|| format!("failed to write {}", prj.display()))?;
    }

    Ok(())
}

/// Pair each column with a unique dBASE-safe (<= 10 byte) field name.
fn dbf_fields(table: &DataFrame) -> Vec<(String, &Column)> {
    let mut seen: AHashSet<String> = AHashSet::new();
    table
        .get_columns()
        .iter()
        .map(|column| {
            let full = column.name().as_str();
            let mut name: String = full.chars().take(10).collect();
            let mut counter = 0;
            while !seen.insert(name.clone()) {
                counter += 1;
                let suffix = counter.to_string();
                let keep = 10usize.saturating_sub(suffix.len());
                name = format!("{}{suffix}", full.chars().take(keep).collect::<String>());
            }
            (name, column)
        })
        .collect()
}

fn field_value(column: &Column, i: usize) -> Result<FieldValue> {
    let value = column.as_materialized_series().get(i)?;
    Ok(match value {
        AnyValue::Null => match column.dtype() {
            DataType::Float64 | DataType::Float32 => FieldValue::Numeric(None),
            DataType::Boolean => FieldValue::Logical(None),
            _ => FieldValue::Character(None),
        },
        AnyValue::String(s) => FieldValue::Character(Some(s.to_string())),
        AnyValue::StringOwned(s) => FieldValue::Character(Some(s.to_string())),
        AnyValue::Float64(v) => FieldValue::Numeric(Some(v)),
        AnyValue::Float32(v) => FieldValue::Numeric(Some(v as f64)),
        AnyValue::Int64(v) => FieldValue::Numeric(Some(v as f64)),
        AnyValue::Int32(v) => FieldValue::Numeric(Some(v as f64)),
        AnyValue::UInt32(v) => FieldValue::Numeric(Some(v as f64)),
        AnyValue::UInt64(v) => FieldValue::Numeric(Some(v as f64)),
        AnyValue::Boolean(v) => FieldValue::Logical(Some(v)),
        other => FieldValue::Character(Some(other.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dbf_names_are_truncated_and_deduplicated() {
        let table = DataFrame::new(vec![
            Column::new("source_COUNTYFP".into(), vec!["a"]),
            Column::new("source_COUNTYFP10".into(), vec!["b"]),
            Column::new("short".into(), vec!["c"]),
        ])
        .unwrap();

        let fields = dbf_fields(&table);
        let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names[0], "source_COU");
        assert_eq!(names[1], "source_CO1");
        assert_eq!(names[2], "short");
        assert!(names.iter().all(|n| n.len() <= 10));
    }
}
