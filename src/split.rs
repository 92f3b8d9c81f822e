//! Partition a layer into per-group sub-layers by a column value, e.g. break
//! a national county file into per-state extracts on `STATEFP`.

use ahash::AHashMap;
use anyhow::{anyhow, Result};
use polars::frame::DataFrame;
use polars::prelude::IdxCa;

use crate::common;
use crate::layer::FeatureLayer;

/// Split `layer` into one sub-layer per distinct value of `column`.
/// Groups come back in first-seen row order; each keeps the parent's CRS.
pub fn split_by_column(
    layer: &FeatureLayer,
    column: &str,
) -> Result<Vec<(String, FeatureLayer)>> {
    let keys = common::column_as_strings(layer.table(), column)
        .ok_or_else(|| anyhow!("column {column:?} not found"))?;

    let mut order: Vec<String> = Vec::new();
    let mut groups: AHashMap<String, Vec<u32>> = AHashMap::new();
    for (i, key) in keys.iter().enumerate() {
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key.clone());
                Vec::new()
            })
            .push(i as u32);
    }

    order
        .into_iter()
        .map(|key| {
            let rows = &groups[&key];
            let geoms = rows
                .iter()
                .map(|&i| layer.geoms()[i as usize].clone())
                .collect();
            let table = if layer.table().width() == 0 {
                DataFrame::empty()
            } else {
                layer.table().take(&IdxCa::from_vec("idx".into(), rows.clone()))?
            };
            Ok((key, FeatureLayer::new(geoms, table, layer.crs().cloned())?))
        })
        .collect()
}
