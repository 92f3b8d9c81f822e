//! Overlay attribution engine: intersect a source (catchment) layer with a
//! target (census unit) layer and derive each intersection fragment's share
//! of its parent target feature's area.

use std::panic::{catch_unwind, AssertUnwindSafe};

use ahash::AHashMap;
use anyhow::Result;
use geo::{Area, BooleanOps, BoundingRect, Buffer, MultiPolygon, Rect, Simplify};
use polars::frame::DataFrame;
use polars::prelude::{IdxCa, NamedFrom, Series};
use rstar::{RTree, RTreeObject, AABB};

use crate::common;
use crate::crs::{self, Crs};
use crate::layer::FeatureLayer;
use crate::skip::{LayerRole, Skip};

/// Name of the derived area-share column.
pub const SHARE_COLUMN: &str = "%_of_target";

/// Tunables for one overlay run. All call-site state is explicit here; there
/// are no module-level defaults to mutate.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Buffer distance applied to both layers before overlay, in working-CRS
    /// units. The default suits the degrees-based source data.
    pub buffer_distance: f64,
    /// Douglas-Peucker tolerance applied after buffering.
    pub simplify_tolerance: f64,
    /// Whether to run the buffer/simplify conditioning pass at all.
    pub condition: bool,
    /// Drop the scratch `area`/`total_area` columns from the output schema,
    /// keeping only the derived share.
    pub clean_schema: bool,
    /// CRS used for area measurement when it should differ from the working
    /// (overlay) CRS. `None` measures in the working CRS, which keeps ratios
    /// internally consistent but yields degree-based areas for geographic
    /// data; pass `Crs::conus_albers()` for physically meaningful areas.
    pub area_crs: Option<Crs>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            buffer_distance: 1e-4,
            simplify_tolerance: 1e-4,
            condition: true,
            clean_schema: true,
            area_crs: None,
        }
    }
}

/// Outcome of attributing one (source, target) cell: either the intersection
/// layer, or the reason the cell was skipped.
#[derive(Debug)]
pub enum Attribution {
    Records(FeatureLayer),
    Skipped(Skip),
}

/// Overlay `source` against `target` and attribute areas.
///
/// The source CRS is the working frame; the target is reprojected into it
/// when they differ. Every intersection record carries both parents'
/// attributes, namespaced `source_*` / `target_*` so identically named
/// columns can never collide, plus the derived `%_of_target` share.
///
/// Per-cell data conditions (missing CRS, reprojection failure, degenerate
/// overlay, absent key column) come back as [`Attribution::Skipped`]; hard
/// errors are reserved for conditions the batch cannot continue from.
pub fn attribute(
    source: &FeatureLayer,
    target: &FeatureLayer,
    target_key_field: &str,
    config: &OverlayConfig,
) -> Result<Attribution> {
    // 1. Both layers need a usable CRS.
    let Some(working_crs) = source.crs() else {
        return Ok(Attribution::Skipped(Skip::MissingCrs { role: LayerRole::Source }));
    };
    let Some(target_crs) = target.crs() else {
        return Ok(Attribution::Skipped(Skip::MissingCrs { role: LayerRole::Target }));
    };

    // 2. Reproject the target into the source frame.
    let target_geoms = if working_crs != target_crs {
        match crs::reproject(target.geoms(), target_crs, working_crs) {
            Ok(geoms) => geoms,
            Err(e) => {
                return Ok(Attribution::Skipped(Skip::Reprojection {
                    cause: format!("{e:#}"),
                }))
            }
        }
    } else {
        target.geoms().to_vec()
    };

    // 3. Optional conditioning to knock out slivers and self-intersections.
    let (source_geoms, target_geoms) = if config.condition {
        (
            condition_geoms(source.geoms(), config),
            condition_geoms(&target_geoms, config),
        )
    } else {
        (source.geoms().to_vec(), target_geoms)
    };

    // 4. Pairwise intersections, prefiltered by target bounding boxes.
    let pairs = match overlay_pairs(&source_geoms, &target_geoms) {
        Ok(pairs) => pairs,
        Err(cause) => return Ok(Attribution::Skipped(Skip::Overlay { cause })),
    };

    // 5. The key column must exist before any ratio is computed; a missing
    //    column is a schema mismatch, not a silent NaN factory.
    let Some(target_keys) = common::column_as_strings(target.table(), target_key_field) else {
        return Ok(Attribution::Skipped(Skip::SchemaMismatch {
            field: target_key_field.to_string(),
        }));
    };

    build_records(source, target, &target_geoms, pairs, &target_keys, working_crs, config)
        .map(Attribution::Records)
}

fn condition_geoms(geoms: &[MultiPolygon<f64>], config: &OverlayConfig) -> Vec<MultiPolygon<f64>> {
    geoms
        .iter()
        .map(|mp| mp.buffer(config.buffer_distance).simplify(config.simplify_tolerance))
        .collect()
}

/// R-tree entry: the bounding box of one target feature.
struct TargetBounds {
    idx: usize,
    rect: Rect<f64>,
}

impl RTreeObject for TargetBounds {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.rect.min().x, self.rect.min().y],
            [self.rect.max().x, self.rect.max().y],
        )
    }
}

/// All non-empty pairwise intersections, restricted to pairs whose bounding
/// boxes overlap (the target side is spatially indexed).
///
/// The boolean ops can panic on numerically degenerate rings, so the pass
/// runs under `catch_unwind` and such a failure is reported as a cell-scoped
/// overlay failure rather than tearing down the batch.
fn overlay_pairs(
    source: &[MultiPolygon<f64>],
    target: &[MultiPolygon<f64>],
) -> std::result::Result<Vec<(usize, usize, MultiPolygon<f64>)>, String> {
    let entries: Vec<TargetBounds> = target
        .iter()
        .enumerate()
        .filter_map(|(idx, mp)| mp.bounding_rect().map(|rect| TargetBounds { idx, rect }))
        .collect();
    let rtree = RTree::bulk_load(entries);

    catch_unwind(AssertUnwindSafe(|| {
        let mut pairs = Vec::new();
        for (i, shape) in source.iter().enumerate() {
            let Some(rect) = shape.bounding_rect() else { continue };
            let envelope = AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            );

            let mut hits: Vec<usize> = rtree
                .locate_in_envelope_intersecting(&envelope)
                .map(|bounds| bounds.idx)
                .collect();
            hits.sort_unstable();

            for j in hits {
                let piece = shape.intersection(&target[j]);
                if !piece.0.is_empty() {
                    pairs.push((i, j, piece));
                }
            }
        }
        pairs
    }))
    .map_err(|panic| {
        panic
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "geometry overlay panicked".to_string())
    })
}

fn build_records(
    source: &FeatureLayer,
    target: &FeatureLayer,
    target_geoms: &[MultiPolygon<f64>],
    pairs: Vec<(usize, usize, MultiPolygon<f64>)>,
    target_keys: &[String],
    working_crs: &Crs,
    config: &OverlayConfig,
) -> Result<FeatureLayer> {
    // Total area per target key, computed once per target feature and
    // deduplicated so that several fragments of one target never
    // double-count its denominator.
    let mut totals: AHashMap<&str, f64> = AHashMap::new();
    for &(_, j, _) in &pairs {
        let key = target_keys[j].as_str();
        if !totals.contains_key(key) {
            totals.insert(key, measure_area(&target_geoms[j], working_crs, config)?);
        }
    }

    let mut areas = Vec::with_capacity(pairs.len());
    let mut total_areas = Vec::with_capacity(pairs.len());
    let mut shares = Vec::with_capacity(pairs.len());
    for (_, j, piece) in &pairs {
        let area = measure_area(piece, working_crs, config)?;
        let total = totals[target_keys[*j].as_str()];
        areas.push(area);
        total_areas.push(total);
        shares.push(if total > 0.0 { area / total } else { 0.0 });
    }

    let src_rows: Vec<u32> = pairs.iter().map(|&(i, _, _)| i as u32).collect();
    let tgt_rows: Vec<u32> = pairs.iter().map(|&(_, j, _)| j as u32).collect();

    let mut table = prefixed_rows(source.table(), &src_rows, "source_")?;
    let target_rows = prefixed_rows(target.table(), &tgt_rows, "target_")?;
    table.hstack_mut(target_rows.get_columns())?;

    if !config.clean_schema {
        table.with_column(Series::new("area".into(), areas))?;
        table.with_column(Series::new("total_area".into(), total_areas))?;
    }
    table.with_column(Series::new(SHARE_COLUMN.into(), shares))?;

    let geoms: Vec<MultiPolygon<f64>> = pairs.into_iter().map(|(_, _, piece)| piece).collect();
    FeatureLayer::new(geoms, table, Some(working_crs.clone()))
}

/// Planar area of a geometry, measured either in the working CRS or in the
/// configured dedicated area CRS.
fn measure_area(mp: &MultiPolygon<f64>, working_crs: &Crs, config: &OverlayConfig) -> Result<f64> {
    match &config.area_crs {
        Some(area_crs) if area_crs != working_crs => {
            let projected = crs::reproject(std::slice::from_ref(mp), working_crs, area_crs)?;
            Ok(projected[0].unsigned_area())
        }
        _ => Ok(mp.unsigned_area()),
    }
}

/// Take `rows` from `table` and prefix every column name with the layer
/// role, so source and target attributes can never collide after the join.
fn prefixed_rows(table: &DataFrame, rows: &[u32], prefix: &str) -> Result<DataFrame> {
    if table.width() == 0 {
        return Ok(DataFrame::empty());
    }
    let indices = IdxCa::from_vec("idx".into(), rows.to_vec());
    let taken = table.take(&indices)?;
    Ok(DataFrame::new(
        taken
            .get_columns()
            .iter()
            .map(|c| {
                let name = format!("{prefix}{}", c.name());
                c.as_materialized_series().clone().with_name(name.into()).into()
            })
            .collect(),
    )?)
}
