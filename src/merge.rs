//! Boundary merger: collapse raw catchment fragments into one multi-part
//! feature per region identifier.

use std::path::{Path, PathBuf};

use ahash::AHashMap;
use anyhow::{Context, Result};
use geo::MultiPolygon;
use polars::frame::DataFrame;
use polars::prelude::{NamedFrom, Series};
use walkdir::WalkDir;

use crate::io;
use crate::layer::FeatureLayer;

/// How a fragment's region identifier is encoded on disk. Three conventions
/// exist across the historical vintages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdRule {
    /// 2007: `AL-500.shp` — token between the first dash and the extension.
    DashedFileName,
    /// 2008-2009: `AL_500.shp` — token between the first underscore and the
    /// extension.
    UnderscoredFileName,
    /// 2010 onward: each fragment lives in a `<state>_<code>` subdirectory.
    SubdirName,
}

impl IdRule {
    pub fn for_year(year: i32) -> Self {
        match year {
            ..=2007 => IdRule::DashedFileName,
            2008..=2009 => IdRule::UnderscoredFileName,
            _ => IdRule::SubdirName,
        }
    }

    /// Extract the region identifier for a fragment at `path`, or `None`
    /// when the name does not follow this rule's convention.
    pub fn extract(&self, path: &Path) -> Option<String> {
        fn token_after(name: &str, sep: char) -> Option<String> {
            let tail = name.split(sep).nth(1)?;
            let id = tail.split('.').next()?;
            (!id.is_empty()).then(|| id.to_string())
        }

        match self {
            IdRule::DashedFileName => token_after(path.file_name()?.to_str()?, '-'),
            IdRule::UnderscoredFileName => token_after(path.file_name()?.to_str()?, '_'),
            IdRule::SubdirName => token_after(path.parent()?.file_name()?.to_str()?, '_'),
        }
    }
}

/// Collapse raw fragments into one multi-part feature per region identifier.
///
/// Fragment geometries are concatenated, not dissolved: self-overlapping
/// fragments stay as they are. Attributes come from the first row of the
/// first fragment seen for each identifier (differences across fragments are
/// not reconciled), and a `region_id` column carries the identifier itself.
/// Empty input produces an empty layer, not an error.
pub fn merge_fragments(fragments: Vec<(String, FeatureLayer)>) -> Result<FeatureLayer> {
    if fragments.is_empty() {
        return Ok(FeatureLayer::empty());
    }

    // Group fragment indices by identifier, preserving first-seen order.
    let mut order: Vec<String> = Vec::new();
    let mut groups: AHashMap<String, Vec<usize>> = AHashMap::new();
    for (i, (id, _)) in fragments.iter().enumerate() {
        groups
            .entry(id.clone())
            .or_insert_with(|| {
                order.push(id.clone());
                Vec::new()
            })
            .push(i);
    }

    // The first fragment's schema defines the merged attribute schema.
    let schema = fragments[0].1.table().clone();
    let crs = fragments.iter().find_map(|(_, layer)| layer.crs().cloned());

    let mut geoms = Vec::with_capacity(order.len());
    let mut table = schema.clear();
    for id in &order {
        let members = &groups[id];

        // Concatenate every polygon part of every member fragment.
        let polys: Vec<_> = members
            .iter()
            .flat_map(|&i| fragments[i].1.geoms().iter())
            .flat_map(|mp| mp.0.iter().cloned())
            .collect();
        geoms.push(MultiPolygon(polys));

        let row = attribute_row(&schema, fragments[members[0]].1.table())?;
        if table.vstack_mut(&row).is_err() {
            table.vstack_mut(&null_row(&schema)?)?;
        }
    }

    table.with_column(Series::new("region_id".into(), order))?;
    FeatureLayer::new(geoms, table, crs)
}

/// First row of `table` shaped to `schema`'s columns; a null row when the
/// fragment's schema does not line up with the first fragment's.
fn attribute_row(schema: &DataFrame, table: &DataFrame) -> Result<DataFrame> {
    if table.height() > 0 {
        let names = schema.get_columns().iter().map(|c| c.name().clone());
        if let Ok(row) = table.slice(0, 1).select(names) {
            return Ok(row);
        }
    }
    null_row(schema)
}

fn null_row(schema: &DataFrame) -> Result<DataFrame> {
    Ok(DataFrame::new(
        schema
            .get_columns()
            .iter()
            .map(|c| Series::full_null(c.name().clone(), 1, c.dtype()).into())
            .collect(),
    )?)
}

/// Load and merge every fragment shapefile under `dir`.
///
/// Returns `Ok(None)` when `dir` does not exist — an expected coverage gap
/// in the historical data, not an error. Files whose names don't follow the
/// identifier convention are passed over.
pub fn merge_directory(dir: &Path, rule: IdRule) -> Result<Option<FeatureLayer>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("shp"))
        })
        .collect();
    paths.sort();

    let mut fragments = Vec::with_capacity(paths.len());
    for path in &paths {
        let Some(id) = rule.extract(path) else { continue };
        let layer = io::read_layer(path)
            .with_context(|| format!("failed to load fragment {}", path.display()))?;
        fragments.push((id, layer));
    }

    merge_fragments(fragments).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_rule_extracts_2007_names() {
        let rule = IdRule::for_year(2007);
        assert_eq!(rule, IdRule::DashedFileName);
        assert_eq!(rule.extract(Path::new("AL-500.shp")).as_deref(), Some("500"));
        assert_eq!(rule.extract(Path::new("dir/MI-501.shp")).as_deref(), Some("501"));
        assert_eq!(rule.extract(Path::new("plain.shp")), None);
    }

    #[test]
    fn underscore_rule_extracts_2008_names() {
        let rule = IdRule::for_year(2008);
        assert_eq!(rule, IdRule::UnderscoredFileName);
        assert_eq!(rule.extract(Path::new("AL_500.shp")).as_deref(), Some("500"));
        assert_eq!(IdRule::for_year(2009), IdRule::UnderscoredFileName);
    }

    #[test]
    fn subdir_rule_extracts_2010_names() {
        let rule = IdRule::for_year(2010);
        assert_eq!(rule, IdRule::SubdirName);
        assert_eq!(
            rule.extract(Path::new("base/AK_502/coc.shp")).as_deref(),
            Some("502"),
        );
        assert_eq!(IdRule::for_year(2023), IdRule::SubdirName);
    }

    #[test]
    fn empty_input_merges_to_empty_layer() {
        let merged = merge_fragments(Vec::new()).unwrap();
        assert!(merged.is_empty());
        assert_eq!(merged.table().width(), 0);
    }
}
