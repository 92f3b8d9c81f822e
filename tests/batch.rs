// Batch driver tests over a temporary data directory: the full
// read-merge-overlay-write pipeline, plus failure isolation across keys.

use std::fs;

use catchmap::{
    fragment_dir, merged_source_path, output_paths, run_batch, run_keys, target_layer_path,
    write_layer, BatchConfig, BatchKey, Crs, FeatureLayer, LayerKind, OverlayConfig,
};
use geo::{polygon, MultiPolygon};
use polars::prelude::*;
use tempfile::TempDir;

fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![polygon![
        (x: x0, y: y0),
        (x: x0 + size, y: y0),
        (x: x0 + size, y: y0 + size),
        (x: x0, y: y0 + size),
        (x: x0, y: y0),
    ]])
}

fn string_layer(
    geoms: Vec<MultiPolygon<f64>>,
    column: &str,
    values: &[&str],
    crs: Option<Crs>,
) -> FeatureLayer {
    let values: Vec<String> = values.iter().map(|s| s.to_string()).collect();
    let table = DataFrame::new(vec![Column::new(column.into(), values)]).unwrap();
    FeatureLayer::new(geoms, table, crs).unwrap()
}

/// Write a merged catchment layer and a county target layer for one state.
fn write_fixture(base: &std::path::Path, year: i32, state: &str, source_crs: Option<Crs>) {
    let source = string_layer(
        vec![square(0.0, 0.0, 2.0)],
        "region_id",
        &["WY-500"],
        source_crs,
    );
    write_layer(&source, &merged_source_path(base, year, state)).unwrap();

    let target = string_layer(
        vec![square(0.0, 0.0, 1.0), square(1.0, 1.0, 1.0)],
        "COUNTYFP",
        &["001", "003"],
        Crs::from_epsg(4269),
    );
    write_layer(&target, &target_layer_path(base, year, state, LayerKind::County).unwrap())
        .unwrap();
}

fn county_config(base: &std::path::Path, states: &[&str]) -> BatchConfig {
    BatchConfig {
        base_dir: base.to_path_buf(),
        years: vec![2012],
        states: states.iter().map(|s| s.to_string()).collect(),
        kinds: vec![LayerKind::County],
        overlay: OverlayConfig::default(),
        merge_sources: false,
        verbose: 0,
    }
}

#[test]
fn batch_writes_outputs_and_records_missing_inputs() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), 2012, "Wyoming", Crs::from_epsg(4269));
    // No fixture for Utah: that key must be skipped, not fail the run.

    let report = run_batch(&county_config(dir.path(), &["Wyoming", "Utah"]));

    assert_eq!(report.completed, 1);
    assert_eq!(report.missing_input, 1);
    assert!(report.failed.is_empty());

    let (shp, csv) = output_paths(dir.path(), 2012, "Wyoming", LayerKind::County).unwrap();
    assert!(shp.exists());
    assert!(shp.with_extension("dbf").exists());
    assert!(csv.exists());

    let table = fs::read_to_string(&csv).unwrap();
    let header = table.lines().next().unwrap();
    assert!(header.contains("source_region_id"));
    assert!(header.contains("target_COUNTYFP"));
    assert!(header.contains("%_of_target"));
    // Two counties under one catchment, so two data rows.
    assert_eq!(table.lines().count(), 3);
}

#[test]
fn a_layer_without_a_crs_skips_its_key_only() {
    let dir = TempDir::new().unwrap();
    // Colorado's source layer has no .prj; Wyoming's is complete.
    write_fixture(dir.path(), 2012, "Colorado", None);
    write_fixture(dir.path(), 2012, "Wyoming", Crs::from_epsg(4269));

    let report = run_batch(&county_config(dir.path(), &["Colorado", "Wyoming"]));

    assert_eq!(report.completed, 1);
    assert_eq!(report.missing_crs, 1);
    assert!(report.failed.is_empty());

    let (shp, _) = output_paths(dir.path(), 2012, "Wyoming", LayerKind::County).unwrap();
    assert!(shp.exists());
    let (shp, _) = output_paths(dir.path(), 2012, "Colorado", LayerKind::County).unwrap();
    assert!(!shp.exists());
}

#[test]
fn explicit_keys_can_cross_state_lines() {
    let dir = TempDir::new().unwrap();
    let base = dir.path();

    // A Wyoming catchment spilling into Colorado: the source comes from one
    // state's merged layer, the target and outputs from the other's.
    let source = string_layer(
        vec![square(0.0, 0.0, 2.0)],
        "region_id",
        &["WY-500"],
        Crs::from_epsg(4269),
    );
    write_layer(&source, &merged_source_path(base, 2012, "Wyoming")).unwrap();

    let target = string_layer(
        vec![square(0.0, 0.0, 1.0)],
        "COUNTYFP",
        &["001"],
        Crs::from_epsg(4269),
    );
    write_layer(&target, &target_layer_path(base, 2012, "Colorado", LayerKind::County).unwrap())
        .unwrap();

    let key = BatchKey {
        year: 2012,
        source_state: "Wyoming".to_string(),
        target_state: "Colorado".to_string(),
        kind: LayerKind::County,
    };
    assert!(key.label().contains("Wyoming->Colorado"));

    let report = run_keys(&county_config(base, &[]), std::slice::from_ref(&key));

    assert_eq!(report.completed, 1);
    let (shp, csv) = output_paths(base, 2012, "Colorado", LayerKind::County).unwrap();
    assert!(shp.exists());
    let table = fs::read_to_string(&csv).unwrap();
    assert!(table.contains("WY-500"));
}

#[test]
fn an_unknown_state_is_a_hard_failure_not_a_coverage_gap() {
    let dir = TempDir::new().unwrap();
    let base = dir.path();

    // The source layer exists, so the run gets far enough to need a FIPS
    // code for the state; a bad name must land in the failure tally rather
    // than hide among missing-input skips.
    let source = string_layer(
        vec![square(0.0, 0.0, 2.0)],
        "region_id",
        &["X-1"],
        Crs::from_epsg(4269),
    );
    write_layer(&source, &merged_source_path(base, 2012, "Atlantis")).unwrap();

    let report = run_batch(&county_config(base, &["Atlantis"]));

    assert_eq!(report.completed, 0);
    assert_eq!(report.missing_input, 0);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].contains("Atlantis"));
}

#[test]
fn batch_can_merge_raw_fragments_on_the_fly() {
    let dir = TempDir::new().unwrap();
    let base = dir.path();

    // Two single-fragment regions, keyed by the numeric token of their
    // subdirectory names.
    let fragments = fragment_dir(base, 2012, "Wyoming");
    let a = string_layer(vec![square(0.0, 0.0, 1.0)], "NAME", &["north"], Crs::from_epsg(4269));
    write_layer(&a, &fragments.join("WY_500").join("coc.shp")).unwrap();
    let b = string_layer(vec![square(1.0, 1.0, 1.0)], "NAME", &["south"], Crs::from_epsg(4269));
    write_layer(&b, &fragments.join("WY_501").join("coc.shp")).unwrap();

    let target = string_layer(
        vec![square(0.0, 0.0, 2.0)],
        "COUNTYFP",
        &["001"],
        Crs::from_epsg(4269),
    );
    write_layer(&target, &target_layer_path(base, 2012, "Wyoming", LayerKind::County).unwrap())
        .unwrap();

    let mut config = county_config(base, &["Wyoming"]);
    config.merge_sources = true;
    let report = run_batch(&config);

    assert_eq!(report.completed, 1);
    let (_, csv) = output_paths(base, 2012, "Wyoming", LayerKind::County).unwrap();
    let table = fs::read_to_string(&csv).unwrap();
    assert!(table.lines().next().unwrap().contains("source_region_id"));
    // Both merged regions intersect the one county.
    assert!(table.contains("500"));
    assert!(table.contains("501"));
    assert_eq!(table.lines().count(), 3);
}
