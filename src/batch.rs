//! Batch driver: walk the (year x state x layer kind) key space, run the
//! merger and the overlay engine per key, and isolate every failure to the
//! key it happened on.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::io;
use crate::merge::{self, IdRule};
use crate::overlay::{self, Attribution, OverlayConfig};
use crate::paths;
use crate::report::RunReport;
use crate::schema::{LayerKind, SchemaProfile};
use crate::skip::Skip;

/// One unit of batch work: overlay the (source state, year) catchment layer
/// against the (target state, year) census layer of the given kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub year: i32,
    pub source_state: String,
    pub target_state: String,
    pub kind: LayerKind,
}

impl BatchKey {
    /// The usual case: source and target cover the same state.
    pub fn same_state(year: i32, state: &str, kind: LayerKind) -> Self {
        Self {
            year,
            source_state: state.to_string(),
            target_state: state.to_string(),
            kind,
        }
    }

    pub fn label(&self) -> String {
        if self.source_state == self.target_state {
            format!("{} {} {:?}", self.year, self.source_state, self.kind)
        } else {
            format!(
                "{} {}->{} {:?}",
                self.year, self.source_state, self.target_state, self.kind
            )
        }
    }
}

/// Batch configuration: where the data lives and which key space to cover.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Base data directory, holding `shapefiles/` and `Intersection/`.
    pub base_dir: PathBuf,
    pub years: Vec<i32>,
    pub states: Vec<String>,
    pub kinds: Vec<LayerKind>,
    pub overlay: OverlayConfig,
    /// Re-merge raw fragments per key instead of reading pre-merged source
    /// layers from disk.
    pub merge_sources: bool,
    pub verbose: u8,
}

/// Process the full same-state key space sequentially.
pub fn run_batch(config: &BatchConfig) -> RunReport {
    let mut keys =
        Vec::with_capacity(config.years.len() * config.states.len() * config.kinds.len());
    for year in &config.years {
        for state in &config.states {
            for kind in &config.kinds {
                keys.push(BatchKey::same_state(*year, state, *kind));
            }
        }
    }
    run_keys(config, &keys)
}

/// Process an explicit key list, one key to completion before the next
/// begins. This is the entry point for cross-state keys, where a catchment
/// region spilling over a state line is overlaid against the neighbor's
/// census layer. Every failure is scoped to its key: recorded in the report,
/// never propagated out of the loop. Input layers are loaded fresh per key.
pub fn run_keys(config: &BatchConfig, keys: &[BatchKey]) -> RunReport {
    let mut report = RunReport::default();
    for key in keys {
        match process_key(config, key) {
            Ok(Ok(())) => {
                report.record_completed();
                if config.verbose > 0 {
                    eprintln!("[batch] done: {}", key.label());
                }
            }
            Ok(Err(skip)) => {
                report.record_skip(&skip);
                if config.verbose > 0 {
                    eprintln!("[batch] skip: {}: {skip}", key.label());
                }
            }
            Err(e) => {
                eprintln!("[batch] error: {}: {e:#}", key.label());
                report.record_failure(key.label());
            }
        }
    }
    report
}

/// Run one key end to end: load (or merge) the source layer, load the
/// target, attribute, write both artifacts. `Ok(Err(skip))` is an expected
/// data condition; `Err` is a hard failure, also scoped to this key by the
/// caller.
fn process_key(config: &BatchConfig, key: &BatchKey) -> Result<Result<(), Skip>> {
    let source = if config.merge_sources {
        let dir = paths::fragment_dir(&config.base_dir, key.year, &key.source_state);
        match merge::merge_directory(&dir, IdRule::for_year(key.year))? {
            Some(layer) => layer,
            None => {
                return Ok(Err(Skip::MissingInput { path: dir.display().to_string() }))
            }
        }
    } else {
        let path = paths::merged_source_path(&config.base_dir, key.year, &key.source_state);
        if !path.exists() {
            return Ok(Err(Skip::MissingInput { path: path.display().to_string() }));
        }
        io::read_layer(&path)?
    };

    // No FIPS code means the state name itself is wrong: a configuration
    // error, not a data coverage gap.
    let Some(target_path) =
        paths::target_layer_path(&config.base_dir, key.year, &key.target_state, key.kind)
    else {
        bail!("unknown state: {}", key.target_state);
    };
    if !target_path.exists() {
        return Ok(Err(Skip::MissingInput { path: target_path.display().to_string() }));
    }
    let target = io::read_layer(&target_path)?;

    let profile = SchemaProfile::for_year(key.year);
    let key_field = profile.key_field(key.kind);

    let records = match overlay::attribute(&source, &target, &key_field, &config.overlay)? {
        Attribution::Records(layer) => layer,
        Attribution::Skipped(skip) => return Ok(Err(skip)),
    };

    let Some((shp_path, csv_path)) =
        paths::output_paths(&config.base_dir, key.year, &key.target_state, key.kind)
    else {
        bail!("unknown state: {}", key.target_state);
    };

    io::write_layer(&records, &shp_path)
        .with_context(|| format!("failed to write geometry output for {}", key.label()))?;
    io::write_table(records.table(), &csv_path)
        .with_context(|| format!("failed to write table output for {}", key.label()))?;

    Ok(Ok(()))
}
