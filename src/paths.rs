use std::path::{Path, PathBuf};

use crate::schema::{LayerKind, SchemaProfile};
use crate::states;

/// Directory of raw catchment fragment shapefiles for one (year, state) cell.
pub fn fragment_dir(base: &Path, year: i32, state: &str) -> PathBuf {
    base.join("shapefiles")
        .join("Continuums of Care")
        .join(year.to_string())
        .join(state)
}

/// Path of the merged one-feature-per-region catchment shapefile.
pub fn merged_source_path(base: &Path, year: i32, state: &str) -> PathBuf {
    base.join("shapefiles")
        .join("CoC_Merged")
        .join(year.to_string())
        .join(state)
        .join(format!("{}_{year}_CoC_Merged.shp", states::file_name(state)))
}

/// Path of the per-state census target shapefile for one (year, state, kind).
///
/// Encodes the historical drift: `fe` vs `tl` prefixes, the 2010 `10`
/// suffix, and the 2007 subdivisions living under a separate `2007_Merged`
/// year directory. `None` when the state name is unknown.
pub fn target_layer_path(
    base: &Path,
    year: i32,
    state: &str,
    kind: LayerKind,
) -> Option<PathBuf> {
    let fips = states::state_fips(state)?;
    let profile = SchemaProfile::for_year(year);

    let year_dir = if kind == LayerKind::Subdivision && year == 2007 {
        "2007_Merged".to_string()
    } else {
        year.to_string()
    };

    Some(
        base.join("shapefiles")
            .join(kind.input_dir())
            .join(year_dir)
            .join(format!("{fips}_{}", states::dir_name(state)))
            .join(profile.target_file_name(year, fips, kind)),
    )
}

/// Output artifact paths for one batch key, reproducible from the key alone:
/// `Intersection/Output/{year}/{pair}/shp/...` and `.../csv/...`, with file
/// names of the form `CoC_Counties_{fips}_{State}_{yy}.{ext}`.
pub fn output_paths(
    base: &Path,
    year: i32,
    state: &str,
    kind: LayerKind,
) -> Option<(PathBuf, PathBuf)> {
    let fips = states::state_fips(state)?;
    let yy = format!("{:02}", year % 100);
    let stem = format!(
        "{}_{fips}_{}_{yy}",
        kind.output_token(),
        states::file_name(state),
    );

    let dir = base
        .join("Intersection")
        .join("Output")
        .join(year.to_string())
        .join(kind.pair_name());

    Some((
        dir.join("shp").join(format!("{stem}.shp")),
        dir.join("csv").join(format!("{stem}.csv")),
    ))
}
