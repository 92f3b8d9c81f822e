use std::path::PathBuf;

/// Catchment/census area-attribution CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "catchmap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Merge raw catchment fragments into one feature per region
    Merge(MergeArgs),

    /// Overlay one source layer against one target layer
    Overlay(OverlayArgs),

    /// Run the full (year x state x kind) batch
    Batch(BatchArgs),

    /// Split a layer into per-group shapefiles by a column value
    Split(SplitArgs),
}

#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    /// Directory of raw fragment shapefiles
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub input: PathBuf,

    /// Output shapefile path
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,

    /// Vintage year; selects the identifier naming convention
    #[arg(short, long)]
    pub year: i32,
}

#[derive(clap::Args, Debug)]
pub struct OverlayArgs {
    /// Source (catchment) shapefile
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub source: PathBuf,

    /// Target (census unit) shapefile
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub target: PathBuf,

    /// Key column identifying target features (e.g. COUNTYFP)
    #[arg(short, long)]
    pub key_field: String,

    /// Output shapefile path; the flat CSV lands next to it
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,

    /// Buffer distance for geometry conditioning
    #[arg(long, default_value_t = 1e-4)]
    pub buffer: f64,

    /// Simplify tolerance for geometry conditioning
    #[arg(long, default_value_t = 1e-4)]
    pub simplify: f64,

    /// Skip the buffer/simplify conditioning pass
    #[arg(long)]
    pub no_condition: bool,

    /// Keep the scratch area/total_area columns in the output
    #[arg(long)]
    pub keep_scratch: bool,

    /// Measure areas in CONUS Albers (EPSG:5070) instead of the working CRS
    #[arg(long)]
    pub equal_area: bool,
}

#[derive(clap::Args, Debug)]
pub struct BatchArgs {
    /// Base data directory (holds shapefiles/ and Intersection/)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub base_dir: PathBuf,

    /// Years to process: a year, a range, or a comma list (2007-2023, 2010)
    #[arg(short, long)]
    pub years: String,

    /// States to process; defaults to every state and territory
    #[arg(short, long)]
    pub states: Vec<String>,

    /// Target layer kinds: county, place, subdivision (default: all three)
    #[arg(short, long)]
    pub kinds: Vec<String>,

    /// Re-merge raw fragments instead of reading pre-merged source layers
    #[arg(long)]
    pub merge_sources: bool,

    /// Buffer distance for geometry conditioning
    #[arg(long, default_value_t = 1e-4)]
    pub buffer: f64,

    /// Simplify tolerance for geometry conditioning
    #[arg(long, default_value_t = 1e-4)]
    pub simplify: f64,

    /// Skip the buffer/simplify conditioning pass
    #[arg(long)]
    pub no_condition: bool,

    /// Measure areas in CONUS Albers (EPSG:5070) instead of the working CRS
    #[arg(long)]
    pub equal_area: bool,

    /// Write the run report as JSON to this path
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub report: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct SplitArgs {
    /// Input shapefile (e.g. a national county file)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Column whose values define the groups (e.g. STATEFP)
    #[arg(short, long)]
    pub column: String,

    /// Directory to write one shapefile per group into
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,
}
