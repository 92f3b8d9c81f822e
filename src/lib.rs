#![doc = "Catchmap public API"]
mod batch;
mod common;
mod crs;
mod io;
mod layer;
mod merge;
mod overlay;
mod paths;
mod report;
mod schema;
mod skip;
mod split;
mod states;

#[doc(inline)]
pub use layer::FeatureLayer;

#[doc(inline)]
pub use crs::{reproject, Crs};

#[doc(inline)]
pub use merge::{merge_directory, merge_fragments, IdRule};

#[doc(inline)]
pub use overlay::{attribute, Attribution, OverlayConfig};

#[doc(inline)]
pub use batch::{run_batch, run_keys, BatchConfig, BatchKey};

#[doc(inline)]
pub use report::RunReport;

#[doc(inline)]
pub use schema::{LayerKind, SchemaProfile};

#[doc(inline)]
pub use skip::{LayerRole, Skip};

#[doc(inline)]
pub use split::split_by_column;

#[doc(inline)]
pub use paths::{fragment_dir, merged_source_path, output_paths, target_layer_path};

#[doc(inline)]
pub use states::{all_states, state_fips, state_name_from_fips};

#[doc(inline)]
pub use io::{read_layer, write_layer, write_table};
