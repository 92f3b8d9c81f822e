use std::fmt;

use serde::Serialize;

/// Which of the two layers a per-key condition refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayerRole {
    Source,
    Target,
}

/// Expected per-key conditions that end processing of one batch key early.
///
/// These are data conditions, not program errors: the driver records them and
/// moves on to the next key. Nothing here ever aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Skip {
    /// Input path absent; the historical datasets have coverage gaps.
    MissingInput { path: String },
    /// Layer has no usable CRS (no `.prj`, or an unrecognized one).
    MissingCrs { role: LayerRole },
    /// Reprojecting the target layer into the source CRS failed.
    Reprojection { cause: String },
    /// The geometric overlay itself failed on degenerate input.
    Overlay { cause: String },
    /// The target key column is absent — a year-dependent rename gone wrong.
    SchemaMismatch { field: String },
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::MissingInput { path } => write!(f, "missing input: {path}"),
            Skip::MissingCrs { role } => write!(f, "missing CRS on {role:?} layer"),
            Skip::Reprojection { cause } => write!(f, "reprojection failed: {cause}"),
            Skip::Overlay { cause } => write!(f, "overlay failed: {cause}"),
            Skip::SchemaMismatch { field } => {
                write!(f, "expected key column not found: {field}")
            }
        }
    }
}
