use anyhow::{ensure, Result};
use geo::MultiPolygon;
use polars::frame::DataFrame;

use crate::crs::Crs;

/// A polygon layer: a geometry vector aligned row-for-row with an attribute
/// table, plus the layer's CRS when one is known.
///
/// An unset CRS is a legal state (legacy shapefiles often ship without a
/// usable `.prj`); the overlay engine turns it into a skip condition, never a
/// crash. Geometries are immutable once read — derived data is appended to
/// the table, existing columns are only changed by explicit replacement.
#[derive(Debug, Clone)]
pub struct FeatureLayer {
    geoms: Vec<MultiPolygon<f64>>,
    table: DataFrame,
    crs: Option<Crs>,
}

impl FeatureLayer {
    /// Pair geometries with their attribute table. The table must have one
    /// row per geometry, unless it has no columns at all.
    pub fn new(
        geoms: Vec<MultiPolygon<f64>>,
        table: DataFrame,
        crs: Option<Crs>,
    ) -> Result<Self> {
        ensure!(
            table.width() == 0 || table.height() == geoms.len(),
            "attribute table has {} rows for {} geometries",
            table.height(),
            geoms.len(),
        );
        Ok(Self { geoms, table, crs })
    }

    pub fn empty() -> Self {
        Self { geoms: Vec::new(), table: DataFrame::empty(), crs: None }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.geoms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.geoms.is_empty()
    }

    #[inline]
    pub fn geoms(&self) -> &[MultiPolygon<f64>] {
        &self.geoms
    }

    #[inline]
    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    #[inline]
    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    pub fn set_crs(&mut self, crs: Option<Crs>) {
        self.crs = crs;
    }
}
