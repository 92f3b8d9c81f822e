use serde::Serialize;

/// Which census target layer a batch key overlays the catchment layer against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LayerKind {
    County,
    Place,
    Subdivision,
}

impl LayerKind {
    /// Token used in TIGER/Line file names (`tl_2012_01_county.shp`).
    pub fn file_token(self) -> &'static str {
        match self {
            LayerKind::County => "county",
            LayerKind::Place => "place",
            LayerKind::Subdivision => "cousub",
        }
    }

    /// Directory under `shapefiles/` holding this kind's per-state extracts.
    pub fn input_dir(self) -> &'static str {
        match self {
            LayerKind::County => "counties",
            LayerKind::Place => "Census places",
            LayerKind::Subdivision => "county subdivisions",
        }
    }

    /// Name of the overlay pair in output paths (`CoC@Counties`).
    pub fn pair_name(self) -> &'static str {
        match self {
            LayerKind::County => "CoC@Counties",
            LayerKind::Place => "CoC@Places",
            LayerKind::Subdivision => "CoC@Subdivisions",
        }
    }

    /// Token that starts output file names (`CoC_Counties_...`).
    pub fn output_token(self) -> &'static str {
        match self {
            LayerKind::County => "CoC_Counties",
            LayerKind::Place => "CoC_Places",
            LayerKind::Subdivision => "CoC_Subdivisions",
        }
    }
}

/// File and column naming conventions for one census vintage, resolved once
/// per batch key so historical format drift stays out of the overlay code.
///
/// Three vintages exist: 2007 "First Edition" files (`fe` prefix), the 2010
/// decennial files that append `10` to file and column names, and plain
/// TIGER/Line everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaProfile {
    /// `fe` for the 2007 First Edition files, `tl` for TIGER/Line.
    pub file_prefix: &'static str,
    /// `10` suffix that the 2010 vintage appends to file and column names.
    pub vintage_suffix: &'static str,
}

impl SchemaProfile {
    pub fn for_year(year: i32) -> Self {
        Self {
            file_prefix: if year == 2007 { "fe" } else { "tl" },
            vintage_suffix: if year == 2010 { "10" } else { "" },
        }
    }

    /// Key column identifying a target feature of `kind` in this vintage
    /// (`COUNTYFP` vs `COUNTYFP10`, and so on).
    pub fn key_field(&self, kind: LayerKind) -> String {
        let base = match kind {
            LayerKind::County => "COUNTYFP",
            LayerKind::Place => "PLACEFP",
            LayerKind::Subdivision => "COUSUBFP",
        };
        format!("{base}{}", self.vintage_suffix)
    }

    /// File name of the per-state target shapefile (`tl_2012_01_county.shp`).
    pub fn target_file_name(&self, year: i32, fips: &str, kind: LayerKind) -> String {
        format!(
            "{}_{year}_{fips}_{}{}.shp",
            self.file_prefix,
            kind.file_token(),
            self.vintage_suffix,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vintage_drift_is_captured() {
        assert_eq!(SchemaProfile::for_year(2007).file_prefix, "fe");
        assert_eq!(SchemaProfile::for_year(2012).file_prefix, "tl");
        assert_eq!(SchemaProfile::for_year(2010).vintage_suffix, "10");
        assert_eq!(SchemaProfile::for_year(2011).vintage_suffix, "");
    }

    #[test]
    fn key_fields_follow_the_vintage() {
        let p2010 = SchemaProfile::for_year(2010);
        let p2012 = SchemaProfile::for_year(2012);
        assert_eq!(p2010.key_field(LayerKind::County), "COUNTYFP10");
        assert_eq!(p2012.key_field(LayerKind::County), "COUNTYFP");
        assert_eq!(p2010.key_field(LayerKind::Place), "PLACEFP10");
        assert_eq!(p2012.key_field(LayerKind::Subdivision), "COUSUBFP");
    }

    #[test]
    fn file_names_follow_the_vintage() {
        let p2007 = SchemaProfile::for_year(2007);
        let p2010 = SchemaProfile::for_year(2010);
        assert_eq!(
            p2007.target_file_name(2007, "01", LayerKind::County),
            "fe_2007_01_county.shp"
        );
        assert_eq!(
            p2010.target_file_name(2010, "01", LayerKind::County),
            "tl_2010_01_county10.shp"
        );
    }
}
