use anyhow::{anyhow, Context, Result};
use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

const NAD83_PROJ4: &str = "+proj=longlat +datum=NAD83 +no_defs +type=crs";
const NAD27_PROJ4: &str = "+proj=longlat +datum=NAD27 +no_defs +type=crs";
const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";
const CONUS_ALBERS_PROJ4: &str =
    "+proj=aea +lat_0=23 +lon_0=-96 +lat_1=29.5 +lat_2=45.5 +x_0=0 +y_0=0 +datum=NAD83 +units=m +no_defs +type=crs";

const NAD83_ESRI_WKT: &str = concat!(
    "GEOGCS[\"GCS_North_American_1983\",",
    "DATUM[\"D_North_American_1983\",",
    "SPHEROID[\"GRS_1980\",6378137.0,298.257222101]],",
    "PRIMEM[\"Greenwich\",0.0],",
    "UNIT[\"Degree\",0.0174532925199433]]",
);
const WGS84_ESRI_WKT: &str = concat!(
    "GEOGCS[\"GCS_WGS_1984\",",
    "DATUM[\"D_WGS_1984\",",
    "SPHEROID[\"WGS_1984\",6378137.0,298.257223563]],",
    "PRIMEM[\"Greenwich\",0.0],",
    "UNIT[\"Degree\",0.0174532925199433]]",
);

/// Coordinate reference system of a layer, carried as a PROJ.4 definition.
///
/// Parsing `.prj` sidecars only recognizes the small closed set of CRSs the
/// historical boundary data actually uses; anything else reads as "unknown
/// CRS", which downstream code treats as a skip condition rather than an
/// error.
#[derive(Debug, Clone)]
pub struct Crs {
    epsg: Option<u32>,
    proj4: String,
    wkt: Option<String>,
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        match (self.epsg, other.epsg) {
            (Some(a), Some(b)) => a == b,
            _ => self.proj4 == other.proj4,
        }
    }
}

impl Crs {
    /// Construct from an EPSG code, for the codes this toolkit knows about.
    pub fn from_epsg(code: u32) -> Option<Self> {
        let proj4 = match code {
            4269 => NAD83_PROJ4,
            4267 => NAD27_PROJ4,
            4326 => WGS84_PROJ4,
            5070 => CONUS_ALBERS_PROJ4,
            _ => return None,
        };
        Some(Self { epsg: Some(code), proj4: proj4.to_string(), wkt: None })
    }

    /// Construct from a raw PROJ.4 definition string.
    pub fn from_proj4(proj4: &str) -> Self {
        Self { epsg: None, proj4: proj4.to_string(), wkt: None }
    }

    /// Parse an ESRI `.prj` WKT string.
    ///
    /// Recognizes the geographic CRSs the census and catchment shapefiles
    /// ship with (NAD83, NAD27, WGS84) plus the CONUS Albers projection.
    /// `None` means the CRS is unknown, which is a legal layer state.
    pub fn from_prj_wkt(wkt: &str) -> Option<Self> {
        let upper = wkt.to_ascii_uppercase();
        let projected = upper.trim_start().starts_with("PROJCS");

        let code = if projected {
            if upper.contains("ALBERS") { 5070 } else { return None }
        } else if upper.contains("1983") {
            4269
        } else if upper.contains("1927") {
            4267
        } else if upper.contains("WGS") && upper.contains("1984") {
            4326
        } else {
            return None;
        };

        let mut crs = Self::from_epsg(code)?;
        crs.wkt = Some(wkt.to_string());
        Some(crs)
    }

    /// CONUS Albers equal-area (EPSG:5070), the default choice for physically
    /// meaningful area measurement over the lower 48.
    pub fn conus_albers() -> Self {
        Self { epsg: Some(5070), proj4: CONUS_ALBERS_PROJ4.to_string(), wkt: None }
    }

    #[inline]
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    #[inline]
    pub fn proj4(&self) -> &str {
        &self.proj4
    }

    /// True when coordinates are lon/lat degrees rather than planar units.
    #[inline]
    pub fn is_geographic(&self) -> bool {
        self.proj4.contains("+proj=longlat")
    }

    /// ESRI WKT for the `.prj` sidecar: the text the layer was read with if
    /// any, otherwise a canned definition for the known geographic CRSs.
    pub fn esri_wkt(&self) -> Option<String> {
        if let Some(wkt) = &self.wkt {
            return Some(wkt.clone());
        }
        match self.epsg {
            Some(4269) => Some(NAD83_ESRI_WKT.to_string()),
            Some(4326) => Some(WGS84_ESRI_WKT.to_string()),
            _ => None,
        }
    }
}

/// Reproject every geometry in `geoms` from `from` into `to`.
///
/// Geographic CRSs exchange coordinates in degrees while proj4rs works in
/// radians, so the unit conversion happens at this boundary.
pub fn reproject(
    geoms: &[MultiPolygon<f64>],
    from: &Crs,
    to: &Crs,
) -> Result<Vec<MultiPolygon<f64>>> {
    let src = Proj::from_proj_string(from.proj4())
        .with_context(|| format!("invalid source projection: {}", from.proj4()))?;
    let dst = Proj::from_proj_string(to.proj4())
        .with_context(|| format!("invalid target projection: {}", to.proj4()))?;

    geoms
        .iter()
        .map(|mp| {
            mp.try_map_coords(|coord| {
                let mut point = if from.is_geographic() {
                    (coord.x.to_radians(), coord.y.to_radians(), 0.0)
                } else {
                    (coord.x, coord.y, 0.0)
                };
                transform(&src, &dst, &mut point)
                    .map_err(|e| anyhow!("coordinate transform failed: {e}"))?;
                let (x, y) = if to.is_geographic() {
                    (point.0.to_degrees(), point.1.to_degrees())
                } else {
                    (point.0, point.1)
                };
                Ok(Coord { x, y })
            })
        })
        .collect()
}
