use anyhow::{bail, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon, Winding};
use shapefile as shp;

/// Convert a shapefile shape into a `geo::MultiPolygon<f64>`.
///
/// Ring roles come from the shapefile ring tags rather than being inferred
/// from orientation. Null shapes read as an empty multi-polygon.
pub(crate) fn shape_to_multipolygon(shape: shp::Shape) -> Result<MultiPolygon<f64>> {
    match shape {
        shp::Shape::Polygon(p) => Ok(polygon_to_geo(&p)),
        shp::Shape::NullShape => Ok(MultiPolygon(Vec::new())),
        other => bail!("unsupported shape type: {}", other.shapetype()),
    }
}

fn polygon_to_geo(p: &shp::Polygon) -> MultiPolygon<f64> {
    /// Build a closed geo ring from shapefile points.
    fn ring(points: &[shp::Point]) -> LineString<f64> {
        let mut ls = LineString(points.iter().map(|pt| Coord { x: pt.x, y: pt.y }).collect());
        ls.close();
        ls
    }

    // Shapefiles store rings as [outer, its holes..., next outer, ...];
    // each new outer ring flushes the polygon accumulated before it.
    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes: Vec<LineString<f64>> = Vec::new();

    for part in p.rings() {
        match part {
            shp::PolygonRing::Outer(points) => {
                if let Some(ext) = exterior.replace(ring(points)) {
                    polys.push(Polygon::new(ext, std::mem::take(&mut holes)));
                }
            }
            shp::PolygonRing::Inner(points) => holes.push(ring(points)),
        }
    }
    if let Some(ext) = exterior {
        polys.push(Polygon::new(ext, holes));
    }

    MultiPolygon(polys)
}

/// Convert a `geo::MultiPolygon<f64>` into a shapefile polygon, restoring the
/// shapefile winding convention (outer CW, holes CCW) and closing each ring.
pub(crate) fn multipolygon_to_shape(mp: &MultiPolygon<f64>) -> shp::Polygon {
    fn ring_points(ls: &LineString<f64>) -> Vec<shp::Point> {
        ls.coords().map(|c| shp::Point::new(c.x, c.y)).collect()
    }

    let mut rings = Vec::new();
    for poly in &mp.0 {
        let mut outer = poly.exterior().clone();
        outer.close();
        outer.make_cw_winding();
        rings.push(shp::PolygonRing::Outer(ring_points(&outer)));

        for hole in poly.interiors() {
            let mut inner = hole.clone();
            inner.close();
            inner.make_ccw_winding();
            rings.push(shp::PolygonRing::Inner(ring_points(&inner)));
        }
    }

    shp::Polygon::with_rings(rings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    fn unit_square_shp() -> shp::Polygon {
        shp::Polygon::with_rings(vec![shp::PolygonRing::Outer(vec![
            shp::Point::new(0.0, 0.0),
            shp::Point::new(0.0, 1.0),
            shp::Point::new(1.0, 1.0),
            shp::Point::new(1.0, 0.0),
            shp::Point::new(0.0, 0.0),
        ])])
    }

    #[test]
    fn polygon_round_trips_through_geo() {
        let mp = shape_to_multipolygon(shp::Shape::Polygon(unit_square_shp())).unwrap();
        assert_eq!(mp.0.len(), 1);
        assert!((mp.unsigned_area() - 1.0).abs() < 1e-12);

        let back = multipolygon_to_shape(&mp);
        let again = shape_to_multipolygon(shp::Shape::Polygon(back)).unwrap();
        assert!((again.unsigned_area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn holes_are_preserved() {
        let outer = LineString(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 0.0, y: 4.0 },
            Coord { x: 4.0, y: 4.0 },
            Coord { x: 4.0, y: 0.0 },
            Coord { x: 0.0, y: 0.0 },
        ]);
        let hole = LineString(vec![
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 3.0, y: 1.0 },
            Coord { x: 3.0, y: 3.0 },
            Coord { x: 1.0, y: 3.0 },
            Coord { x: 1.0, y: 1.0 },
        ]);
        let mp = MultiPolygon(vec![Polygon::new(outer, vec![hole])]);

        let shape = multipolygon_to_shape(&mp);
        let back = shape_to_multipolygon(shp::Shape::Polygon(shape)).unwrap();
        assert_eq!(back.0[0].interiors().len(), 1);
        assert!((back.unsigned_area() - 12.0).abs() < 1e-12);
    }
}
