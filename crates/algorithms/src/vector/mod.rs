//! Vector analysis primitives
//!
//! Geometric operations on single features, in longitude/latitude:
//! - Buffer: geodesic circles around points, metric offsets around lines and polygons
//! - Centroid / bounding box
//! - Overlay: intersection, difference, union of polygonal geometry
//! - Voronoi: tessellation of representative points inside a box
//! - Area / length: geodesic measurements (m², km)
//!
//! Per-feature functions return `Result<_, SkipReason>` so batch callers can
//! drop a failing feature and keep going.

mod buffer;
mod clip;
mod measurements;
mod overlay;
mod spatial;
mod voronoi;

pub use buffer::{buffer_feature, buffer_geometry, buffer_point, BufferParams, DistanceUnits, EARTH_RADIUS_M};
pub(crate) use buffer::from_multipolygon;
pub use clip::{clip_polygon, HalfPlane};
pub use measurements::{area, length_km};
pub use overlay::{difference, intersection, to_multipolygon, union_all};
pub use spatial::{bounding_box, centroid, centroid_feature, representative_point, BoundingBox};
pub use voronoi::{voronoi_cells, VoronoiParams};

use geo::Intersects;
use geo_types::{Coord, Geometry, Line, LineString, Polygon};
use geolens_core::SkipReason;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run a geometry-kernel call, turning a panic into a [`SkipReason::Kernel`].
///
/// Boolean operations on degenerate input may panic inside `geo`; callers
/// treat that like any other per-feature failure.
pub(crate) fn kernel<T>(f: impl FnOnce() -> T) -> Result<T, SkipReason> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic in geometry kernel".to_string());
        SkipReason::Kernel(msg)
    })
}

/// Check that a geometry is usable by the analysis kernel.
///
/// Coordinates must be finite, lines need two distinct positions and polygon
/// rings need three distinct vertices without self-intersections.
pub fn check_geometry(geom: &Geometry<f64>) -> Result<(), SkipReason> {
    match geom {
        Geometry::Point(p) => check_coord(p.0),
        Geometry::Line(l) => check_coord(l.start).and(check_coord(l.end)),
        Geometry::MultiPoint(mp) => mp.iter().try_for_each(|p| check_coord(p.0)),
        Geometry::LineString(ls) => check_line(ls),
        Geometry::MultiLineString(mls) => mls.iter().try_for_each(check_line),
        Geometry::Polygon(p) => check_polygon(p),
        Geometry::MultiPolygon(mp) => mp.iter().try_for_each(check_polygon),
        Geometry::Rect(r) => check_coord(r.min()).and(check_coord(r.max())),
        Geometry::Triangle(t) => t.to_array().iter().try_for_each(|c| check_coord(*c)),
        Geometry::GeometryCollection(gc) => gc.iter().try_for_each(check_geometry),
    }
}

fn check_coord(c: Coord<f64>) -> Result<(), SkipReason> {
    if c.x.is_finite() && c.y.is_finite() {
        Ok(())
    } else {
        Err(SkipReason::NonFiniteCoordinate { x: c.x, y: c.y })
    }
}

fn check_line(ls: &LineString<f64>) -> Result<(), SkipReason> {
    ls.0.iter().try_for_each(|c| check_coord(*c))?;
    if distinct(ls).len() < 2 {
        return Err(SkipReason::InvalidGeometry("line needs two distinct positions".into()));
    }
    Ok(())
}

fn check_polygon(p: &Polygon<f64>) -> Result<(), SkipReason> {
    for ring in std::iter::once(p.exterior()).chain(p.interiors()) {
        ring.0.iter().try_for_each(|c| check_coord(*c))?;
        let vertices = distinct(ring);
        // Closed ring: first vertex repeated at the end.
        let open_len = if vertices.first() == vertices.last() {
            vertices.len().saturating_sub(1)
        } else {
            vertices.len()
        };
        if open_len < 3 {
            return Err(SkipReason::InvalidGeometry("ring needs three distinct vertices".into()));
        }
        if ring_self_intersects(&vertices) {
            return Err(SkipReason::InvalidGeometry("ring self-intersects".into()));
        }
    }
    Ok(())
}

/// Coordinates with consecutive duplicates removed.
fn distinct(ls: &LineString<f64>) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(ls.0.len());
    for c in &ls.0 {
        if out.last() != Some(c) {
            out.push(*c);
        }
    }
    out
}

/// Sweep over segments sorted by min x; only segments whose x-extents
/// overlap are tested, and ring-adjacent segments are ignored.
fn ring_self_intersects(vertices: &[Coord<f64>]) -> bool {
    let mut ring = vertices.to_vec();
    if ring.first() != ring.last() {
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
    }
    let segments: Vec<Line<f64>> = ring.windows(2).map(|w| Line::new(w[0], w[1])).collect();
    let m = segments.len();
    if m < 4 {
        return false;
    }

    let mut order: Vec<usize> = (0..m).collect();
    let min_x = |l: &Line<f64>| l.start.x.min(l.end.x);
    let max_x = |l: &Line<f64>| l.start.x.max(l.end.x);
    order.sort_by(|&a, &b| min_x(&segments[a]).total_cmp(&min_x(&segments[b])));

    for (pos, &i) in order.iter().enumerate() {
        let reach = max_x(&segments[i]);
        for &j in &order[pos + 1..] {
            if min_x(&segments[j]) > reach {
                break;
            }
            let (lo, hi) = if i < j { (i, j) } else { (j, i) };
            let adjacent = hi - lo == 1 || (lo == 0 && hi == m - 1);
            if !adjacent && segments[i].intersects(&segments[j]) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{polygon, Point};

    #[test]
    fn valid_square() {
        let sq = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        assert!(check_geometry(&Geometry::Polygon(sq)).is_ok());
    }

    #[test]
    fn bow_tie_is_invalid() {
        let bow = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)];
        assert_eq!(
            check_geometry(&Geometry::Polygon(bow)),
            Err(SkipReason::InvalidGeometry("ring self-intersects".into()))
        );
    }

    #[test]
    fn repeated_vertices_are_tolerated() {
        let sq = polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)
        ];
        assert!(check_geometry(&Geometry::Polygon(sq)).is_ok());
    }

    #[test]
    fn degenerate_inputs() {
        let flat = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 0.0)];
        assert!(check_geometry(&Geometry::Polygon(flat)).is_err());
        let nan = Geometry::Point(Point::new(f64::NAN, 1.0));
        assert!(matches!(check_geometry(&nan), Err(SkipReason::NonFiniteCoordinate { .. })));
    }

    #[test]
    fn kernel_turns_panics_into_skips() {
        let r: Result<(), _> = kernel(|| panic!("boom"));
        assert_eq!(r, Err(SkipReason::Kernel("boom".into())));
        assert_eq!(kernel(|| 3), Ok(3));
    }
}
