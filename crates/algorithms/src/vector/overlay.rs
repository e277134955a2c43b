//! Polygon overlay: intersection, difference, union
//!
//! All operands are lifted to `MultiPolygon` first. Boolean operations run
//! through [`kernel`] so a panic on degenerate input becomes a skip.

use super::{check_geometry, kernel};
use geo::{unary_union, Area, BooleanOps};
use geo_types::{Geometry, MultiPolygon};
use geolens_core::{GeometryKind, SkipReason};

/// Results with less planar area than this are treated as empty.
const EMPTY_AREA: f64 = 1e-18;

/// Lift a polygonal geometry to a valid `MultiPolygon`.
pub fn to_multipolygon(geom: &Geometry<f64>) -> Result<MultiPolygon<f64>, SkipReason> {
    check_geometry(geom)?;
    match geom {
        Geometry::Polygon(p) => Ok(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Ok(mp.clone()),
        Geometry::Rect(r) => Ok(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Ok(MultiPolygon::new(vec![t.to_polygon()])),
        other => Err(SkipReason::UnsupportedGeometry(GeometryKind::of(other).name().to_string())),
    }
}

fn non_empty(mp: MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    if mp.0.is_empty() || mp.unsigned_area() <= EMPTY_AREA {
        None
    } else {
        Some(mp)
    }
}

/// Intersection of two polygonal shapes; an empty overlap is `EmptyResult`.
pub fn intersection(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>, SkipReason> {
    let out = kernel(|| a.intersection(b))?;
    non_empty(out).ok_or(SkipReason::EmptyResult)
}

/// `a` minus `b`; `Ok(None)` when nothing of `a` remains.
pub fn difference(
    a: &MultiPolygon<f64>,
    b: &MultiPolygon<f64>,
) -> Result<Option<MultiPolygon<f64>>, SkipReason> {
    let out = kernel(|| a.difference(b))?;
    Ok(non_empty(out))
}

/// Dissolve every shape into one `MultiPolygon` in a single sweep.
pub fn union_all(parts: Vec<MultiPolygon<f64>>) -> Result<MultiPolygon<f64>, SkipReason> {
    let merged = kernel(|| unary_union(&parts))?;
    non_empty(merged).ok_or(SkipReason::EmptyResult)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{polygon, Point, Polygon};

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        let p: Polygon<f64> = polygon![
            (x: x0, y: y0), (x: x0 + size, y: y0), (x: x0 + size, y: y0 + size), (x: x0, y: y0 + size)
        ];
        MultiPolygon::new(vec![p])
    }

    #[test]
    fn test_overlapping_intersection() {
        let out = intersection(&square(0.0, 0.0, 2.0), &square(1.0, 1.0, 2.0)).unwrap();
        assert!((out.unsigned_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_intersection_is_empty() {
        assert_eq!(
            intersection(&square(0.0, 0.0, 1.0), &square(5.0, 5.0, 1.0)),
            Err(SkipReason::EmptyResult)
        );
    }

    #[test]
    fn test_difference() {
        let rem = difference(&square(0.0, 0.0, 2.0), &square(1.0, 0.0, 2.0)).unwrap().unwrap();
        assert!((rem.unsigned_area() - 2.0).abs() < 1e-9);
        let gone = difference(&square(0.0, 0.0, 1.0), &square(-1.0, -1.0, 3.0)).unwrap();
        assert!(gone.is_none());
    }

    #[test]
    fn test_union_dissolves() {
        let out = union_all(vec![square(0.0, 0.0, 2.0), square(1.0, 0.0, 2.0)]).unwrap();
        assert_eq!(out.0.len(), 1);
        assert!((out.unsigned_area() - 6.0).abs() < 1e-9);
        assert_eq!(union_all(vec![]), Err(SkipReason::EmptyResult));
    }

    #[test]
    fn test_union_of_strip_and_islands() {
        let mut parts: Vec<_> = (0..20).map(|i| square(i as f64, 0.0, 1.5)).collect();
        parts.push(square(0.0, 10.0, 1.0));
        parts.push(square(5.0, 10.0, 1.0));
        let out = union_all(parts).unwrap();
        assert_eq!(out.0.len(), 3);
        assert!((out.unsigned_area() - (20.5 * 1.5 + 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_to_multipolygon_rejects_points() {
        assert!(matches!(
            to_multipolygon(&Geometry::Point(Point::new(0.0, 0.0))),
            Err(SkipReason::UnsupportedGeometry(_))
        ));
    }
}
