//! Geodesic measurements: area in square meters, length in kilometers

use super::check_geometry;
use geo::{GeodesicArea, Haversine, Length};
use geo_types::{Geometry, LineString};
use geolens_core::SkipReason;

/// Geodesic area of a polygonal geometry in square meters.
///
/// Non-polygonal geometry is `UnsupportedGeometry`; invalid rings are rejected.
pub fn area(geom: &Geometry<f64>) -> Result<f64, SkipReason> {
    check_geometry(geom)?;
    let a = match geom {
        Geometry::Polygon(p) => p.geodesic_area_unsigned(),
        Geometry::MultiPolygon(mp) => mp.geodesic_area_unsigned(),
        Geometry::Rect(r) => r.to_polygon().geodesic_area_unsigned(),
        Geometry::Triangle(t) => t.to_polygon().geodesic_area_unsigned(),
        other => return Err(unsupported(other)),
    };
    if a.is_finite() {
        Ok(a)
    } else {
        Err(SkipReason::Kernel("non-finite area".into()))
    }
}

/// Great-circle length of a lineal geometry in kilometers.
pub fn length_km(geom: &Geometry<f64>) -> Result<f64, SkipReason> {
    check_geometry(geom)?;
    let meters = match geom {
        Geometry::LineString(ls) => haversine_length(ls),
        Geometry::MultiLineString(mls) => mls.0.iter().map(haversine_length).sum(),
        Geometry::Line(l) => haversine_length(&LineString::new(vec![l.start, l.end])),
        other => return Err(unsupported(other)),
    };
    Ok(meters / 1000.0)
}

fn haversine_length(ls: &LineString<f64>) -> f64 {
    Haversine.length(ls)
}

fn unsupported(geom: &Geometry<f64>) -> SkipReason {
    SkipReason::UnsupportedGeometry(geolens_core::GeometryKind::of(geom).name().to_string())
}
