//! Buffer operations
//!
//! Points are buffered geodesically: the ring is built from haversine
//! destinations at evenly spaced bearings. Lines and polygons are buffered in
//! a local equirectangular projection centred on the geometry, as the union of
//! one capsule per segment (plus the polygon itself), then unprojected.

use super::{check_geometry, kernel};
use geo::{BooleanOps, ConvexHull, Destination, Haversine};
use geo_types::{Coord, Geometry, Line, LineString, MultiPoint, MultiPolygon, Point, Polygon};
use geolens_core::{Error, Feature, Result, SkipReason};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

/// Mean Earth radius in meters, the same radius the haversine formulas use.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Projected buffers are refused this close to the poles.
const MAX_PROJECTION_LAT: f64 = 85.0;

/// Distance units accepted by [`BufferParams`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnits {
    Meters,
    #[default]
    Kilometers,
    Miles,
    Feet,
    /// Arc degrees on the mean-radius sphere
    Degrees,
}

impl DistanceUnits {
    pub fn to_meters(self, distance: f64) -> f64 {
        match self {
            DistanceUnits::Meters => distance,
            DistanceUnits::Kilometers => distance * 1000.0,
            DistanceUnits::Miles => distance * 1609.344,
            DistanceUnits::Feet => distance * 0.3048,
            DistanceUnits::Degrees => distance.to_radians() * EARTH_RADIUS_M,
        }
    }
}

impl FromStr for DistanceUnits {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(DistanceUnits::Meters),
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => {
                Ok(DistanceUnits::Kilometers)
            }
            "mi" | "mile" | "miles" => Ok(DistanceUnits::Miles),
            "ft" | "foot" | "feet" => Ok(DistanceUnits::Feet),
            "deg" | "degree" | "degrees" => Ok(DistanceUnits::Degrees),
            other => Err(Error::InvalidParameter {
                name: "units",
                value: other.to_string(),
                reason: "expected meters, kilometers, miles, feet or degrees".into(),
            }),
        }
    }
}

/// Parameters for buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferParams {
    /// Buffer distance, must be finite and non-negative
    pub distance: f64,
    pub units: DistanceUnits,
    /// Vertices used to approximate a full circle (default: 64)
    pub steps: usize,
}

impl Default for BufferParams {
    fn default() -> Self {
        Self {
            distance: 1.0,
            units: DistanceUnits::Kilometers,
            steps: 64,
        }
    }
}

impl BufferParams {
    pub fn new(distance: f64, units: DistanceUnits) -> Self {
        Self { distance, units, ..Self::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(Error::InvalidParameter {
                name: "distance",
                value: self.distance.to_string(),
                reason: "must be a finite, non-negative number".into(),
            });
        }
        Ok(())
    }

    pub fn meters(&self) -> f64 {
        self.units.to_meters(self.distance)
    }

    fn vertex_count(&self) -> usize {
        self.steps.max(4)
    }
}

/// Geodesic circle around a point, `steps` vertices, counter-clockwise.
pub fn buffer_point(point: Point<f64>, meters: f64, steps: usize) -> Polygon<f64> {
    let n = steps.max(4);
    let mut coords: Vec<Coord<f64>> = (0..n)
        .map(|i| {
            // Decreasing bearings walk the ring counter-clockwise.
            let bearing = 360.0 - 360.0 * i as f64 / n as f64;
            Haversine.destination(point, bearing, meters).0
        })
        .collect();
    coords.push(coords[0]);
    Polygon::new(LineString::new(coords), vec![])
}

/// Buffer any geometry, returning a polygon or multipolygon.
pub fn buffer_geometry(geom: &Geometry<f64>, params: &BufferParams) -> std::result::Result<Geometry<f64>, SkipReason> {
    check_geometry(geom)?;
    let meters = params.meters();
    let steps = params.vertex_count();

    let result = match geom {
        Geometry::Point(p) => {
            if meters <= 0.0 {
                return Err(SkipReason::EmptyResult);
            }
            MultiPolygon::new(vec![buffer_point(*p, meters, steps)])
        }
        Geometry::MultiPoint(mp) => {
            if meters <= 0.0 {
                return Err(SkipReason::EmptyResult);
            }
            let circles: Vec<MultiPolygon<f64>> = mp
                .iter()
                .map(|p| MultiPolygon::new(vec![buffer_point(*p, meters, steps)]))
                .collect();
            fold_union(circles)?
        }
        Geometry::GeometryCollection(gc) => {
            let parts = gc
                .iter()
                .map(|g| buffer_geometry(g, params).map(into_multipolygon))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            fold_union(parts)?
        }
        other => buffer_projected(other, meters, steps)?,
    };

    if result.0.is_empty() {
        return Err(SkipReason::EmptyResult);
    }
    Ok(from_multipolygon(result))
}

/// Buffer a feature's geometry, keeping id and properties.
pub fn buffer_feature(feature: &Feature, params: &BufferParams) -> std::result::Result<Feature, SkipReason> {
    let geom = feature.geometry.as_ref().ok_or(SkipReason::MissingGeometry)?;
    let buffered = buffer_geometry(geom, params)?;
    Ok(feature.with_geometry(buffered))
}

/// Local equirectangular frame in meters around a reference coordinate.
struct LocalFrame {
    origin: Coord<f64>,
    kx: f64,
    ky: f64,
}

impl LocalFrame {
    fn around(geom: &Geometry<f64>) -> std::result::Result<Self, SkipReason> {
        let bb = super::bounding_box(geom).ok_or(SkipReason::MissingCoordinates)?;
        let (cx, cy) = bb.center();
        if cy.abs() > MAX_PROJECTION_LAT {
            return Err(SkipReason::InvalidGeometry(format!(
                "latitude {cy:.2} too close to a pole for a projected buffer"
            )));
        }
        let ky = EARTH_RADIUS_M * PI / 180.0;
        Ok(Self {
            origin: Coord { x: cx, y: cy },
            kx: ky * cy.to_radians().cos(),
            ky,
        })
    }

    fn forward(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x - self.origin.x) * self.kx,
            y: (c.y - self.origin.y) * self.ky,
        }
    }

    fn inverse(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: c.x / self.kx + self.origin.x,
            y: c.y / self.ky + self.origin.y,
        }
    }

    fn forward_polygon(&self, p: &Polygon<f64>) -> Polygon<f64> {
        map_polygon(p, |c| self.forward(c))
    }

    fn inverse_polygon(&self, p: &Polygon<f64>) -> Polygon<f64> {
        map_polygon(p, |c| self.inverse(c))
    }
}

fn map_polygon(p: &Polygon<f64>, f: impl Fn(Coord<f64>) -> Coord<f64>) -> Polygon<f64> {
    let ring = |ls: &LineString<f64>| LineString::new(ls.0.iter().map(|c| f(*c)).collect());
    Polygon::new(ring(p.exterior()), p.interiors().iter().map(ring).collect())
}

fn buffer_projected(
    geom: &Geometry<f64>,
    meters: f64,
    steps: usize,
) -> std::result::Result<MultiPolygon<f64>, SkipReason> {
    let frame = LocalFrame::around(geom)?;

    let mut lines: Vec<LineString<f64>> = Vec::new();
    let mut polygons: Vec<Polygon<f64>> = Vec::new();
    match geom {
        Geometry::Line(l) => lines.push(LineString::new(vec![l.start, l.end])),
        Geometry::LineString(ls) => lines.push(ls.clone()),
        Geometry::MultiLineString(mls) => lines.extend(mls.iter().cloned()),
        Geometry::Polygon(p) => polygons.push(p.clone()),
        Geometry::MultiPolygon(mp) => polygons.extend(mp.iter().cloned()),
        Geometry::Rect(r) => polygons.push(r.to_polygon()),
        Geometry::Triangle(t) => polygons.push(t.to_polygon()),
        other => {
            return Err(SkipReason::UnsupportedGeometry(
                geolens_core::GeometryKind::of(other).name().to_string(),
            ))
        }
    }

    let mut parts: Vec<MultiPolygon<f64>> = Vec::new();
    for p in &polygons {
        parts.push(MultiPolygon::new(vec![frame.forward_polygon(p)]));
        lines.push(p.exterior().clone());
        lines.extend(p.interiors().iter().cloned());
    }
    if meters > 0.0 {
        for ls in &lines {
            for seg in ls.lines() {
                let seg = Line::new(frame.forward(seg.start), frame.forward(seg.end));
                parts.push(MultiPolygon::new(vec![capsule(seg, meters, steps)]));
            }
        }
    }
    if parts.is_empty() {
        return Err(SkipReason::EmptyResult);
    }

    let merged = fold_union(parts)?;
    Ok(MultiPolygon::new(merged.iter().map(|p| frame.inverse_polygon(p)).collect()))
}

/// Convex hull of the two end circles of a planar segment.
fn capsule(seg: Line<f64>, radius: f64, steps: usize) -> Polygon<f64> {
    let mut pts = Vec::with_capacity(steps * 2);
    for end in [seg.start, seg.end] {
        for i in 0..steps {
            let a = 2.0 * PI * i as f64 / steps as f64;
            pts.push(Point::new(end.x + radius * a.cos(), end.y + radius * a.sin()));
        }
    }
    MultiPoint::new(pts).convex_hull()
}

fn fold_union(parts: Vec<MultiPolygon<f64>>) -> std::result::Result<MultiPolygon<f64>, SkipReason> {
    kernel(|| {
        parts
            .into_iter()
            .reduce(|acc, next| acc.union(&next))
            .unwrap_or_else(|| MultiPolygon::new(vec![]))
    })
}

fn into_multipolygon(geom: Geometry<f64>) -> MultiPolygon<f64> {
    match geom {
        Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
        Geometry::MultiPolygon(mp) => mp,
        _ => MultiPolygon::new(vec![]),
    }
}

/// A single polygon stays a `Polygon`; anything else is a `MultiPolygon`.
pub(crate) fn from_multipolygon(mut mp: MultiPolygon<f64>) -> Geometry<f64> {
    if mp.0.len() == 1 {
        Geometry::Polygon(mp.0.remove(0))
    } else {
        Geometry::MultiPolygon(mp)
    }
}
