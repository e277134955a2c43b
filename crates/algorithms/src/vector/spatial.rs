//! Spatial primitives: bounding box, centroid, representative point

use super::check_geometry;
use geo::{BoundingRect, Centroid as GeoCentroid};
use geo_types::{Coord, Geometry, LineString, Point, Polygon};
use geolens_core::{Feature, SkipReason};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in longitude/latitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Smallest box containing every point, `None` when there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bb = Self::new(first.x(), first.y(), first.x(), first.y());
        for p in iter {
            bb.expand(p.0);
        }
        Some(bb)
    }

    pub fn expand(&mut self, c: Coord<f64>) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// A box with zero width or height is padded so it still encloses an area.
    pub fn padded(&self, pad: f64) -> Self {
        let px = if self.width() > 0.0 { 0.0 } else { pad };
        let py = if self.height() > 0.0 { 0.0 } else { pad };
        Self::new(self.min_x - px, self.min_y - py, self.max_x + px, self.max_y + py)
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (self.min_x, self.min_y),
                (self.max_x, self.min_y),
                (self.max_x, self.max_y),
                (self.min_x, self.max_y),
                (self.min_x, self.min_y),
            ]),
            vec![],
        )
    }
}

/// Compute the bounding box of a geometry
pub fn bounding_box(geom: &Geometry<f64>) -> Option<BoundingBox> {
    geom.bounding_rect().map(|rect| BoundingBox {
        min_x: rect.min().x,
        min_y: rect.min().y,
        max_x: rect.max().x,
        max_y: rect.max().y,
    })
}

/// Compute the centroid of a geometry.
///
/// Invalid geometry (for example a self-intersecting ring) is rejected rather
/// than producing a misleading point.
pub fn centroid(geom: &Geometry<f64>) -> Result<Point<f64>, SkipReason> {
    check_geometry(geom)?;
    let c = match geom {
        Geometry::Point(p) => Some(*p),
        Geometry::Line(l) => Some(l.centroid()),
        Geometry::LineString(ls) => ls.centroid(),
        Geometry::Polygon(p) => p.centroid(),
        Geometry::MultiPoint(mp) => mp.centroid(),
        Geometry::MultiLineString(mls) => mls.centroid(),
        Geometry::MultiPolygon(mp) => mp.centroid(),
        Geometry::Rect(r) => Some(r.centroid()),
        Geometry::Triangle(t) => Some(t.centroid()),
        Geometry::GeometryCollection(gc) => gc.centroid(),
    };
    c.ok_or(SkipReason::EmptyResult)
}

/// The feature itself when it is a point, otherwise its centroid.
pub fn representative_point(feature: &Feature) -> Result<Point<f64>, SkipReason> {
    match feature.geometry.as_ref() {
        None => Err(SkipReason::MissingGeometry),
        Some(Geometry::Point(p)) => {
            check_geometry(&Geometry::Point(*p))?;
            Ok(*p)
        }
        Some(g) => centroid(g),
    }
}

/// Replace a feature's geometry with its centroid, keeping id and properties.
pub fn centroid_feature(feature: &Feature) -> Result<Feature, SkipReason> {
    let geom = feature.geometry.as_ref().ok_or(SkipReason::MissingGeometry)?;
    let c = centroid(geom)?;
    Ok(feature.with_geometry(Geometry::Point(c)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, polygon};

    fn sample_polygon() -> Polygon<f64> {
        polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)]
    }

    #[test]
    fn test_bounding_box() {
        let bb = bounding_box(&Geometry::Polygon(sample_polygon())).unwrap();
        assert_eq!(bb, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        assert!(bb.contains_point(5.0, 5.0));
        assert!(!bb.contains_point(15.0, 5.0));
    }

    #[test]
    fn test_from_points_and_padding() {
        let pts = [Point::new(1.0, 2.0), Point::new(-1.0, 5.0), Point::new(0.0, 3.0)];
        let bb = BoundingBox::from_points(&pts).unwrap();
        assert_eq!(bb, BoundingBox::new(-1.0, 2.0, 1.0, 5.0));
        assert!(BoundingBox::from_points(Vec::<Point<f64>>::new().iter()).is_none());

        let single = BoundingBox::from_points(&pts[..1]).unwrap().padded(0.5);
        assert_eq!(single, BoundingBox::new(0.5, 1.5, 1.5, 2.5));
    }

    #[test]
    fn test_box_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        assert!(a.intersects(&BoundingBox::new(1.0, 1.0, 3.0, 3.0)));
        assert!(!a.intersects(&BoundingBox::new(2.5, 0.0, 3.0, 1.0)));
    }

    #[test]
    fn test_centroid_polygon() {
        let c = centroid(&Geometry::Polygon(sample_polygon())).unwrap();
        assert!((c.x() - 5.0).abs() < 1e-10);
        assert!((c.y() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_centroid_line() {
        let ls = line_string![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0)];
        let c = centroid(&Geometry::LineString(ls)).unwrap();
        assert!((c.x() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_centroid_rejects_bow_tie() {
        let bow = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)];
        assert!(matches!(
            centroid(&Geometry::Polygon(bow)),
            Err(SkipReason::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_centroid_feature_keeps_properties() {
        let f = Feature::new(sample_polygon()).with_property("name", "zone");
        let c = centroid_feature(&f).unwrap();
        assert_eq!(c.kind().map(|k| k.name()), Some("Point"));
        assert_eq!(c.get_property("name").and_then(|v| v.as_str()), Some("zone"));
        assert_eq!(centroid_feature(&Feature::empty()), Err(SkipReason::MissingGeometry));
    }
}
