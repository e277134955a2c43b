//! Features and feature collections.

use geo_types::Geometry;
use std::fmt;

use super::value::{Properties, PropertyValue};
use super::FieldSource;

/// Geometry type tag, named the way GeoJSON names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    pub fn of(geom: &Geometry<f64>) -> Self {
        match geom {
            Geometry::Point(_) => Self::Point,
            Geometry::Line(_) | Geometry::LineString(_) => Self::LineString,
            Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => Self::Polygon,
            Geometry::MultiPoint(_) => Self::MultiPoint,
            Geometry::MultiLineString(_) => Self::MultiLineString,
            Geometry::MultiPolygon(_) => Self::MultiPolygon,
            Geometry::GeometryCollection(_) => Self::GeometryCollection,
        }
    }

    /// GeoJSON type string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::LineString => "LineString",
            Self::Polygon => "Polygon",
            Self::MultiPoint => "MultiPoint",
            Self::MultiLineString => "MultiLineString",
            Self::MultiPolygon => "MultiPolygon",
            Self::GeometryCollection => "GeometryCollection",
        }
    }

    /// `Polygon` or `MultiPolygon`.
    pub fn is_polygonal(&self) -> bool {
        matches!(self, Self::Polygon | Self::MultiPolygon)
    }

    /// `LineString` or `MultiLineString`.
    pub fn is_lineal(&self) -> bool {
        matches!(self, Self::LineString | Self::MultiLineString)
    }

    pub fn is_point(&self) -> bool {
        matches!(self, Self::Point)
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    /// Optional feature ID
    pub id: Option<String>,
    /// Feature geometry, `None` when the source had none or it could not be read
    pub geometry: Option<Geometry<f64>>,
    /// Feature attributes
    pub properties: Properties,
    /// Non-standard top-level members carried over from the source document
    pub foreign: Properties,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: Some(geometry.into()),
            ..Self::default()
        }
    }

    /// Create a feature with no geometry
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style attribute setter
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Replace the geometry, keeping id and attributes
    pub fn with_geometry(&self, geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: Some(geometry.into()),
            ..self.clone()
        }
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn kind(&self) -> Option<GeometryKind> {
        self.geometry.as_ref().map(GeometryKind::of)
    }
}

impl FieldSource for Feature {
    /// `properties[name]` first, then the top-level member of the same name.
    fn field(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .get(name)
            .filter(|v| !v.is_null())
            .or_else(|| self.foreign.get(name))
    }
}

/// Ordered collection of features.
///
/// Collections are not required to be geometry-homogeneous; the type of the
/// first feature is used as the collection's dominant kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new() }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Geometry kind of `features[0]`.
    pub fn dominant_kind(&self) -> Option<GeometryKind> {
        self.features.first().and_then(Feature::kind)
    }

    /// True when every feature with a geometry is a `Point`.
    pub fn is_point_only(&self) -> bool {
        self.features
            .iter()
            .filter_map(Feature::kind)
            .all(|k| k.is_point())
    }
}

impl From<Vec<Feature>> for FeatureCollection {
    fn from(features: Vec<Feature>) -> Self {
        Self { features }
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Point, Polygon};

    #[test]
    fn dominant_kind_uses_first_feature() {
        let fc = FeatureCollection::from(vec![
            Feature::new(Point::new(0.0, 0.0)),
            Feature::new(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)])),
        ]);
        assert_eq!(fc.dominant_kind(), Some(GeometryKind::Point));
        assert!(!fc.is_point_only());
    }

    #[test]
    fn rect_reports_polygon() {
        let poly = Polygon::new(LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]), vec![]);
        let f = Feature::new(poly);
        assert!(f.kind().unwrap().is_polygonal());
    }

    #[test]
    fn field_falls_back_to_top_level_member() {
        let mut f = Feature::new(Point::new(1.0, 2.0)).with_property("a", 1.0);
        f.foreign.insert("b".into(), PropertyValue::Number(2.0));
        assert_eq!(f.numeric_field("a"), Some(1.0));
        assert_eq!(f.numeric_field("b"), Some(2.0));
        assert_eq!(f.field("c"), None);
    }
}
