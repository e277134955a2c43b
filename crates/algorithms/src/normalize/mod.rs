//! Geometry normalizer
//!
//! Converts layer data (GeoJSON features or tabular records) into the shape a
//! visualization mode draws: points, lines, polygons or timestamped paths.
//! Malformed items are dropped with a warning; normalization never fails as a
//! whole.

mod order;
mod trips;

pub use order::{sort_by_order, OrderKey};
pub use trips::{trips, TripPath, TRAJECTORY_FIELDS};

use crate::vector::{centroid_feature, check_geometry};
use geo_types::{Geometry, LineString, Point};
use geolens_core::{Error, Feature, GeometryKind, LayerData, Properties, SkipReason, TabularRecord};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Target shape of normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Point,
    Line,
    Polygon,
    /// Ordered paths grouped by trajectory, see [`trips`]
    Path,
}

impl FromStr for Shape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" | "points" => Ok(Shape::Point),
            "line" | "lines" => Ok(Shape::Line),
            "polygon" | "polygons" => Ok(Shape::Polygon),
            "path" | "paths" | "trip" | "trips" => Ok(Shape::Path),
            other => Err(Error::InvalidParameter {
                name: "shape",
                value: other.to_string(),
                reason: "expected point, line, polygon or path".into(),
            }),
        }
    }
}

/// Normalize `input` into features of the requested shape.
///
/// `Path` yields one `LineString` per trajectory carrying the group's
/// properties; use [`trips`] directly for the timestamp sequences.
pub fn normalize(input: &LayerData, shape: Shape) -> Vec<Feature> {
    match shape {
        Shape::Point => to_points(input),
        Shape::Line => to_lines(input),
        Shape::Polygon => to_polygons(input),
        Shape::Path => trips(input).into_iter().map(TripPath::into_feature).collect(),
    }
}

/// Points pass through; other geometries become their centroid.
pub fn to_points(input: &LayerData) -> Vec<Feature> {
    match input {
        LayerData::Features(fc) => fc
            .iter()
            .enumerate()
            .filter_map(|(index, f)| keep(index, point_feature(f)))
            .collect(),
        LayerData::Records(rows) => rows
            .iter()
            .enumerate()
            .filter_map(|(index, r)| keep(index, record_point(r)))
            .collect(),
    }
}

fn point_feature(feature: &Feature) -> Result<Feature, SkipReason> {
    match feature.geometry.as_ref() {
        None => Err(SkipReason::MissingGeometry),
        Some(g @ Geometry::Point(_)) => {
            check_geometry(g)?;
            Ok(feature.clone())
        }
        Some(_) => centroid_feature(feature),
    }
}

/// One point feature per record, every field kept as a property.
pub fn record_point(record: &TabularRecord) -> Result<Feature, SkipReason> {
    let c = record.coordinate()?;
    check_geometry(&Geometry::Point(Point(c)))?;
    Ok(Feature {
        properties: record.fields.clone(),
        ..Feature::new(Point(c))
    })
}

/// Lines pass through; point sequences are connected pairwise.
///
/// Collections that already contain lines keep only their lines. Point-only
/// collections are connected in collection order; records are sorted by their
/// ordering field first.
pub fn to_lines(input: &LayerData) -> Vec<Feature> {
    match input {
        LayerData::Features(fc) => {
            let lines: Vec<Feature> = fc
                .iter()
                .filter(|f| f.kind().is_some_and(|k| k.is_lineal()))
                .cloned()
                .collect();
            if !lines.is_empty() || !fc.is_point_only() {
                return lines;
            }
            let points: Vec<(Point<f64>, &Properties)> = fc
                .iter()
                .enumerate()
                .filter_map(|(index, f)| match f.geometry.as_ref() {
                    Some(g @ Geometry::Point(p)) => keep(index, check_geometry(g).map(|_| (*p, &f.properties))),
                    _ => None,
                })
                .collect();
            connect(&points)
        }
        LayerData::Records(rows) => {
            let sorted = sort_by_order(rows.iter().collect());
            let points: Vec<(Point<f64>, &Properties)> = sorted
                .iter()
                .enumerate()
                .filter_map(|(index, r)| {
                    keep(index, record_point(r).map(|f| (point_of(&f), &r.fields)))
                })
                .collect();
            connect(&points)
        }
    }
}

fn point_of(f: &Feature) -> Point<f64> {
    match f.geometry {
        Some(Geometry::Point(p)) => p,
        _ => Point::new(f64::NAN, f64::NAN),
    }
}

/// Join consecutive points into two-vertex lines.
///
/// Each line carries the start point's properties as `startPoint.<key>` and
/// the end point's as `endPoint.<key>`.
fn connect(points: &[(Point<f64>, &Properties)]) -> Vec<Feature> {
    points
        .windows(2)
        .map(|pair| {
            let (a, a_props) = pair[0];
            let (b, b_props) = pair[1];
            let mut feature = Feature::new(LineString::new(vec![a.0, b.0]));
            for (k, v) in a_props.iter() {
                feature.set_property(format!("startPoint.{k}"), v.clone());
            }
            for (k, v) in b_props.iter() {
                feature.set_property(format!("endPoint.{k}"), v.clone());
            }
            feature
        })
        .collect()
}

/// Only `Polygon`/`MultiPolygon` features are kept; records have no polygons.
pub fn to_polygons(input: &LayerData) -> Vec<Feature> {
    match input {
        LayerData::Features(fc) => fc
            .iter()
            .filter(|f| {
                matches!(f.kind(), Some(GeometryKind::Polygon | GeometryKind::MultiPolygon))
            })
            .cloned()
            .collect(),
        LayerData::Records(_) => Vec::new(),
    }
}

fn keep<T>(index: usize, item: Result<T, SkipReason>) -> Option<T> {
    match item {
        Ok(v) => Some(v),
        Err(reason) => {
            warn!(index, %reason, "dropping item during normalization");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::polygon;
    use geolens_core::{FeatureCollection, PropertyValue};

    fn pts() -> FeatureCollection {
        FeatureCollection::from(vec![
            Feature::new(Point::new(0.0, 0.0)).with_property("name", "a"),
            Feature::new(Point::new(1.0, 1.0)).with_property("name", "b"),
            Feature::new(Point::new(2.0, 0.0)).with_property("name", "c"),
        ])
    }

    #[test]
    fn points_pass_through_and_are_idempotent() {
        let input = LayerData::Features(pts());
        let once = normalize(&input, Shape::Point);
        let twice = normalize(&LayerData::Features(once.clone().into()), Shape::Point);
        assert_eq!(once, pts().features);
        assert_eq!(once, twice);
    }

    #[test]
    fn polygons_reduce_to_centroids() {
        let sq = polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0), (x: 0.0, y: 2.0)];
        let bow = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)];
        let fc = FeatureCollection::from(vec![
            Feature::new(sq).with_property("zone", 1.0),
            Feature::new(bow),
            Feature::empty(),
        ]);
        let out = to_points(&LayerData::Features(fc));
        assert_eq!(out.len(), 1);
        match out[0].geometry {
            Some(Geometry::Point(p)) => assert!((p.x() - 1.0).abs() < 1e-12 && (p.y() - 1.0).abs() < 1e-12),
            ref other => panic!("expected point, got {other:?}"),
        }
        assert_eq!(out[0].get_property("zone"), Some(&PropertyValue::Number(1.0)));
    }

    #[test]
    fn records_resolve_coordinates() {
        let rows = vec![
            TabularRecord::new().with("lat", 48.85).with("lng", 2.35).with("value", 10.0),
            TabularRecord::new().with("lat", "north").with("lng", 2.0),
            TabularRecord::new().with("value", 3.0),
        ];
        let out = to_points(&LayerData::Records(rows));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].geometry, Some(Geometry::Point(Point::new(2.35, 48.85))));
        assert_eq!(out[0].get_property("value").and_then(PropertyValue::as_f64), Some(10.0));
    }

    #[test]
    fn point_collections_connect_pairwise() {
        let lines = to_lines(&LayerData::Features(pts()));
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0].geometry,
            Some(Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)])))
        );
        assert_eq!(lines[1].get_property("startPoint.name").and_then(|v| v.as_str()), Some("b"));
        assert_eq!(lines[1].get_property("endPoint.name").and_then(|v| v.as_str()), Some("c"));
    }

    #[test]
    fn existing_lines_pass_through() {
        let fc = FeatureCollection::from(vec![
            Feature::new(LineString::from(vec![(0.0, 0.0), (1.0, 0.0)])),
            Feature::new(Point::new(5.0, 5.0)),
        ]);
        let lines = to_lines(&LayerData::Features(fc));
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn records_are_ordered_before_connecting() {
        let rows = vec![
            TabularRecord::new().with("lat", 0.0).with("lon", 2.0).with("time", 3.0),
            TabularRecord::new().with("lat", 0.0).with("lon", 0.0).with("time", 1.0),
            TabularRecord::new().with("lat", 0.0).with("lon", 1.0).with("time", 2.0),
        ];
        let lines = to_lines(&LayerData::Records(rows));
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0].geometry,
            Some(Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 0.0)])))
        );
        assert_eq!(lines[1].get_property("endPoint.time").and_then(PropertyValue::as_f64), Some(3.0));
    }

    #[test]
    fn polygon_target_filters() {
        let sq = polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0), (x: 0.0, y: 2.0)];
        let mut fc = pts();
        fc.push(Feature::new(sq));
        assert_eq!(to_polygons(&LayerData::Features(fc)).len(), 1);
        assert!(to_polygons(&LayerData::Records(vec![TabularRecord::new()])).is_empty());
    }

    #[test]
    fn shape_parses() {
        assert_eq!("Trips".parse::<Shape>().unwrap(), Shape::Path);
        assert!("cube".parse::<Shape>().is_err());
    }
}
