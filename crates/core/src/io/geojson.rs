//! GeoJSON reading and writing.
//!
//! Geometry conversion is done by hand so malformed positions degrade to a
//! feature without geometry instead of aborting the whole document.

use ::geojson::{feature::Id, GeoJson, Value};
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use tracing::warn;

use crate::error::{Error, Result, SkipReason};
use crate::vector::{Feature, FeatureCollection, Properties, PropertyValue};

/// Parse GeoJSON text into a feature collection.
///
/// Accepts a `FeatureCollection`, a single `Feature` or a bare geometry.
pub fn read_geojson(text: &str) -> Result<FeatureCollection> {
    let gj: GeoJson = text.parse().map_err(|e: ::geojson::Error| Error::GeoJson(e.to_string()))?;

    let features = match gj {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(g) => vec![::geojson::Feature {
            bbox: None,
            geometry: Some(g),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    Ok(features
        .iter()
        .enumerate()
        .map(|(index, f)| {
            let (feature, problem) = feature_from_geojson(f);
            if let Some(reason) = problem {
                warn!(index, %reason, "feature geometry could not be read");
            }
            feature
        })
        .collect())
}

/// Serialize a collection as pretty-printed GeoJSON.
pub fn write_geojson(collection: &FeatureCollection) -> Result<String> {
    let fc = ::geojson::FeatureCollection {
        bbox: None,
        features: collection.iter().map(feature_to_geojson).collect(),
        foreign_members: None,
    };
    Ok(serde_json::to_string_pretty(&fc)?)
}

/// Convert one GeoJSON feature. A geometry that cannot be read is dropped and
/// the reason returned alongside the (geometry-less) feature.
pub fn feature_from_geojson(f: &::geojson::Feature) -> (Feature, Option<SkipReason>) {
    let (geometry, problem) = match &f.geometry {
        Some(g) => match geometry_from_geojson(&g.value) {
            Ok(geom) => (Some(geom), None),
            Err(reason) => (None, Some(reason)),
        },
        None => (None, None),
    };

    let id = f.id.as_ref().map(|id| match id {
        Id::String(s) => s.clone(),
        Id::Number(n) => n.to_string(),
    });

    let feature = Feature {
        id,
        geometry,
        properties: json_object_to_properties(f.properties.as_ref()),
        foreign: json_object_to_properties(f.foreign_members.as_ref()),
    };
    (feature, problem)
}

/// Convert a feature back into its GeoJSON form.
pub fn feature_to_geojson(f: &Feature) -> ::geojson::Feature {
    let properties: ::geojson::JsonObject = f
        .properties
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
        .collect();
    let foreign: ::geojson::JsonObject = f
        .foreign
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
        .collect();

    ::geojson::Feature {
        bbox: None,
        geometry: f
            .geometry
            .as_ref()
            .map(|g| ::geojson::Geometry::new(Value::from(g))),
        id: f.id.clone().map(Id::String),
        properties: Some(properties),
        foreign_members: (!foreign.is_empty()).then_some(foreign),
    }
}

/// Convert a GeoJSON geometry value into a `geo-types` geometry.
///
/// Positions need at least two finite numbers; a third (elevation) is dropped.
pub fn geometry_from_geojson(value: &Value) -> std::result::Result<Geometry<f64>, SkipReason> {
    Ok(match value {
        Value::Point(p) => Geometry::Point(Point(coord(p)?)),
        Value::MultiPoint(ps) => Geometry::MultiPoint(MultiPoint(
            ps.iter().map(|p| coord(p).map(Point)).collect::<std::result::Result<_, _>>()?,
        )),
        Value::LineString(ls) => Geometry::LineString(line(ls)?),
        Value::MultiLineString(lss) => Geometry::MultiLineString(MultiLineString(
            lss.iter().map(|ls| line(ls)).collect::<std::result::Result<_, _>>()?,
        )),
        Value::Polygon(rings) => Geometry::Polygon(polygon(rings)?),
        Value::MultiPolygon(polys) => Geometry::MultiPolygon(MultiPolygon(
            polys.iter().map(|p| polygon(p)).collect::<std::result::Result<_, _>>()?,
        )),
        Value::GeometryCollection(geoms) => Geometry::GeometryCollection(GeometryCollection(
            geoms
                .iter()
                .map(|g| geometry_from_geojson(&g.value))
                .collect::<std::result::Result<_, _>>()?,
        )),
    })
}

fn coord(position: &[f64]) -> std::result::Result<Coord<f64>, SkipReason> {
    match position {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
        [x, y, ..] => Err(SkipReason::NonFiniteCoordinate { x: *x, y: *y }),
        _ => Err(SkipReason::InvalidGeometry(format!(
            "position needs at least 2 values, got {}",
            position.len()
        ))),
    }
}

fn line(positions: &[Vec<f64>]) -> std::result::Result<LineString<f64>, SkipReason> {
    positions
        .iter()
        .map(|p| coord(p))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(LineString::from)
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> std::result::Result<Polygon<f64>, SkipReason> {
    let mut rings = rings.iter().map(|r| line(r));
    let exterior = rings
        .next()
        .ok_or_else(|| SkipReason::InvalidGeometry("polygon without rings".into()))??;
    let interiors = rings.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn json_object_to_properties(obj: Option<&::geojson::JsonObject>) -> Properties {
    obj.map(|o| {
        o.iter()
            .map(|(k, v)| (k.clone(), PropertyValue::from(v)))
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::GeometryKind;

    const MIXED: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": 7, "geometry": {"type": "Point", "coordinates": [2.35, 48.85, 35.0]},
             "properties": {"name": "Paris", "value": 10}},
            {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]},
             "properties": null, "category": "road"}
        ]
    }"#;

    #[test]
    fn reads_mixed_collection() {
        let fc = read_geojson(MIXED).unwrap();
        assert_eq!(fc.len(), 2);
        assert_eq!(fc.dominant_kind(), Some(GeometryKind::Point));

        let paris = &fc.features[0];
        assert_eq!(paris.id.as_deref(), Some("7"));
        match paris.geometry.as_ref().unwrap() {
            Geometry::Point(p) => {
                assert_eq!(p.x(), 2.35);
                assert_eq!(p.y(), 48.85);
            }
            other => panic!("expected point, got {other:?}"),
        }
        assert_eq!(paris.get_property("value"), Some(&PropertyValue::Number(10.0)));

        assert_eq!(fc.features[1].foreign.get("category"), Some(&PropertyValue::from("road")));
    }

    #[test]
    fn short_or_non_finite_positions_are_rejected() {
        assert!(matches!(
            geometry_from_geojson(&Value::Point(vec![1.0])),
            Err(SkipReason::InvalidGeometry(_))
        ));
        assert!(matches!(
            geometry_from_geojson(&Value::LineString(vec![vec![0.0, 0.0], vec![f64::NAN, 1.0]])),
            Err(SkipReason::NonFiniteCoordinate { .. })
        ));
    }

    #[test]
    fn bare_geometry_becomes_single_feature() {
        let fc = read_geojson(r#"{"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}"#).unwrap();
        assert_eq!(fc.len(), 1);
        assert_eq!(fc.dominant_kind(), Some(GeometryKind::Polygon));
    }

    #[test]
    fn invalid_text_is_an_error() {
        assert!(matches!(read_geojson("{not json"), Err(Error::GeoJson(_))));
    }

    #[test]
    fn write_then_read_keeps_properties() {
        let fc = read_geojson(MIXED).unwrap();
        let text = write_geojson(&fc).unwrap();
        let back = read_geojson(&text).unwrap();
        assert_eq!(back.features[0].properties, fc.features[0].properties);
        assert_eq!(back.features[1].geometry, fc.features[1].geometry);
    }
}
