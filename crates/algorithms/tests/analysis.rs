//! End-to-end analysis over GeoJSON input

use approx::assert_relative_eq;
use geolens_algorithms::prelude::*;
use geolens_algorithms::vector::area;
use geolens_core::io::read_geojson;

fn squares() -> FeatureCollection {
    read_geojson(
        r#"{
          "type": "FeatureCollection",
          "features": [
            {"type": "Feature", "id": "a", "properties": {"name": "a", "kind": "src"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]]}},
            {"type": "Feature", "properties": {"name": "bow"},
             "geometry": {"type": "Polygon", "coordinates": [[[10,10],[11,11],[11,10],[10,11],[10,10]]]}},
            {"type": "Feature", "properties": {"name": "c"},
             "geometry": {"type": "Polygon", "coordinates": [[[20,20],[22,20],[22,22],[20,22],[20,20]]]}},
            {"type": "Feature", "properties": {"name": "pt"},
             "geometry": {"type": "Point", "coordinates": [1,1]}}
          ]
        }"#,
    )
    .unwrap()
}

fn targets() -> FeatureCollection {
    read_geojson(
        r#"{
          "type": "FeatureCollection",
          "features": [
            {"type": "Feature", "properties": {"kind": "tgt", "zone": 1},
             "geometry": {"type": "Polygon", "coordinates": [[[1,1],[3,1],[3,3],[1,3],[1,1]]]}},
            {"type": "Feature", "properties": {"zone": 2},
             "geometry": {"type": "Polygon", "coordinates": [[[10,10],[12,10],[12,12],[10,12],[10,10]]]}},
            {"type": "Feature", "properties": {"zone": 3},
             "geometry": {"type": "Polygon", "coordinates": [[[21,19],[23,19],[23,23],[21,23],[21,19]]]}}
          ]
        }"#,
    )
    .unwrap()
}

#[test]
fn intersection_isolates_degenerate_pairs() {
    let cancel = CancellationToken::new();
    let out = intersection(&squares(), &targets(), &AnalysisConfig::default(), &cancel).unwrap();

    assert_eq!(out.collection.len(), 2);
    assert_eq!(out.skipped, 1, "only the bow tie fails");

    let first = &out.collection.features[0];
    assert_eq!(first.get_property("source_id"), Some(&PropertyValue::from("a")));
    assert_eq!(first.get_property("target_id"), Some(&PropertyValue::from(0.0)));
    assert_eq!(first.get_property("kind"), Some(&PropertyValue::from("tgt")));
    assert_eq!(first.get_property("name"), Some(&PropertyValue::from("a")));

    let second = &out.collection.features[1];
    assert_eq!(second.get_property("source_id"), Some(&PropertyValue::from(2.0)));
    assert_eq!(second.get_property("zone"), Some(&PropertyValue::from(3.0)));
}

#[test]
fn spatial_index_does_not_change_results() {
    let cancel = CancellationToken::new();
    let indexed = AnalysisConfig { parallel: false, use_spatial_index: true };
    let scanned = AnalysisConfig { parallel: false, use_spatial_index: false };
    let a = intersection(&squares(), &targets(), &indexed, &cancel).unwrap();
    let b = intersection(&squares(), &targets(), &scanned, &cancel).unwrap();
    assert_eq!(a.collection, b.collection);
}

#[test]
fn difference_shrinks_and_drops() {
    let cancel = CancellationToken::new();
    let src = read_geojson(
        r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"n": 1},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]]}},
            {"type": "Feature", "properties": {"n": 2},
             "geometry": {"type": "Polygon", "coordinates": [[[10.5,10.5],[11,10.5],[11,11],[10.5,11],[10.5,10.5]]]}}
        ]}"#,
    )
    .unwrap();
    let out = difference(&src, &targets(), &AnalysisConfig::default(), &cancel).unwrap();

    // The second source lies entirely inside target 2.
    assert_eq!(out.collection.len(), 1);
    let rem = &out.collection.features[0];
    assert_eq!(rem.get_property("n"), Some(&PropertyValue::from(1.0)));
    let full = area(src.features[0].geometry.as_ref().unwrap()).unwrap();
    let left = area(rem.geometry.as_ref().unwrap()).unwrap();
    assert_relative_eq!(left / full, 0.75, epsilon = 0.01);
}

#[test]
fn union_dissolves_or_fails_whole() {
    let cancel = CancellationToken::new();
    let out = union(&targets(), &cancel).unwrap();
    assert_eq!(out.collection.len(), 1);
    assert_eq!(out.statistics.geometry_types.get("MultiPolygon"), Some(&1));

    assert!(matches!(union(&squares(), &cancel), Err(AnalysisError::OperationFailure(_))));

    let points = FeatureCollection::from(vec![Feature::new(Point::new(0.0, 0.0))]);
    assert!(matches!(union(&points, &cancel), Err(AnalysisError::OperationFailure(_))));
}

#[test]
fn buffer_point_area_is_a_circle() {
    let cancel = CancellationToken::new();
    let src = FeatureCollection::from(vec![Feature::new(Point::new(2.35, 48.85))]);
    let params = BufferParams::new(1.0, DistanceUnits::Kilometers);
    let out = buffer(&src, &params, &AnalysisConfig::default(), &cancel).unwrap();
    assert_eq!(out.collection.len(), 1);
    let a = out.statistics.total_area.unwrap();
    assert_relative_eq!(a, std::f64::consts::PI * 1.0e6, max_relative = 0.05);
}

#[test]
fn buffer_rejects_bad_parameters_and_empty_source() {
    let cancel = CancellationToken::new();
    let cfg = AnalysisConfig::default();
    let src = FeatureCollection::from(vec![Feature::new(Point::new(0.0, 0.0))]);
    let negative = BufferParams::new(-5.0, DistanceUnits::Meters);
    assert!(matches!(buffer(&src, &negative, &cfg, &cancel), Err(AnalysisError::InvalidInput(_))));
    assert!(matches!(
        buffer(&FeatureCollection::new(), &BufferParams::default(), &cfg, &cancel),
        Err(AnalysisError::InvalidInput(_))
    ));
}

#[test]
fn centroid_skips_failures() {
    let cancel = CancellationToken::new();
    let out = centroid(&squares(), &AnalysisConfig::default(), &cancel).unwrap();
    assert_eq!(out.collection.len(), 3);
    assert_eq!(out.skipped, 1);
    assert_eq!(out.statistics.geometry_types.get("Point"), Some(&3));
}

#[test]
fn voronoi_covers_the_point_extent() {
    let cancel = CancellationToken::new();
    let sites = FeatureCollection::from(vec![
        Feature::new(Point::new(0.0, 0.0)).with_property("id", 1.0),
        Feature::new(Point::new(1.0, 0.0)).with_property("id", 2.0),
        Feature::new(Point::new(0.0, 1.0)).with_property("id", 3.0),
        Feature::new(Point::new(1.0, 1.0)).with_property("id", 4.0),
    ]);
    let params = VoronoiParams::default();
    let out = voronoi(&sites, &params, &AnalysisConfig::default(), &cancel).unwrap();
    assert_eq!(out.collection.len(), 4);
    assert_eq!(out.collection.features[2].get_property("id"), Some(&PropertyValue::from(3.0)));

    let bbox = BoundingBox::new(-1.0, -1.0, 2.0, 2.0);
    let boxed = VoronoiParams { bbox: Some(bbox), ..params };
    let out = voronoi(&sites, &boxed, &AnalysisConfig::default(), &cancel).unwrap();
    let total: f64 = out.statistics.total_area.unwrap();
    let whole = area(&Geometry::Polygon(bbox.to_polygon())).unwrap();
    assert_relative_eq!(total, whole, max_relative = 1e-3);
}

#[test]
fn cancelled_requests_return_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let cfg = AnalysisConfig::default();
    assert_eq!(intersection(&squares(), &targets(), &cfg, &cancel).unwrap_err(), AnalysisError::Cancelled);
    assert_eq!(difference(&squares(), &targets(), &cfg, &cancel).unwrap_err(), AnalysisError::Cancelled);
    assert_eq!(centroid(&squares(), &cfg, &cancel).unwrap_err(), AnalysisError::Cancelled);
}
