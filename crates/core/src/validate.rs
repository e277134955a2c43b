//! Advisory GeoJSON validation.
//!
//! Validation never blocks loading: a layer with problems is still registered
//! and drawn where possible, and the report is surfaced as warnings.

use geo_types::{Coord, Geometry, LineString, Polygon};
use serde::Serialize;
use serde_json::Value;

use crate::vector::FeatureCollection;

const GEOMETRY_TYPES: &[&str] = &[
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
    "GeometryCollection",
];

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Structural problems (wrong types, malformed coordinates).
    pub errors: Vec<String>,
    /// Suspicious but usable input (out-of-range coordinates, open rings).
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    fn error(&mut self, msg: String) {
        self.errors.push(msg);
    }

    fn warn(&mut self, msg: String) {
        self.warnings.push(msg);
    }
}

/// Validate a raw GeoJSON document.
pub fn validate_geojson(doc: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    match doc.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => match doc.get("features").and_then(Value::as_array) {
            Some(features) => {
                if features.is_empty() {
                    report.warn("FeatureCollection has no features".into());
                }
                for (i, f) in features.iter().enumerate() {
                    check_feature(f, &format!("features[{i}]"), &mut report);
                }
            }
            None => report.error("FeatureCollection must have a 'features' array".into()),
        },
        Some("Feature") => check_feature(doc, "feature", &mut report),
        Some(t) if GEOMETRY_TYPES.contains(&t) => check_geometry(doc, "geometry", &mut report),
        Some(t) => report.error(format!("unknown GeoJSON type '{t}'")),
        None => report.error("missing 'type' member".into()),
    }

    report
}

fn check_feature(f: &Value, path: &str, report: &mut ValidationReport) {
    if f.get("type").and_then(Value::as_str) != Some("Feature") {
        report.error(format!("{path}: type must be 'Feature'"));
    }
    match f.get("geometry") {
        None => report.error(format!("{path}: missing 'geometry' member")),
        Some(Value::Null) => report.warn(format!("{path}: null geometry")),
        Some(g) => check_geometry(g, &format!("{path}.geometry"), report),
    }
    if let Some(p) = f.get("properties") {
        if !(p.is_object() || p.is_null()) {
            report.error(format!("{path}: 'properties' must be an object or null"));
        }
    }
}

fn check_geometry(g: &Value, path: &str, report: &mut ValidationReport) {
    let Some(kind) = g.get("type").and_then(Value::as_str) else {
        report.error(format!("{path}: missing geometry type"));
        return;
    };
    if kind == "GeometryCollection" {
        match g.get("geometries").and_then(Value::as_array) {
            Some(children) => {
                for (i, child) in children.iter().enumerate() {
                    check_geometry(child, &format!("{path}.geometries[{i}]"), report);
                }
            }
            None => report.error(format!("{path}: GeometryCollection needs 'geometries'")),
        }
        return;
    }
    let Some(coords) = g.get("coordinates") else {
        report.error(format!("{path}: missing coordinates"));
        return;
    };
    // Nesting depth of a well-formed coordinates array per geometry type.
    let depth = match kind {
        "Point" => 0,
        "MultiPoint" | "LineString" => 1,
        "MultiLineString" | "Polygon" => 2,
        "MultiPolygon" => 3,
        other => {
            report.error(format!("{path}: unknown geometry type '{other}'"));
            return;
        }
    };
    check_coordinates(coords, depth, kind, path, report);
}

fn check_coordinates(v: &Value, depth: usize, kind: &str, path: &str, report: &mut ValidationReport) {
    if depth == 0 {
        check_position(v, path, report);
        return;
    }
    let Some(items) = v.as_array() else {
        report.error(format!("{path}: coordinates must be an array"));
        return;
    };
    // Innermost sequences are the ones that form lines or rings.
    if depth == 1 {
        match kind {
            "LineString" | "MultiLineString" if items.len() < 2 => {
                report.error(format!("{path}: a line needs at least 2 positions"));
            }
            "Polygon" | "MultiPolygon" => check_ring(items, path, report),
            _ => {}
        }
    }
    for (i, item) in items.iter().enumerate() {
        check_coordinates(item, depth - 1, kind, &format!("{path}[{i}]"), report);
    }
}

fn check_ring(ring: &[Value], path: &str, report: &mut ValidationReport) {
    if ring.len() < 4 {
        report.error(format!("{path}: a polygon ring needs at least 4 positions"));
    } else if ring.first() != ring.last() {
        report.warn(format!("{path}: polygon ring is not closed"));
    }
}

fn check_position(v: &Value, path: &str, report: &mut ValidationReport) {
    let Some(items) = v.as_array() else {
        report.error(format!("{path}: position must be an array"));
        return;
    };
    let nums: Vec<f64> = items.iter().filter_map(Value::as_f64).collect();
    if items.len() < 2 || nums.len() != items.len() {
        report.error(format!("{path}: position needs 2 or 3 numbers"));
        return;
    }
    check_range(Coord { x: nums[0], y: nums[1] }, path, report);
}

fn check_range(c: Coord<f64>, path: &str, report: &mut ValidationReport) {
    if !(-180.0..=180.0).contains(&c.x) {
        report.warn(format!("{path}: longitude {} out of range", c.x));
    }
    if !(-90.0..=90.0).contains(&c.y) {
        report.warn(format!("{path}: latitude {} out of range", c.y));
    }
}

/// Validate already-parsed features.
pub fn validate_collection(collection: &FeatureCollection) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (i, feature) in collection.iter().enumerate() {
        let path = format!("features[{i}]");
        match &feature.geometry {
            None => report.warn(format!("{path}: no geometry")),
            Some(g) => check_typed(g, &path, &mut report),
        }
    }
    report
}

fn check_typed(g: &Geometry<f64>, path: &str, report: &mut ValidationReport) {
    match g {
        Geometry::Point(p) => check_range(p.0, path, report),
        Geometry::MultiPoint(mp) => mp.iter().for_each(|p| check_range(p.0, path, report)),
        Geometry::LineString(ls) => check_line(ls, path, report),
        Geometry::MultiLineString(mls) => mls.iter().for_each(|ls| check_line(ls, path, report)),
        Geometry::Polygon(p) => check_polygon(p, path, report),
        Geometry::MultiPolygon(mp) => mp.iter().for_each(|p| check_polygon(p, path, report)),
        Geometry::GeometryCollection(gc) => gc.iter().for_each(|g| check_typed(g, path, report)),
        Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {}
    }
}

fn check_line(ls: &LineString<f64>, path: &str, report: &mut ValidationReport) {
    if ls.0.len() < 2 {
        report.error(format!("{path}: a line needs at least 2 positions"));
    }
    ls.0.iter().for_each(|c| check_range(*c, path, report));
}

fn check_polygon(p: &Polygon<f64>, path: &str, report: &mut ValidationReport) {
    // geo-types closes rings on construction, so only the vertex count matters.
    for ring in std::iter::once(p.exterior()).chain(p.interiors()) {
        if ring.0.len() < 4 {
            report.error(format!("{path}: a polygon ring needs at least 4 positions"));
        }
        ring.0.iter().for_each(|c| check_range(*c, path, report));
    }
}
