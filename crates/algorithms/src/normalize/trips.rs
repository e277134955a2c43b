//! Timestamped paths for trip rendering

use super::order::OrderKey;
use super::{keep, record_point};
use crate::vector::check_geometry;
use geo_types::{Coord, Geometry, LineString};
use geolens_core::{Feature, FieldSource, LayerData, Properties, SkipReason};

/// Fields naming the trajectory a point belongs to, highest priority first.
pub const TRAJECTORY_FIELDS: &[&str] = &["trajectoryId", "trip_id", "id"];

/// Group name used when an item carries no trajectory field.
const DEFAULT_GROUP: &str = "default";

/// Spacing of synthetic timestamps when no ordering field is numeric.
const DEFAULT_TIME_STEP: f64 = 10.0;

/// One trajectory: ordered coordinates with a timestamp per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPath {
    pub id: String,
    pub path: Vec<Coord<f64>>,
    pub timestamps: Vec<f64>,
    /// Properties of the first point of the trip
    pub properties: Properties,
}

impl TripPath {
    pub fn into_feature(self) -> Feature {
        let mut feature = Feature::new(LineString::new(self.path));
        feature.id = Some(self.id.clone());
        feature.properties = self.properties;
        feature.set_property("trajectoryId", self.id);
        feature
    }
}

/// Group points into trajectories and order each one.
///
/// Lines already present in a collection become trips as they are, with
/// synthetic timestamps. Groups with fewer than two usable points are dropped.
pub fn trips(input: &LayerData) -> Vec<TripPath> {
    let mut out = Vec::new();
    let mut groups: Vec<(String, Vec<TripPoint>)> = Vec::new();

    match input {
        LayerData::Features(fc) => {
            for (index, f) in fc.iter().enumerate() {
                match f.geometry.as_ref() {
                    Some(g @ Geometry::Point(p)) => {
                        if keep(index, check_geometry(g)).is_some() {
                            let id = group_of(f).or_else(|| f.id.clone());
                            push(&mut groups, id, f, p.0, &f.properties);
                        }
                    }
                    Some(g @ Geometry::LineString(ls)) => {
                        if keep(index, check_geometry(g)).is_some() {
                            out.push(line_trip(f, ls));
                        }
                    }
                    Some(_) => {}
                    None => {
                        keep::<()>(index, Err(SkipReason::MissingGeometry));
                    }
                }
            }
        }
        LayerData::Records(rows) => {
            for (index, r) in rows.iter().enumerate() {
                if let Some(f) = keep(index, record_point(r)) {
                    if let Some(Geometry::Point(p)) = f.geometry {
                        push(&mut groups, group_of(r), r, p.0, &r.fields);
                    }
                }
            }
        }
    }

    for (id, points) in groups {
        if let Some(trip) = build(id, points) {
            out.push(trip);
        }
    }
    out
}

struct TripPoint {
    coord: Coord<f64>,
    key: OrderKey,
    properties: Properties,
}

fn group_of(source: &impl FieldSource) -> Option<String> {
    TRAJECTORY_FIELDS
        .iter()
        .find_map(|k| source.field(k).filter(|v| !v.is_null()))
        .map(|v| v.to_string())
}

/// Groups keep the order in which they first appear.
fn push(
    groups: &mut Vec<(String, Vec<TripPoint>)>,
    id: Option<String>,
    source: &impl FieldSource,
    coord: Coord<f64>,
    props: &Properties,
) {
    let id = id.unwrap_or_else(|| DEFAULT_GROUP.to_string());
    let point = TripPoint { coord, key: OrderKey::of(source), properties: props.clone() };
    match groups.iter_mut().find(|(g, _)| *g == id) {
        Some((_, points)) => points.push(point),
        None => groups.push((id, vec![point])),
    }
}

fn build(id: String, points: Vec<TripPoint>) -> Option<TripPath> {
    if points.len() < 2 {
        return None;
    }
    let mut ordered: Vec<&TripPoint> = points.iter().collect();
    ordered.sort_by(|a, b| a.key.compare(&b.key));
    let numeric: Option<Vec<f64>> = ordered.iter().map(|p| p.key.as_number()).collect();
    let timestamps = numeric.unwrap_or_else(|| synthetic_times(ordered.len()));
    Some(TripPath {
        id,
        path: ordered.iter().map(|p| p.coord).collect(),
        timestamps,
        properties: ordered[0].properties.clone(),
    })
}

fn line_trip(feature: &Feature, ls: &LineString<f64>) -> TripPath {
    TripPath {
        id: feature
            .id
            .clone()
            .or_else(|| group_of(feature))
            .unwrap_or_else(|| DEFAULT_GROUP.to_string()),
        path: ls.0.clone(),
        timestamps: synthetic_times(ls.0.len()),
        properties: feature.properties.clone(),
    }
}

fn synthetic_times(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 * DEFAULT_TIME_STEP).collect()
}
