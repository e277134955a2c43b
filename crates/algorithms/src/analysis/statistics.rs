//! Collection statistics: counts, geometry histogram, total area and length

use crate::vector::{area, length_km};
use geo_types::Geometry;
use geolens_core::{FeatureCollection, GeometryKind, SkipReason};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Summary of a feature collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionStatistics {
    pub count: usize,
    /// Features per GeoJSON geometry type name
    pub geometry_types: BTreeMap<String, usize>,
    /// Square meters; present when any geometry type contains "Polygon"
    pub total_area: Option<f64>,
    /// Kilometers; present when any geometry type contains "LineString"
    pub total_length: Option<f64>,
}

/// Count features and sum their areas and lengths.
///
/// A feature whose area or length cannot be computed is left out of the sum
/// without zeroing it.
pub fn statistics(collection: &FeatureCollection) -> CollectionStatistics {
    let mut stats = CollectionStatistics {
        count: collection.len(),
        ..Default::default()
    };

    for f in collection.iter() {
        if let Some(kind) = f.kind() {
            *stats.geometry_types.entry(kind.name().to_string()).or_default() += 1;
        }
    }

    let has = |needle: &str| stats.geometry_types.keys().any(|k| k.contains(needle));
    let (polygonal, lineal) = (has("Polygon"), has("LineString"));

    if polygonal {
        stats.total_area = Some(sum_measure(collection, GeometryKind::is_polygonal, area, "area"));
    }
    if lineal {
        stats.total_length = Some(sum_measure(collection, GeometryKind::is_lineal, length_km, "length"));
    }

    stats
}

fn sum_measure(
    collection: &FeatureCollection,
    applies: fn(&GeometryKind) -> bool,
    measure: fn(&Geometry<f64>) -> Result<f64, SkipReason>,
    what: &'static str,
) -> f64 {
    let mut total = 0.0;
    for (index, f) in collection.iter().enumerate() {
        let Some(g) = f.geometry.as_ref() else { continue };
        if !applies(&GeometryKind::of(g)) {
            continue;
        }
        match measure(g) {
            Ok(v) => total += v,
            Err(reason) => warn!(index, %reason, "{what} skipped"),
        }
    }
    total
}
