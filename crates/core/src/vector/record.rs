//! Tabular records and layer payloads.

use geo_types::Coord;

use super::feature::FeatureCollection;
use super::value::{Properties, PropertyValue};
use super::FieldSource;
use crate::error::SkipReason;

/// Coordinate field pairs `(latitude, longitude)` in resolution priority order.
///
/// CSV import and the point normalizer both depend on this exact order.
pub const COORDINATE_FIELDS: &[(&str, &str)] = &[
    ("latitude", "longitude"),
    ("lat", "lng"),
    ("lat", "lon"),
    ("y", "x"),
];

/// Fields used to order points into lines and trips, highest priority first.
pub const ORDER_FIELDS: &[&str] = &["time", "timestamp", "order"];

/// A row of named scalar values, e.g. one CSV line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularRecord {
    pub fields: Properties,
}

impl TabularRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.fields.get(key)
    }

    /// Resolve a `(lon, lat)` coordinate from the first field pair present.
    ///
    /// The first pair whose both fields exist wins; a later pair is never
    /// consulted once an earlier one matched, even if its values are unusable.
    pub fn coordinate(&self) -> Result<Coord<f64>, SkipReason> {
        let (lat_key, lon_key) = COORDINATE_FIELDS
            .iter()
            .find(|(lat, lon)| self.has_value(lat) && self.has_value(lon))
            .ok_or(SkipReason::MissingCoordinates)?;

        let lat = self.numeric_field(lat_key);
        let lon = self.numeric_field(lon_key);
        match (lon, lat) {
            (Some(x), Some(y)) => Ok(Coord { x, y }),
            _ => Err(SkipReason::NonFiniteCoordinate {
                x: lon.unwrap_or(f64::NAN),
                y: lat.unwrap_or(f64::NAN),
            }),
        }
    }

    /// Value of the highest-priority ordering field present, if numeric.
    pub fn order_key(&self) -> Option<f64> {
        order_key(self)
    }

    fn has_value(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|v| !v.is_null())
    }
}

impl FieldSource for TabularRecord {
    fn field(&self, name: &str) -> Option<&PropertyValue> {
        self.fields.get(name)
    }
}

impl From<Properties> for TabularRecord {
    fn from(fields: Properties) -> Self {
        Self { fields }
    }
}

/// First ordering field (see [`ORDER_FIELDS`]) present on `source`, as a number.
pub fn order_key(source: &impl FieldSource) -> Option<f64> {
    ORDER_FIELDS
        .iter()
        .find(|k| source.field(k).is_some_and(|v| !v.is_null()))
        .and_then(|k| source.numeric_field(k))
}

/// Data held by a layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerData {
    Features(FeatureCollection),
    Records(Vec<TabularRecord>),
}

impl LayerData {
    pub fn len(&self) -> usize {
        match self {
            Self::Features(fc) => fc.len(),
            Self::Records(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_features(&self) -> Option<&FeatureCollection> {
        match self {
            Self::Features(fc) => Some(fc),
            Self::Records(_) => None,
        }
    }
}

impl From<FeatureCollection> for LayerData {
    fn from(fc: FeatureCollection) -> Self {
        Self::Features(fc)
    }
}

impl From<Vec<TabularRecord>> for LayerData {
    fn from(rows: Vec<TabularRecord>) -> Self {
        Self::Records(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_priority_prefers_latitude_longitude() {
        let r = TabularRecord::new()
            .with("latitude", 10.0)
            .with("longitude", 20.0)
            .with("y", 1.0)
            .with("x", 2.0);
        assert_eq!(r.coordinate().unwrap(), Coord { x: 20.0, y: 10.0 });
    }

    #[test]
    fn coordinate_lat_lng_before_lat_lon() {
        let r = TabularRecord::new()
            .with("lat", 48.85)
            .with("lng", 2.35)
            .with("lon", 99.0);
        assert_eq!(r.coordinate().unwrap(), Coord { x: 2.35, y: 48.85 });
    }

    #[test]
    fn coordinate_missing_or_non_numeric() {
        let r = TabularRecord::new().with("name", "a");
        assert_eq!(r.coordinate(), Err(SkipReason::MissingCoordinates));

        let r = TabularRecord::new().with("y", "north").with("x", 3.0);
        assert!(matches!(r.coordinate(), Err(SkipReason::NonFiniteCoordinate { .. })));
    }

    #[test]
    fn order_key_priority() {
        let r = TabularRecord::new().with("order", 3.0).with("timestamp", 7.0);
        assert_eq!(r.order_key(), Some(7.0));
        assert_eq!(TabularRecord::new().order_key(), None);
    }
}
