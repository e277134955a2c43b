//! CSV import and flattened CSV export.

use geo::Centroid;
use geo_types::{Geometry, Point};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::vector::{
    Feature, FeatureCollection, GeometryKind, PropertyValue, TabularRecord, COORDINATE_FIELDS,
};

/// Latitude column names tried for an exact match, in priority order.
pub const LATITUDE_NAMES: &[&str] = &["latitude", "lat", "y"];

/// Longitude column names tried for an exact match, in priority order.
pub const LONGITUDE_NAMES: &[&str] = &["longitude", "lon", "lng", "x"];

/// Header of the flattened CSV export.
pub const EXPORT_HEADER: [&str; 6] = ["geometry_type", "layer", "name", "value", "longitude", "latitude"];

/// Parsed CSV text: header row plus typed records.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub records: Vec<TabularRecord>,
}

impl CsvTable {
    /// Records whose coordinates resolve through [`TabularRecord::coordinate`].
    ///
    /// When the detected columns are not already a recognised field pair they
    /// are renamed to `latitude`/`longitude` in every record. A rename that
    /// would overwrite another column is not applied.
    pub fn into_point_records(self) -> Vec<TabularRecord> {
        let Some((lat_idx, lon_idx)) = detect_coordinate_columns(&self.headers) else {
            return self.records;
        };
        let lat_key = self.headers[lat_idx].as_str();
        let lon_key = self.headers[lon_idx].as_str();
        if COORDINATE_FIELDS
            .iter()
            .any(|&(lat, lon)| lat == lat_key && lon == lon_key)
        {
            return self.records;
        }

        let renames: Vec<(&str, &str)> = [(lat_key, "latitude"), (lon_key, "longitude")]
            .into_iter()
            .filter(|(from, to)| from != to)
            .filter(|(from, to)| {
                let taken = self.headers.iter().any(|h| h == to);
                if taken {
                    warn!(column = *from, target = *to, "coordinate column not renamed, name in use");
                }
                !taken
            })
            .collect();
        debug!(?renames, "canonical coordinate columns");

        self.records
            .iter()
            .map(|record| {
                let mut record = record.clone();
                for (from, to) in &renames {
                    if let Some(value) = record.fields.remove(*from) {
                        record.fields.insert((*to).to_string(), value);
                    }
                }
                record
            })
            .collect()
    }
}

/// Parse CSV text with a header row.
///
/// Cells are typed with [`PropertyValue::infer`]: numbers, booleans, empty
/// cells as null, everything else as text. Short rows leave trailing fields unset.
pub fn read_csv(text: &str) -> Result<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record = headers
            .iter()
            .zip(row.iter())
            .fold(TabularRecord::new(), |r, (h, cell)| r.with(h.clone(), PropertyValue::infer(cell)));
        records.push(record);
    }

    debug!(columns = headers.len(), rows = records.len(), "parsed CSV");
    Ok(CsvTable { headers, records })
}

/// Find the `(latitude, longitude)` column indices.
///
/// Exact case-insensitive names first (see [`LATITUDE_NAMES`] and
/// [`LONGITUDE_NAMES`]); if an axis has no exact match, the first header
/// containing `lat` (or `lon`/`lng`) is used instead.
pub fn detect_coordinate_columns(headers: &[String]) -> Option<(usize, usize)> {
    let exact = |names: &[&str]| {
        names.iter().find_map(|name| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        })
    };
    let containing = |needles: &[&str], skip: Option<usize>| {
        headers.iter().enumerate().position(|(i, h)| {
            let h = h.to_ascii_lowercase();
            Some(i) != skip && needles.iter().any(|n| h.contains(n))
        })
    };

    let lat = exact(LATITUDE_NAMES).or_else(|| containing(&["lat"], None))?;
    let lon = exact(LONGITUDE_NAMES).or_else(|| containing(&["lon", "lng"], Some(lat)))?;
    (lat != lon).then_some((lat, lon))
}

/// Convert CSV text into point features.
///
/// Rows without finite coordinates in the detected columns are skipped. All
/// row fields, including the coordinate columns, become properties.
pub fn csv_to_features(text: &str) -> Result<FeatureCollection> {
    let table = read_csv(text)?;
    let (lat_idx, lon_idx) = detect_coordinate_columns(&table.headers).ok_or_else(|| {
        Error::InvalidInput(format!(
            "no latitude/longitude columns among [{}]",
            table.headers.join(", ")
        ))
    })?;
    let lat_key = &table.headers[lat_idx];
    let lon_key = &table.headers[lon_idx];

    let mut features = FeatureCollection::new();
    for (row, record) in table.records.into_iter().enumerate() {
        let lat = record.get(lat_key).and_then(PropertyValue::as_f64);
        let lon = record.get(lon_key).and_then(PropertyValue::as_f64);
        match (lon, lat) {
            (Some(x), Some(y)) => features.push(Feature {
                geometry: Some(Geometry::Point(Point::new(x, y))),
                properties: record.fields,
                ..Feature::default()
            }),
            _ => warn!(row, "CSV row has no usable coordinates, skipping"),
        }
    }
    Ok(features)
}

/// Flatten layers into `geometry_type,layer,name,value,longitude,latitude` rows.
///
/// Non-point geometries are represented by their centroid; features with no
/// geometry (or no centroid) are left out.
pub fn write_csv<'a, I>(layers: I) -> Result<String>
where
    I: IntoIterator<Item = (&'a str, &'a FeatureCollection)>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;

    for (layer, collection) in layers {
        for (index, feature) in collection.iter().enumerate() {
            let Some(geom) = feature.geometry.as_ref() else {
                continue;
            };
            let point = match geom {
                Geometry::Point(p) => Some(*p),
                other => other.centroid(),
            };
            let Some(point) = point else {
                warn!(layer, index, "feature has no centroid, not exported");
                continue;
            };
            let text = |key: &str| {
                feature
                    .get_property(key)
                    .map(ToString::to_string)
                    .unwrap_or_default()
            };
            writer.write_record([
                GeometryKind::of(geom).name().to_string(),
                layer.to_string(),
                text("name"),
                text("value"),
                point.x().to_string(),
                point.y().to_string(),
            ])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Other(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Polygon};

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn csv_row_becomes_point_lon_first() {
        let fc = csv_to_features("lat,lng,value\n48.85,2.35,10").unwrap();
        assert_eq!(fc.len(), 1);
        let f = &fc.features[0];
        assert_eq!(f.geometry, Some(Geometry::Point(Point::new(2.35, 48.85))));
        assert_eq!(f.get_property("value"), Some(&PropertyValue::Number(10.0)));
    }

    #[test]
    fn exact_match_beats_substring() {
        let h = headers(&["platform", "Latitude", "long_name", "LON"]);
        assert_eq!(detect_coordinate_columns(&h), Some((1, 3)));
    }

    #[test]
    fn substring_fallback() {
        let h = headers(&["name", "gps_lat", "gps_lng"]);
        assert_eq!(detect_coordinate_columns(&h), Some((1, 2)));
        assert_eq!(detect_coordinate_columns(&headers(&["a", "b"])), None);
    }

    #[test]
    fn exact_latitude_names_in_priority_order() {
        let h = headers(&["y", "x", "lat", "lon"]);
        assert_eq!(detect_coordinate_columns(&h), Some((2, 3)));
    }

    #[test]
    fn rows_without_coordinates_are_skipped() {
        let fc = csv_to_features("lat,lon,name\n1,2,a\n,3,b\nabc,4,c\n5,6,d").unwrap();
        assert_eq!(fc.len(), 2);
    }

    #[test]
    fn point_records_resolve_detected_columns() {
        let mixed = read_csv("Latitude,Longitude,value\n48.85,2.35,10").unwrap();
        let records = mixed.into_point_records();
        assert_eq!(records[0].coordinate().unwrap().x, 2.35);
        assert_eq!(records[0].get("value"), Some(&PropertyValue::Number(10.0)));

        let substring = read_csv("gps_lat,gps_lng\n1,2").unwrap().into_point_records();
        assert_eq!(substring[0].coordinate().unwrap().y, 1.0);
        assert!(substring[0].get("gps_lat").is_none());
    }

    #[test]
    fn point_records_keep_recognised_pairs() {
        let records = read_csv("lat,lng,latitude_err\n1,2,0.1").unwrap().into_point_records();
        assert_eq!(records[0].get("lat"), Some(&PropertyValue::Number(1.0)));
        assert!(records[0].get("latitude").is_none());
    }

    #[test]
    fn missing_coordinate_columns_is_invalid_input() {
        assert!(matches!(csv_to_features("a,b\n1,2"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn export_uses_centroid_for_polygons() {
        let square = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)]),
            vec![],
        );
        let fc = FeatureCollection::from(vec![
            Feature::new(square).with_property("name", "sq, one").with_property("value", 3.0),
            Feature::new(Point::new(5.0, 6.0)),
            Feature::empty(),
        ]);
        let text = write_csv([("zones", &fc)]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "geometry_type,layer,name,value,longitude,latitude");
        assert_eq!(lines[1], "Polygon,zones,\"sq, one\",3,1,1");
        assert_eq!(lines[2], "Point,zones,,,5,6");
        assert_eq!(lines.len(), 3);
    }
}
