//! I/O operations for reading and writing vector data
//!
//! GeoJSON (`Feature`, `FeatureCollection`, bare geometries) and CSV text with
//! heuristically detected coordinate columns. Everything works on in-memory
//! strings; filesystem access is left to the caller.

mod csv;
mod geojson;

pub use self::csv::{
    csv_to_features, detect_coordinate_columns, read_csv, write_csv, CsvTable, EXPORT_HEADER,
    LATITUDE_NAMES, LONGITUDE_NAMES,
};
pub use self::geojson::{
    feature_from_geojson, feature_to_geojson, geometry_from_geojson, read_geojson, write_geojson,
};
