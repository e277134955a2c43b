//! # GeoLens Core
//!
//! Core types, errors and I/O for the GeoLens map-layer engine.
//!
//! This crate provides:
//! - `Feature` / `FeatureCollection`: geometry plus scalar properties, lon/lat order
//! - `TabularRecord`: field maps with coordinate-like columns
//! - `LayerData`: what a layer can hold
//! - GeoJSON and CSV readers/writers
//! - Advisory validation of GeoJSON input

pub mod error;
pub mod io;
pub mod validate;
pub mod vector;

pub use error::{Error, Result, SkipReason};
pub use vector::{
    Feature, FeatureCollection, FieldSource, GeometryKind, LayerData, Properties, PropertyValue,
    TabularRecord,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result, SkipReason};
    pub use crate::vector::{
        Feature, FeatureCollection, FieldSource, GeometryKind, LayerData, Properties,
        PropertyValue, TabularRecord,
    };
    pub use geo_types::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
}
