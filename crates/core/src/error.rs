//! Error types for GeoLens

use thiserror::Error;

/// Main error type for GeoLens core operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for GeoLens core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a single feature or record was left out of a result.
///
/// Per-feature computations return `Result<Feature, SkipReason>`; callers keep
/// the `Ok` values and log the rest, so one bad feature never aborts a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    #[error("feature has no geometry")]
    MissingGeometry,

    #[error("no coordinate fields could be resolved")]
    MissingCoordinates,

    #[error("coordinate is not finite: ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometry(String),

    #[error("operation produced an empty geometry")]
    EmptyResult,

    #[error("geometry kernel failure: {0}")]
    Kernel(String),
}
