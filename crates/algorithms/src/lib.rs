//! # GeoLens Algorithms
//!
//! Geometry normalization, vector primitives and the spatial analysis engine.
//!
//! ## Modules
//!
//! - **normalize**: raw layer data to points, lines, polygons or timestamped paths
//! - **vector**: buffer, centroid, overlay, Voronoi, geodesic area and length
//! - **analysis**: batch operations over feature collections with per-feature
//!   failure isolation, statistics and cancellation

mod maybe_rayon;

pub mod analysis;
pub mod normalize;
pub mod vector;

pub use analysis::{AnalysisConfig, AnalysisError, AnalysisOutput, AnalysisResult, Operation};
pub use normalize::{normalize, Shape};

/// Cooperative cancellation handle accepted by every analysis operation
pub use tokio_util::sync::CancellationToken;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::{
        buffer, centroid, difference, intersection, run, statistics, union, voronoi,
        AnalysisConfig, AnalysisError, AnalysisOutput, CollectionStatistics, Operation,
    };
    pub use crate::normalize::{normalize, trips, Shape, TripPath};
    pub use crate::vector::{
        BoundingBox, BufferParams, DistanceUnits, VoronoiParams,
    };
    pub use crate::CancellationToken;
    pub use geolens_core::prelude::*;
}
