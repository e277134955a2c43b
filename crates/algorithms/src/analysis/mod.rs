//! Spatial analysis engine
//!
//! Stateless request/response operations over feature collections. Each call
//! reads immutable inputs and returns a new collection; failures follow a
//! three-tier model:
//!
//! - [`AnalysisError::InvalidInput`]: missing source, target or parameter; nothing runs
//! - per-feature failures: logged, counted in [`AnalysisOutput::skipped`], never fatal
//! - [`AnalysisError::OperationFailure`]: whole-operation primitives such as union
//!
//! Every operation polls a [`CancellationToken`] between features and pairs.

mod index;
mod ops;
mod statistics;

pub use ops::{buffer, centroid, difference, intersection, union, voronoi};
pub use statistics::{statistics, CollectionStatistics};

use crate::vector::{BufferParams, VoronoiParams};
use geolens_core::FeatureCollection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that abort an analysis request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    OperationFailure(String),

    #[error("analysis was cancelled")]
    Cancelled,
}

impl From<geolens_core::Error> for AnalysisError {
    fn from(e: geolens_core::Error) -> Self {
        AnalysisError::InvalidInput(e.to_string())
    }
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;

/// Execution knobs shared by all operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Spread per-feature work over the rayon pool (needs the `parallel` feature)
    pub parallel: bool,
    /// Pre-filter overlay pairs with an R-tree over target bounding boxes
    pub use_spatial_index: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            use_spatial_index: true,
        }
    }
}

/// Result of a successful analysis request
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutput {
    pub collection: FeatureCollection,
    /// Features or pairs left out because their computation failed
    pub skipped: usize,
    pub statistics: CollectionStatistics,
}

impl AnalysisOutput {
    pub(crate) fn new(collection: FeatureCollection, skipped: usize) -> Self {
        let statistics = statistics(&collection);
        Self { collection, skipped, statistics }
    }
}

/// An analysis request with its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Buffer(BufferParams),
    Centroid,
    Intersection,
    Union,
    Difference,
    Voronoi(VoronoiParams),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Buffer(_) => "buffer",
            Operation::Centroid => "centroid",
            Operation::Intersection => "intersection",
            Operation::Union => "union",
            Operation::Difference => "difference",
            Operation::Voronoi(_) => "voronoi",
        }
    }

    pub fn needs_target(&self) -> bool {
        matches!(self, Operation::Intersection | Operation::Difference)
    }
}

/// Dispatch an operation.
///
/// A missing or empty source, or a missing target for a binary operation, is
/// rejected before any work starts.
pub fn run(
    operation: &Operation,
    source: Option<&FeatureCollection>,
    target: Option<&FeatureCollection>,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> AnalysisResult<AnalysisOutput> {
    let source = source.ok_or_else(|| AnalysisError::InvalidInput("no source data".into()))?;
    let target = if operation.needs_target() {
        Some(target.ok_or_else(|| {
            AnalysisError::InvalidInput(format!("{} needs target data", operation.name()))
        })?)
    } else {
        None
    };

    match (operation, target) {
        (Operation::Buffer(params), _) => buffer(source, params, config, cancel),
        (Operation::Centroid, _) => centroid(source, config, cancel),
        (Operation::Union, _) => union(source, cancel),
        (Operation::Voronoi(params), _) => voronoi(source, params, config, cancel),
        (Operation::Intersection, Some(t)) => intersection(source, t, config, cancel),
        (Operation::Difference, Some(t)) => difference(source, t, config, cancel),
        (op, None) => Err(AnalysisError::InvalidInput(format!("{} needs target data", op.name()))),
    }
}
