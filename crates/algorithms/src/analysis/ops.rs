//! Analysis operations

use super::index::TargetIndex;
use super::{AnalysisConfig, AnalysisError, AnalysisOutput, AnalysisResult};
use crate::maybe_rayon::map_indexed;
use crate::vector::{
    self, buffer_feature, centroid_feature, from_multipolygon, representative_point, to_multipolygon,
    voronoi_cells, BoundingBox, BufferParams, VoronoiParams,
};
use geo_types::{MultiPolygon, Point};
use geolens_core::{Feature, FeatureCollection, PropertyValue, SkipReason};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// What one source feature contributed: kept features and failures.
type Outcome = Vec<Result<Feature, SkipReason>>;

fn require_source(source: &FeatureCollection) -> AnalysisResult<()> {
    if source.is_empty() {
        return Err(AnalysisError::InvalidInput("source collection is empty".into()));
    }
    Ok(())
}

fn require_target(target: &FeatureCollection, op: &str) -> AnalysisResult<()> {
    if target.is_empty() {
        return Err(AnalysisError::InvalidInput(format!("{op} needs a non-empty target collection")));
    }
    Ok(())
}

/// Run `f` for every source feature, then keep the successes and log the rest.
fn per_feature<F>(
    op: &'static str,
    source: &FeatureCollection,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
    f: F,
) -> AnalysisResult<AnalysisOutput>
where
    F: Fn(usize, &Feature) -> Outcome + Sync + Send,
{
    let outcomes = map_indexed(&source.features, config.parallel, |index, feature| {
        if cancel.is_cancelled() {
            return Vec::new();
        }
        f(index, feature)
    });
    if cancel.is_cancelled() {
        debug!(op, "cancelled");
        return Err(AnalysisError::Cancelled);
    }

    let mut collection = FeatureCollection::new();
    let mut skipped = 0;
    for (index, outcome) in outcomes.into_iter().enumerate() {
        for item in outcome {
            match item {
                Ok(feature) => collection.push(feature),
                Err(reason) => {
                    warn!(op, index, %reason, "skipping feature");
                    skipped += 1;
                }
            }
        }
    }
    debug!(op, kept = collection.len(), skipped, "done");
    Ok(AnalysisOutput::new(collection, skipped))
}

/// Buffer every feature by `params`.
pub fn buffer(
    source: &FeatureCollection,
    params: &BufferParams,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> AnalysisResult<AnalysisOutput> {
    require_source(source)?;
    params.validate()?;
    per_feature("buffer", source, config, cancel, |_, f| vec![buffer_feature(f, params)])
}

/// Replace every feature with its centroid, keeping properties.
pub fn centroid(
    source: &FeatureCollection,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> AnalysisResult<AnalysisOutput> {
    require_source(source)?;
    per_feature("centroid", source, config, cancel, |_, f| vec![centroid_feature(f)])
}

/// Polygonal features as multipolygons; other kinds are `None`.
///
/// Invalid polygonal targets are logged once here and never paired.
fn polygonal_targets(target: &FeatureCollection) -> (Vec<Option<MultiPolygon<f64>>>, usize) {
    let mut skipped = 0;
    let shapes = target
        .iter()
        .enumerate()
        .map(|(index, f)| {
            let g = f.geometry.as_ref().filter(|g| geolens_core::GeometryKind::of(g).is_polygonal())?;
            match to_multipolygon(g) {
                Ok(mp) => Some(mp),
                Err(reason) => {
                    warn!(index, %reason, "skipping target feature");
                    skipped += 1;
                    None
                }
            }
        })
        .collect();
    (shapes, skipped)
}

fn source_shape(f: &Feature) -> Option<Result<MultiPolygon<f64>, SkipReason>> {
    let g = f.geometry.as_ref().filter(|g| geolens_core::GeometryKind::of(g).is_polygonal())?;
    Some(to_multipolygon(g))
}

fn id_value(f: &Feature, index: usize) -> PropertyValue {
    match &f.id {
        Some(id) => PropertyValue::from(id.as_str()),
        None => PropertyValue::from(index as f64),
    }
}

/// Pairwise intersection of polygonal sources and targets.
///
/// Each non-empty overlap becomes a feature with the source properties, the
/// target properties layered on top, and `source_id`/`target_id`. Pairs that
/// fail are skipped; pairs that simply do not overlap are not failures.
pub fn intersection(
    source: &FeatureCollection,
    target: &FeatureCollection,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> AnalysisResult<AnalysisOutput> {
    require_source(source)?;
    require_target(target, "intersection")?;
    let (targets, bad_targets) = polygonal_targets(target);
    let index = TargetIndex::build(&targets, config.use_spatial_index);

    let mut out = per_feature("intersection", source, config, cancel, |i, src| {
        let shape = match source_shape(src) {
            None => return Vec::new(),
            Some(Err(reason)) => return vec![Err(reason)],
            Some(Ok(mp)) => mp,
        };
        let mut outcome = Outcome::new();
        for j in index.candidates(&shape) {
            if cancel.is_cancelled() {
                break;
            }
            let Some(other) = targets[j].as_ref() else { continue };
            match vector::intersection(&shape, other) {
                Ok(mp) => {
                    let tgt = &target.features[j];
                    let mut feature = Feature::new(from_multipolygon(mp));
                    feature.properties = src.properties.clone();
                    feature.properties.extend(tgt.properties.clone());
                    feature.set_property("source_id", id_value(src, i));
                    feature.set_property("target_id", id_value(tgt, j));
                    outcome.push(Ok(feature));
                }
                Err(SkipReason::EmptyResult) => {}
                Err(reason) => outcome.push(Err(reason)),
            }
        }
        outcome
    })?;
    out.skipped += bad_targets;
    Ok(out)
}

/// Subtract every overlapping target from each polygonal source in turn.
///
/// A subtraction step that fails keeps the remainder from before it. Sources
/// with nothing left are dropped.
pub fn difference(
    source: &FeatureCollection,
    target: &FeatureCollection,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> AnalysisResult<AnalysisOutput> {
    require_source(source)?;
    require_target(target, "difference")?;
    let (targets, bad_targets) = polygonal_targets(target);
    let index = TargetIndex::build(&targets, config.use_spatial_index);

    let mut out = per_feature("difference", source, config, cancel, |_, src| {
        let shape = match source_shape(src) {
            None => return Vec::new(),
            Some(Err(reason)) => return vec![Err(reason)],
            Some(Ok(mp)) => mp,
        };
        let mut outcome = Outcome::new();
        let mut remainder = Some(shape.clone());
        for j in index.candidates(&shape) {
            if cancel.is_cancelled() {
                return Vec::new();
            }
            let (Some(rem), Some(other)) = (remainder.as_ref(), targets[j].as_ref()) else {
                continue;
            };
            match vector::difference(rem, other) {
                Ok(next) => remainder = next,
                Err(reason) => outcome.push(Err(reason)),
            }
            if remainder.is_none() {
                break;
            }
        }
        if let Some(rem) = remainder {
            outcome.push(Ok(src.with_geometry(from_multipolygon(rem))));
        }
        outcome
    })?;
    out.skipped += bad_targets;
    Ok(out)
}

/// Dissolve all polygonal features into one.
///
/// Unlike the other operations there is no per-feature fallback: an invalid
/// geometry or a kernel failure fails the whole request.
pub fn union(source: &FeatureCollection, cancel: &CancellationToken) -> AnalysisResult<AnalysisOutput> {
    require_source(source)?;
    let mut parts = Vec::new();
    for (index, f) in source.iter().enumerate() {
        match source_shape(f) {
            None => {}
            Some(Ok(mp)) => parts.push(mp),
            Some(Err(reason)) => {
                return Err(AnalysisError::OperationFailure(format!(
                    "feature {index} cannot be dissolved: {reason}"
                )))
            }
        }
    }
    if parts.is_empty() {
        return Err(AnalysisError::OperationFailure("no polygon features to dissolve".into()));
    }
    if cancel.is_cancelled() {
        return Err(AnalysisError::Cancelled);
    }

    let merged = vector::union_all(parts)
        .map_err(|reason| AnalysisError::OperationFailure(format!("dissolve failed: {reason}")))?;
    if cancel.is_cancelled() {
        return Err(AnalysisError::Cancelled);
    }
    let collection = FeatureCollection::from(vec![Feature::new(from_multipolygon(merged))]);
    Ok(AnalysisOutput::new(collection, 0))
}

/// Voronoi cells around one representative point per feature.
///
/// Cells keep the properties of the feature they were built from. Without an
/// explicit box the extent of the points is used.
pub fn voronoi(
    source: &FeatureCollection,
    params: &VoronoiParams,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> AnalysisResult<AnalysisOutput> {
    require_source(source)?;

    let mut skipped = 0;
    let mut sites: Vec<(Point<f64>, &Feature)> = Vec::with_capacity(source.len());
    for (index, f) in source.iter().enumerate() {
        match representative_point(f) {
            Ok(p) => sites.push((p, f)),
            Err(reason) => {
                warn!(op = "voronoi", index, %reason, "skipping feature");
                skipped += 1;
            }
        }
    }
    let points: Vec<Point<f64>> = sites.iter().map(|(p, _)| *p).collect();

    let bbox = match params.bbox {
        Some(bb) => bb,
        None => BoundingBox::from_points(&points)
            .map(|bb| bb.padded(params.padding))
            .ok_or_else(|| AnalysisError::InvalidInput("no usable points for voronoi".into()))?,
    };
    if !(bbox.width() > 0.0 && bbox.height() > 0.0) {
        return Err(AnalysisError::InvalidInput("voronoi bounding box has no area".into()));
    }
    if cancel.is_cancelled() {
        return Err(AnalysisError::Cancelled);
    }

    let cells = voronoi_cells(&points, &bbox, config.parallel);
    if cancel.is_cancelled() {
        return Err(AnalysisError::Cancelled);
    }

    let mut collection = FeatureCollection::new();
    for ((_, f), cell) in sites.iter().zip(cells) {
        match cell {
            Some(poly) => collection.push(f.with_geometry(poly)),
            None => {
                debug!("no voronoi cell for a duplicate or outlying site");
                skipped += 1;
            }
        }
    }
    Ok(AnalysisOutput::new(collection, skipped))
}
