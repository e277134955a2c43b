//! Subcommand implementations
//!
//! Each command reads its inputs from disk and returns a value for `main` to
//! print or write; none of them touch stdout.

use anyhow::{bail, Context, Result};
use geolens_algorithms::analysis::{run, statistics, AnalysisOutput, CollectionStatistics, Operation};
use geolens_algorithms::normalize::{normalize, Shape};
use geolens_algorithms::vector::{BoundingBox, BufferParams, DistanceUnits, VoronoiParams};
use geolens_algorithms::CancellationToken;
use geolens_core::io::{csv_to_features, read_csv, read_geojson, write_csv};
use geolens_core::validate::{validate_geojson, ValidationReport};
use geolens_core::{FeatureCollection, LayerData};
use geolens_layers::format::{format_area, format_length};
use geolens_layers::{DescriptorSummary, LayerConfig, LayerRegistry, StyleConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{CliConfig, ExportConfig};

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Layer data as stored: CSV rows stay records, GeoJSON becomes features.
pub fn read_data(path: &Path) -> Result<LayerData> {
    let text = read_text(path)?;
    let data = if is_csv(path) {
        LayerData::Records(read_csv(&text).context("Failed to parse CSV")?.into_point_records())
    } else {
        LayerData::Features(read_geojson(&text).context("Failed to parse GeoJSON")?)
    };
    debug!(path = %path.display(), items = data.len(), "input loaded");
    Ok(data)
}

/// Features only; CSV rows become points.
pub fn read_features(path: &Path) -> Result<FeatureCollection> {
    let text = read_text(path)?;
    if is_csv(path) {
        csv_to_features(&text).context("Failed to convert CSV rows to points")
    } else {
        read_geojson(&text).context("Failed to parse GeoJSON")
    }
}

/// Collection statistics plus human-readable totals.
#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    #[serde(flatten)]
    pub statistics: CollectionStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
}

pub fn info(path: &Path) -> Result<InfoReport> {
    let stats = statistics(&read_features(path)?);
    Ok(InfoReport {
        area: stats.total_area.map(format_area),
        length: stats.total_length.map(format_length),
        statistics: stats,
    })
}

pub fn validate(path: &Path) -> Result<ValidationReport> {
    let value: serde_json::Value = serde_json::from_str(&read_text(path)?).context("Input is not JSON")?;
    Ok(validate_geojson(&value))
}

pub fn normalize_file(path: &Path, shape: Shape) -> Result<FeatureCollection> {
    let data = read_data(path)?;
    let features = normalize(&data, shape);
    if features.len() < data.len() {
        info!(kept = features.len(), total = data.len(), "some items were not normalized");
    }
    Ok(features.into())
}

/// Register the file as a layer of `kind` and summarize its descriptor.
pub fn describe(path: &Path, kind: &str, style: Option<&Path>) -> Result<DescriptorSummary> {
    let data = read_data(path)?;
    let mut config = LayerConfig::new(layer_name(path), kind).with_data(data);
    if let Some(style_path) = style {
        let style: StyleConfig = serde_json::from_str(&read_text(style_path)?)
            .with_context(|| format!("Invalid style {}", style_path.display()))?;
        config = config.with_style(style);
    }

    let mut registry = LayerRegistry::new();
    let id = registry.add_layer(config);
    let descriptor = registry
        .descriptor(&id)
        .context("Layer produced no descriptor")?;
    Ok(descriptor.summary())
}

/// Command-line form of an analysis request.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeArgs {
    pub operation: String,
    pub source: PathBuf,
    pub target: Option<PathBuf>,
    pub distance: Option<f64>,
    pub units: Option<String>,
    pub steps: Option<usize>,
    pub bbox: Option<String>,
}

pub fn parse_operation(args: &AnalyzeArgs, config: &CliConfig) -> Result<Operation> {
    let op = match args.operation.trim().to_ascii_lowercase().as_str() {
        "buffer" => {
            let Some(distance) = args.distance else {
                bail!("buffer needs --distance");
            };
            let units = match &args.units {
                Some(u) => u.parse::<DistanceUnits>()?,
                None => config.buffer.units,
            };
            let params = BufferParams {
                distance,
                units,
                steps: args.steps.unwrap_or(config.buffer.steps),
            };
            params.validate()?;
            Operation::Buffer(params)
        }
        "centroid" => Operation::Centroid,
        "intersection" | "intersect" => Operation::Intersection,
        "union" | "dissolve" => Operation::Union,
        "difference" | "diff" => Operation::Difference,
        "voronoi" => Operation::Voronoi(VoronoiParams {
            bbox: args.bbox.as_deref().map(parse_bbox).transpose()?,
            ..VoronoiParams::default()
        }),
        other => bail!(
            "Unknown operation: {}. Use buffer, centroid, intersection, union, difference or voronoi.",
            other
        ),
    };
    Ok(op)
}

pub fn parse_bbox(s: &str) -> Result<BoundingBox> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().with_context(|| format!("Invalid bbox value: {v}")))
        .collect::<Result<Vec<_>>>()?;
    let [min_x, min_y, max_x, max_y] = values[..] else {
        bail!("bbox must be 'minx,miny,maxx,maxy', got: {}", s);
    };
    if min_x >= max_x || min_y >= max_y {
        bail!("bbox minimum must be below its maximum: {}", s);
    }
    Ok(BoundingBox::new(min_x, min_y, max_x, max_y))
}

pub fn analyze(args: &AnalyzeArgs, config: &CliConfig, cancel: &CancellationToken) -> Result<AnalysisOutput> {
    let operation = parse_operation(args, config)?;
    let source = read_features(&args.source)?;
    let target = args.target.as_deref().map(read_features).transpose()?;
    if target.is_some() && !operation.needs_target() {
        warn!(operation = operation.name(), "--target is ignored");
    }

    let output = run(&operation, Some(&source), target.as_ref(), &config.analysis, cancel)
        .with_context(|| format!("{} failed", operation.name()))?;
    if output.skipped > 0 {
        warn!(skipped = output.skipped, "some features could not be processed");
    }
    Ok(output)
}

/// Flattened CSV of every input, one layer per file named after its stem.
pub fn export_csv(inputs: &[PathBuf]) -> Result<String> {
    let layers = inputs
        .iter()
        .map(|p| Ok((layer_name(p), read_features(p)?)))
        .collect::<Result<Vec<_>>>()?;
    let text = write_csv(layers.iter().map(|(name, fc)| (name.as_str(), fc)))?;
    Ok(text)
}

fn layer_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "layer".to_string())
}

/// Write `text` to `path`, or stdout when no path is given.
pub fn write_output(path: Option<&Path>, text: &str, export: &ExportConfig) -> Result<()> {
    let Some(path) = path else {
        println!("{text}");
        return Ok(());
    };
    if path.exists() && !export.overwrite {
        bail!("{} exists and overwriting is disabled", path.display());
    }
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SQUARES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"name": "a", "value": 1},
         "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
        {"type": "Feature", "properties": {"name": "b", "value": 2},
         "geometry": {"type": "Polygon", "coordinates": [[[0.5,0],[1.5,0],[1.5,1],[0.5,1],[0.5,0]]]}}
    ]}"#;

    fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn args(op: &str, source: PathBuf) -> AnalyzeArgs {
        AnalyzeArgs { operation: op.into(), source, ..AnalyzeArgs::default() }
    }

    #[test]
    fn normalize_and_info_agree_on_mixed_case_headers() {
        let dir = TempDir::new().unwrap();
        let csv = write(&dir, "stations.csv", "Latitude,Longitude,value\n48.85,2.35,10\n1,2,3\n");
        let points = normalize_file(&csv, Shape::Point).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points.len(), info(&csv).unwrap().statistics.count);
    }

    #[test]
    fn csv_and_geojson_are_told_apart_by_extension() {
        let dir = TempDir::new().unwrap();
        let csv = write(&dir, "pts.CSV", "lat,lng,value\n48.85,2.35,10\n");
        let gj = write(&dir, "squares.json", SQUARES);
        assert!(matches!(read_data(&csv).unwrap(), LayerData::Records(r) if r.len() == 1));
        assert!(matches!(read_data(&gj).unwrap(), LayerData::Features(f) if f.len() == 2));

        let report = info(&csv).unwrap();
        assert_eq!(report.statistics.count, 1);
        assert_eq!(report.statistics.geometry_types.get("Point"), Some(&1));
        assert!(report.area.is_none() && report.length.is_none());

        let squares = info(&gj).unwrap();
        let area = squares.area.unwrap();
        assert!(area.ends_with("km²"), "{area}");
        let json = serde_json::to_value(info(&gj).unwrap()).unwrap();
        assert_eq!(json["count"], 2);
        assert!(json.get("length").is_none());
    }

    #[test]
    fn normalize_csv_to_points() {
        let dir = TempDir::new().unwrap();
        let csv = write(&dir, "pts.csv", "lat,lng,value\n48.85,2.35,10\n1,2,3\n");
        let fc = normalize_file(&csv, Shape::Point).unwrap();
        assert_eq!(fc.len(), 2);
        let lines = normalize_file(&csv, Shape::Line).unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn validate_reports_bad_coordinates() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "bad.geojson",
            r#"{"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [200, 10]}}"#,
        );
        let report = validate(&path).unwrap();
        assert!(!report.is_clean());
    }

    #[test]
    fn describe_applies_style_file() {
        let dir = TempDir::new().unwrap();
        let gj = write(&dir, "squares.geojson", SQUARES);
        let style = write(&dir, "style.json", r#"{"opacity": 0.25, "extruded": true}"#);
        let summary = describe(&gj, "choropleth", Some(&style)).unwrap();
        assert_eq!(summary.primitive, "extruded-polygon");
        assert_eq!(summary.items, 2);
        assert_eq!(summary.opacity, 0.25);
        assert_eq!(summary.layer_id, "layer-1");
    }

    #[test]
    fn operations_parse_with_config_defaults() {
        let mut config = CliConfig::default();
        config.buffer.units = DistanceUnits::Miles;
        let mut a = args("buffer", PathBuf::from("x.geojson"));
        assert!(parse_operation(&a, &config).is_err(), "distance is required");

        a.distance = Some(2.0);
        let Operation::Buffer(p) = parse_operation(&a, &config).unwrap() else {
            panic!("expected buffer");
        };
        assert_eq!(p.units, DistanceUnits::Miles);
        assert_eq!(p.steps, 64);

        a.distance = Some(-1.0);
        assert!(parse_operation(&a, &config).is_err());

        let mut v = args("voronoi", PathBuf::from("x.geojson"));
        v.bbox = Some("0,0,10,5".into());
        let Operation::Voronoi(params) = parse_operation(&v, &config).unwrap() else {
            panic!("expected voronoi");
        };
        assert_eq!(params.bbox, Some(BoundingBox::new(0.0, 0.0, 10.0, 5.0)));
        assert!(parse_operation(&args("explode", PathBuf::new()), &config).is_err());
    }

    #[test]
    fn bbox_must_be_four_ordered_numbers() {
        assert!(parse_bbox("0,0,1").is_err());
        assert!(parse_bbox("0,0,x,1").is_err());
        assert!(parse_bbox("5,0,1,1").is_err());
        assert!(parse_bbox(" 0, 0, 1, 1 ").is_ok());
    }

    #[test]
    fn analyze_reads_target_from_disk() {
        let dir = TempDir::new().unwrap();
        let gj = write(&dir, "squares.geojson", SQUARES);
        let mut a = args("intersection", gj.clone());
        let cancel = CancellationToken::new();
        assert!(analyze(&a, &CliConfig::default(), &cancel).is_err(), "target is required");

        a.target = Some(gj);
        let out = analyze(&a, &CliConfig::default(), &cancel).unwrap();
        // every square meets itself and its neighbour
        assert_eq!(out.collection.len(), 4);
        assert_eq!(out.skipped, 0);
    }

    #[test]
    fn export_names_layers_after_files() {
        let dir = TempDir::new().unwrap();
        let gj = write(&dir, "squares.geojson", SQUARES);
        let csv = write(&dir, "pts.csv", "lat,lng,name,value\n48.85,2.35,Paris,10\n");
        let text = export_csv(&[gj, csv]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "geometry_type,layer,name,value,longitude,latitude");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("Polygon,squares,a,1,"));
        assert_eq!(lines[3], "Point,pts,Paris,10,2.35,48.85");
    }

    #[test]
    fn output_respects_overwrite_setting() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "out.geojson", "old");
        let keep = ExportConfig { overwrite: false };
        assert!(write_output(Some(&path), "new", &keep).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        write_output(Some(&path), "new", &ExportConfig::default()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }
}
