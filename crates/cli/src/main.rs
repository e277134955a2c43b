//! GeoLens CLI - map-layer normalization and spatial analysis

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geolens_algorithms::normalize::Shape;
use geolens_algorithms::CancellationToken;
use geolens_core::io::write_geojson;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use commands::AnalyzeArgs;
use config::CliConfig;

#[derive(Parser)]
#[command(name = "geolens")]
#[command(author, version, about = "Map-layer normalization and spatial analysis", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with analysis, buffer and export settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feature count, geometry types, total area and length
    Info {
        /// Input GeoJSON or CSV file
        input: PathBuf,
    },
    /// Check a GeoJSON document (advisory)
    Validate {
        /// Input GeoJSON file
        input: PathBuf,
    },
    /// Convert input into points, lines, polygons or paths
    Normalize {
        /// Input GeoJSON or CSV file
        input: PathBuf,
        /// Target shape: point, line, polygon, path
        #[arg(short, long, default_value = "point")]
        shape: String,
        /// Output GeoJSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build a layer descriptor and print its summary
    Describe {
        /// Input GeoJSON or CSV file
        input: PathBuf,
        /// Layer kind, e.g. point, polygon, heatmap, trip
        #[arg(short, long, default_value = "point")]
        kind: String,
        /// JSON style document
        #[arg(long)]
        style: Option<PathBuf>,
    },
    /// Run a spatial analysis operation
    Analyze {
        /// buffer, centroid, intersection, union, difference, voronoi
        operation: String,
        /// Source GeoJSON or CSV file
        source: PathBuf,
        /// Target file for intersection and difference
        #[arg(short, long)]
        target: Option<PathBuf>,
        /// Buffer distance
        #[arg(short, long)]
        distance: Option<f64>,
        /// Buffer units: meters, kilometers, miles, feet, degrees
        #[arg(short, long)]
        units: Option<String>,
        /// Vertices per buffer circle
        #[arg(long)]
        steps: Option<usize>,
        /// Voronoi extent as minx,miny,maxx,maxy
        #[arg(long)]
        bbox: Option<String>,
        /// Output GeoJSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Flatten layers into geometry_type,layer,name,value,longitude,latitude
    ExportCsv {
        /// Input GeoJSON or CSV files, one layer each
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output CSV file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Info { input } => print_json(&commands::info(&input)?)?,

        Commands::Validate { input } => {
            let report = commands::validate(&input)?;
            if report.is_valid() {
                info!(warnings = report.warnings.len(), "document is valid");
            } else {
                warn!(errors = report.errors.len(), "document has errors");
            }
            print_json(&report)?;
        }

        Commands::Normalize { input, shape, output } => {
            let shape: Shape = shape.parse()?;
            let fc = commands::normalize_file(&input, shape)?;
            info!(features = fc.len(), "normalized");
            commands::write_output(output.as_deref(), &write_geojson(&fc)?, &config.export)?;
        }

        Commands::Describe { input, kind, style } => {
            print_json(&commands::describe(&input, &kind, style.as_deref())?)?;
        }

        Commands::Analyze {
            operation,
            source,
            target,
            distance,
            units,
            steps,
            bbox,
            output,
        } => {
            let args = AnalyzeArgs { operation, source, target, distance, units, steps, bbox };
            let pb = spinner(&format!("Running {}...", args.operation));
            let start = Instant::now();
            let result = commands::analyze(&args, &config, &CancellationToken::new());
            pb.finish_and_clear();
            let out = result?;
            info!(
                features = out.collection.len(),
                skipped = out.skipped,
                "{} done in {:.2?}",
                args.operation,
                start.elapsed()
            );
            commands::write_output(output.as_deref(), &write_geojson(&out.collection)?, &config.export)?;
        }

        Commands::ExportCsv { inputs, output } => {
            let text = commands::export_csv(&inputs)?;
            commands::write_output(output.as_deref(), text.trim_end(), &config.export)?;
        }
    }

    Ok(())
}
