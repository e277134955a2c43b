//! `--config` file support

use anyhow::{Context, Result};
use geolens_algorithms::vector::{BufferParams, DistanceUnits};
use geolens_algorithms::AnalysisConfig;
use serde::Deserialize;
use std::path::Path;

/// Settings read from a TOML file. Every section is optional.
///
/// ```toml
/// [analysis]
/// parallel = false
///
/// [buffer]
/// units = "miles"
/// steps = 32
///
/// [export]
/// overwrite = false
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub analysis: AnalysisConfig,
    pub buffer: BufferDefaults,
    pub export: ExportConfig,
}

/// Defaults for `analyze buffer`. The distance always comes from the command
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BufferDefaults {
    pub units: DistanceUnits,
    pub steps: usize,
}

impl Default for BufferDefaults {
    fn default() -> Self {
        let params = BufferParams::default();
        Self { units: params.units, steps: params.steps }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Replace existing output files
    pub overwrite: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }
}
