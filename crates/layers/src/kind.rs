//! Visualization kinds

use geolens_algorithms::Shape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a layer draws.
///
/// Parsing is total: names that match no kind become [`LayerKind::Unknown`],
/// which renders through the scatter fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayerKind {
    Scatterplot,
    Polygon,
    Line,
    Heatmap,
    Grid,
    Hexagon,
    Contour,
    Icon,
    Text,
    ScreenGrid,
    Trip,
    /// Extruded 3D polygons
    Extruded,
    Unknown(String),
}

impl LayerKind {
    pub const KNOWN: &'static [LayerKind] = &[
        LayerKind::Scatterplot,
        LayerKind::Polygon,
        LayerKind::Line,
        LayerKind::Heatmap,
        LayerKind::Grid,
        LayerKind::Hexagon,
        LayerKind::Contour,
        LayerKind::Icon,
        LayerKind::Text,
        LayerKind::ScreenGrid,
        LayerKind::Trip,
        LayerKind::Extruded,
    ];

    /// Canonical name, as written in layer definitions.
    pub fn as_str(&self) -> &str {
        match self {
            LayerKind::Scatterplot => "point",
            LayerKind::Polygon => "polygon",
            LayerKind::Line => "line",
            LayerKind::Heatmap => "heatmap",
            LayerKind::Grid => "grid",
            LayerKind::Hexagon => "hexagon",
            LayerKind::Contour => "contour",
            LayerKind::Icon => "icon",
            LayerKind::Text => "text",
            LayerKind::ScreenGrid => "screenGrid",
            LayerKind::Trip => "trip",
            LayerKind::Extruded => "3d",
            LayerKind::Unknown(name) => name,
        }
    }

    /// Geometry the kind's renderer consumes.
    pub fn shape(&self) -> Shape {
        match self {
            LayerKind::Polygon | LayerKind::Extruded => Shape::Polygon,
            LayerKind::Line => Shape::Line,
            LayerKind::Trip => Shape::Path,
            _ => Shape::Point,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, LayerKind::Unknown(_))
    }
}

impl FromStr for LayerKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "point" | "scatterplot" | "scatter" => LayerKind::Scatterplot,
            "polygon" | "choropleth" | "geojson" => LayerKind::Polygon,
            "line" | "arc" => LayerKind::Line,
            "heatmap" => LayerKind::Heatmap,
            "grid" => LayerKind::Grid,
            "hexagon" => LayerKind::Hexagon,
            "contour" => LayerKind::Contour,
            "icon" => LayerKind::Icon,
            "text" => LayerKind::Text,
            "screengrid" => LayerKind::ScreenGrid,
            "trip" | "trips" | "trajectory" => LayerKind::Trip,
            "3d" | "polygon3d" | "extruded" => LayerKind::Extruded,
            _ => LayerKind::Unknown(s.to_string()),
        };
        Ok(kind)
    }
}

impl From<String> for LayerKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for LayerKind {
    fn from(s: &str) -> Self {
        LayerKind::from(s.to_string())
    }
}

impl From<LayerKind> for String {
    fn from(kind: LayerKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
