//! Render-ready layer descriptors
//!
//! A descriptor is what the rendering backend consumes: normalized geometry,
//! one resolved colour / radius / elevation per item, and the parameters of
//! the layer's primitive. It is rebuilt from scratch whenever the layer's
//! kind, data or style change.

use crate::format::tooltip;
use geolens_colormap::{LegendEntry, Rgba};
use geolens_core::Feature;
use serde::Serialize;

/// Primitive-specific parameters; each variant carries only what it uses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "primitive", rename_all = "camelCase")]
pub enum StyleParams {
    Scatter {
        line_width: f64,
    },
    Polygon {
        line_width: f64,
        extruded: bool,
    },
    Path {
        width: f64,
    },
    Heatmap {
        radius_pixels: f64,
        intensity: f64,
        threshold: f64,
        color_range: Vec<Rgba>,
    },
    Grid {
        cell_size: f64,
        coverage: f64,
        elevation_range: [f64; 2],
        extruded: bool,
        color_range: Vec<Rgba>,
    },
    Hexagon {
        radius: f64,
        coverage: f64,
        elevation_range: [f64; 2],
        extruded: bool,
        color_range: Vec<Rgba>,
    },
    Contour {
        cell_size: f64,
        /// `(threshold, colour)` bands
        contours: Vec<(f64, Rgba)>,
    },
    Icon {
        size: f64,
    },
    Text {
        size: f64,
        labels: Vec<String>,
    },
    ScreenGrid {
        cell_size_pixels: f64,
        color_range: Vec<Rgba>,
    },
    Trips {
        width: f64,
        trail_length: f64,
        /// One timestamp sequence per path, parallel to its vertices
        timestamps: Vec<Vec<f64>>,
    },
}

impl StyleParams {
    pub fn primitive(&self) -> &'static str {
        match self {
            StyleParams::Scatter { .. } => "scatter",
            StyleParams::Polygon { extruded: true, .. } => "extruded-polygon",
            StyleParams::Polygon { .. } => "polygon",
            StyleParams::Path { .. } => "path",
            StyleParams::Heatmap { .. } => "heatmap",
            StyleParams::Grid { .. } => "grid",
            StyleParams::Hexagon { .. } => "hexagon",
            StyleParams::Contour { .. } => "contour",
            StyleParams::Icon { .. } => "icon",
            StyleParams::Text { .. } => "text",
            StyleParams::ScreenGrid { .. } => "screen-grid",
            StyleParams::Trips { .. } => "trips",
        }
    }
}

/// Fully resolved representation of one layer
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableDescriptor {
    pub layer_id: String,
    pub features: Vec<Feature>,
    pub colors: Vec<Rgba>,
    pub radii: Vec<f64>,
    pub elevations: Vec<f64>,
    pub opacity: f64,
    pub params: StyleParams,
    /// Value bins of the colour field, empty without one
    pub legend: Vec<LegendEntry>,
    /// Set when the layer kind was not recognized
    pub fallback: bool,
    pub(crate) tooltip_fields: Vec<String>,
}

impl RenderableDescriptor {
    pub fn primitive(&self) -> &'static str {
        self.params.primitive()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Tooltip text of item `index`, built from the style's tooltip fields.
    pub fn tooltip(&self, index: usize) -> Option<String> {
        tooltip(&self.tooltip_fields, self.features.get(index)?)
    }

    pub fn summary(&self) -> DescriptorSummary {
        DescriptorSummary {
            layer_id: self.layer_id.clone(),
            primitive: self.primitive(),
            items: self.len(),
            opacity: self.opacity,
            fallback: self.fallback,
            params: self.params.clone(),
            legend: self.legend.clone(),
        }
    }
}

/// Serializable overview of a descriptor, without the geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorSummary {
    pub layer_id: String,
    pub primitive: &'static str,
    pub items: usize,
    pub opacity: f64,
    pub fallback: bool,
    pub params: StyleParams,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub legend: Vec<LegendEntry>,
}
