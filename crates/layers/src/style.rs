//! Declarative layer styling

use crate::filter::Filter;
use crate::kind::LayerKind;
use geolens_colormap::{ClassificationMethod, Color, ColorScaleKind, ColorScheme, sample};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a layer is drawn.
///
/// When `color_field` is unset `color` is used for every item; once it is set
/// `color_range`, `color_scale` and `reverse_color_scale` take over and `color`
/// only serves as the fallback for items lacking a usable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleConfig {
    /// In `[0, 1]`
    pub opacity: f64,
    pub color: Color,
    pub color_field: Option<String>,
    pub color_scale: ColorScaleKind,
    /// At least two stops
    pub color_range: Vec<Color>,
    pub reverse_color_scale: bool,
    pub size_field: Option<String>,
    pub radius: f64,
    pub elevation_field: Option<String>,
    pub elevation_scale: f64,
    pub line_width: f64,
    pub filters: Vec<Filter>,
    pub tooltip_fields: Vec<String>,
    pub classification_method: Option<ClassificationMethod>,

    // Aggregation and kind-specific parameters
    pub cell_size: f64,
    pub coverage: f64,
    pub elevation_range: [f64; 2],
    pub extruded: bool,
    pub trail_length: f64,
    pub intensity: f64,
    pub threshold: f64,
    pub text_field: Option<String>,
    pub text_size: f64,
    pub icon_size: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            opacity: 0.8,
            color: Color::rgb(255, 140, 0),
            color_field: None,
            color_scale: ColorScaleKind::Sequential,
            color_range: ColorScaleKind::Sequential.default_range(),
            reverse_color_scale: false,
            size_field: None,
            radius: 5.0,
            elevation_field: None,
            elevation_scale: 1.0,
            line_width: 2.0,
            filters: Vec::new(),
            tooltip_fields: Vec::new(),
            classification_method: None,
            cell_size: 1000.0,
            coverage: 0.9,
            elevation_range: [0.0, 3000.0],
            extruded: false,
            trail_length: 180.0,
            intensity: 1.0,
            threshold: 0.05,
            text_field: None,
            text_size: 12.0,
            icon_size: 24.0,
        }
    }
}

impl StyleConfig {
    /// Clamp opacity into `[0, 1]` and replace a colour range with fewer than
    /// two stops by the scale's default range.
    pub fn sanitized(mut self) -> Self {
        self.opacity = if self.opacity.is_finite() { self.opacity.clamp(0.0, 1.0) } else { 1.0 };
        if self.color_range.len() < 2 {
            self.color_range = self.color_scale.default_range();
        }
        self
    }

    /// Shallow merge of a partial JSON style: keys present in `patch` replace
    /// the current values, `null` clears optional fields.
    pub fn merged(&self, patch: &Value) -> Result<Self, serde_json::Error> {
        let mut base = serde_json::to_value(self)?;
        if let (Value::Object(target), Value::Object(source)) = (&mut base, patch) {
            for (k, v) in source {
                target.insert(k.clone(), v.clone());
            }
        } else if !patch.is_null() {
            return Err(serde::de::Error::custom("style patch must be a JSON object"));
        }
        Ok(serde_json::from_value::<StyleConfig>(base)?.sanitized())
    }
}

/// Starting style for a new layer of `kind`.
pub fn default_style_for(kind: &LayerKind) -> StyleConfig {
    let base = StyleConfig::default();
    match kind {
        LayerKind::Scatterplot | LayerKind::Unknown(_) => StyleConfig { radius: 5.0, ..base },
        LayerKind::Polygon => StyleConfig {
            opacity: 0.6,
            color: Color::rgb(70, 130, 180),
            line_width: 1.0,
            ..base
        },
        LayerKind::Line => StyleConfig {
            color: Color::rgb(0, 128, 255),
            line_width: 3.0,
            ..base
        },
        LayerKind::Heatmap => StyleConfig {
            opacity: 1.0,
            radius: 30.0,
            color_range: sample(ColorScheme::Reds, 6),
            ..base
        },
        LayerKind::Grid | LayerKind::Hexagon => StyleConfig {
            cell_size: if matches!(kind, LayerKind::Hexagon) { 1000.0 } else { 2000.0 },
            extruded: true,
            elevation_scale: 4.0,
            ..base
        },
        LayerKind::Contour => StyleConfig {
            cell_size: 500.0,
            color_range: sample(ColorScheme::Terrain, 6),
            ..base
        },
        LayerKind::Icon => StyleConfig { icon_size: 24.0, ..base },
        LayerKind::Text => StyleConfig {
            color: Color::rgb(33, 33, 33),
            text_size: 14.0,
            ..base
        },
        LayerKind::ScreenGrid => StyleConfig {
            cell_size: 20.0,
            opacity: 0.7,
            ..base
        },
        LayerKind::Trip => StyleConfig {
            color: Color::rgb(253, 128, 93),
            line_width: 4.0,
            trail_length: 180.0,
            ..base
        },
        LayerKind::Extruded => StyleConfig {
            extruded: true,
            elevation_scale: 10.0,
            color: Color::rgb(160, 160, 180),
            ..base
        },
    }
}
