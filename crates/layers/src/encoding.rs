//! Visual encoding resolver
//!
//! Maps an item plus a [`StyleConfig`] to a colour, radius and elevation. All
//! three are total: missing or non-numeric values fall back to the fixed
//! colour, the fixed radius and zero elevation.

use crate::style::StyleConfig;
use geolens_colormap::{
    legend, min_max, numeric_values, range_index, Breaks, ClassificationMethod, FieldRange, LegendEntry, Rgba,
};
use geolens_core::FieldSource;

/// Encoding functions closed over a style and the statistics of its data.
#[derive(Debug, Clone)]
pub struct Encoder<'s> {
    style: &'s StyleConfig,
    color_range: FieldRange,
    size_range: FieldRange,
    breaks: Option<Breaks>,
}

impl<'s> Encoder<'s> {
    /// Compute field statistics over `items` for the style's data fields.
    pub fn new<'a, S>(style: &'s StyleConfig, items: &'a [S]) -> Self
    where
        S: FieldSource + 'a,
    {
        let color_range = style
            .color_field
            .as_deref()
            .map(|f| min_max(f, items))
            .unwrap_or_default();
        let size_range = style
            .size_field
            .as_deref()
            .map(|f| min_max(f, items))
            .unwrap_or_default();

        // Equal intervals coincide with the linear formula, so only quantile
        // and Jenks need explicit breaks.
        let breaks = match (style.classification_method, style.color_field.as_deref()) {
            (Some(method), Some(field)) if method != ClassificationMethod::Equal => {
                Breaks::compute(&numeric_values(field, items), method, style.color_range.len())
            }
            _ => None,
        };

        Self { style, color_range, size_range, breaks }
    }

    /// Encoder with explicit statistics.
    pub fn with_ranges(style: &'s StyleConfig, color_range: FieldRange, size_range: FieldRange) -> Self {
        Self { style, color_range, size_range, breaks: None }
    }

    pub fn color_stats(&self) -> FieldRange {
        self.color_range
    }

    pub fn breaks(&self) -> Option<&Breaks> {
        self.breaks.as_ref()
    }

    /// Legend rows for data-driven colour; empty for a fixed colour.
    pub fn legend(&self) -> Vec<LegendEntry> {
        if self.style.color_field.is_none() {
            return Vec::new();
        }
        legend(
            &self.style.color_range,
            self.color_range,
            self.breaks.as_ref(),
            self.style.reverse_color_scale,
        )
    }

    pub fn color_of(&self, item: &impl FieldSource) -> Rgba {
        let fixed = self.style.color.to_rgba();
        let Some(field) = self.style.color_field.as_deref() else {
            return fixed;
        };
        let Some(value) = item.numeric_field(field) else {
            return fixed;
        };
        let range = &self.style.color_range;
        if range.is_empty() {
            return fixed;
        }

        let index = match &self.breaks {
            Some(b) => {
                let class = b.class_of(value).min(range.len() - 1);
                if self.style.reverse_color_scale {
                    range.len() - 1 - class
                } else {
                    class
                }
            }
            None => {
                let mut t = self.color_range.normalize(value);
                if self.style.reverse_color_scale {
                    t = 1.0 - t;
                }
                range_index(t, range.len())
            }
        };
        range[index].to_rgba()
    }

    /// `radius * (0.1 + 0.9 * t)`, so small values keep 10% of the radius.
    pub fn radius_of(&self, item: &impl FieldSource) -> f64 {
        let radius = self.style.radius;
        let Some(field) = self.style.size_field.as_deref() else {
            return radius;
        };
        match item.numeric_field(field) {
            Some(value) => radius * (0.1 + self.size_range.normalize(value) * 0.9),
            None => radius,
        }
    }

    pub fn elevation_of(&self, item: &impl FieldSource) -> f64 {
        let Some(field) = self.style.elevation_field.as_deref() else {
            return 0.0;
        };
        match item.numeric_field(field) {
            Some(value) => {
                let e = value * self.style.elevation_scale;
                if e.is_finite() {
                    e
                } else {
                    0.0
                }
            }
            None => 0.0,
        }
    }
}
