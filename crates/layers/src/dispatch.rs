//! Render layer dispatcher
//!
//! One arm per [`LayerKind`]; every arm composes the normalizer output for
//! the kind, the encoder and the kind's own parameters. `Unknown` kinds get a
//! grey scatter instead of an error.

use crate::descriptor::{RenderableDescriptor, StyleParams};
use crate::encoding::Encoder;
use crate::filter;
use crate::format::format_value;
use crate::kind::LayerKind;
use crate::layer::Layer;
use crate::style::StyleConfig;
use geolens_algorithms::normalize::{normalize, trips};
use geolens_colormap::{Rgba, MID_GRAY};
use geolens_core::{Feature, FieldSource, LayerData};
use tracing::{debug, warn};

/// Build the descriptor of `layer`, or `None` when it holds no data.
pub fn generate(layer: &Layer) -> Option<RenderableDescriptor> {
    let data = layer.data.as_ref()?;
    let filters = layer.all_filters();
    let data = filter::apply(&filters, data);

    let (features, timestamps) = geometry_for(&layer.kind, &data);
    if features.len() < data.len() {
        debug!(
            layer = %layer.id,
            kept = features.len(),
            total = data.len(),
            "some items could not be normalized"
        );
    }

    let style = &layer.style;
    let encoder = Encoder::new(style, &features);
    let mut colors: Vec<Rgba> = features.iter().map(|f| encoder.color_of(f)).collect();
    let radii = features.iter().map(|f| encoder.radius_of(f)).collect();
    let elevations = features.iter().map(|f| encoder.elevation_of(f)).collect();

    let fallback = layer.kind.is_unknown();
    let (params, legend) = if fallback {
        warn!(layer = %layer.id, kind = %layer.kind, "unknown layer kind, drawing as scatter");
        colors.iter_mut().for_each(|c| *c = MID_GRAY);
        (StyleParams::Scatter { line_width: style.line_width }, Vec::new())
    } else {
        (params_for(&layer.kind, style, &encoder, &features, timestamps), encoder.legend())
    };

    Some(RenderableDescriptor {
        layer_id: layer.id.clone(),
        features,
        colors,
        radii,
        elevations,
        opacity: style.opacity,
        params,
        legend,
        fallback,
        tooltip_fields: style.tooltip_fields.clone(),
    })
}

fn geometry_for(kind: &LayerKind, data: &LayerData) -> (Vec<Feature>, Vec<Vec<f64>>) {
    match kind {
        LayerKind::Trip => trips(data)
            .into_iter()
            .map(|t| {
                let stamps = t.timestamps.clone();
                (t.into_feature(), stamps)
            })
            .unzip(),
        other => (normalize(data, other.shape()), Vec::new()),
    }
}

fn colors_of(style: &StyleConfig) -> Vec<Rgba> {
    style.color_range.iter().map(|c| c.to_rgba()).collect()
}

fn params_for(
    kind: &LayerKind,
    style: &StyleConfig,
    encoder: &Encoder<'_>,
    features: &[Feature],
    timestamps: Vec<Vec<f64>>,
) -> StyleParams {
    match kind {
        LayerKind::Scatterplot | LayerKind::Unknown(_) => StyleParams::Scatter { line_width: style.line_width },
        LayerKind::Polygon => StyleParams::Polygon {
            line_width: style.line_width,
            extruded: style.extruded,
        },
        LayerKind::Extruded => StyleParams::Polygon {
            line_width: style.line_width,
            extruded: true,
        },
        LayerKind::Line => StyleParams::Path { width: style.line_width },
        LayerKind::Heatmap => StyleParams::Heatmap {
            radius_pixels: style.radius,
            intensity: style.intensity,
            threshold: style.threshold,
            color_range: colors_of(style),
        },
        LayerKind::Grid => StyleParams::Grid {
            cell_size: style.cell_size,
            coverage: style.coverage,
            elevation_range: style.elevation_range,
            extruded: style.extruded,
            color_range: colors_of(style),
        },
        LayerKind::Hexagon => StyleParams::Hexagon {
            radius: style.cell_size,
            coverage: style.coverage,
            elevation_range: style.elevation_range,
            extruded: style.extruded,
            color_range: colors_of(style),
        },
        LayerKind::Contour => {
            // Evenly spaced thresholds over the colour field's range, one band
            // per colour stop.
            let range = encoder.color_stats();
            let stops = colors_of(style);
            let step = range.span() / stops.len().max(1) as f64;
            let contours = stops
                .into_iter()
                .enumerate()
                .map(|(i, c)| (range.min + step * i as f64, c))
                .collect();
            StyleParams::Contour { cell_size: style.cell_size, contours }
        }
        LayerKind::Icon => StyleParams::Icon { size: style.icon_size },
        LayerKind::Text => StyleParams::Text {
            size: style.text_size,
            labels: features
                .iter()
                .map(|f| {
                    style
                        .text_field
                        .as_deref()
                        .and_then(|field| f.field(field))
                        .map(format_value)
                        .unwrap_or_default()
                })
                .collect(),
        },
        LayerKind::ScreenGrid => StyleParams::ScreenGrid {
            cell_size_pixels: style.cell_size,
            color_range: colors_of(style),
        },
        LayerKind::Trip => StyleParams::Trips {
            width: style.line_width,
            trail_length: style.trail_length,
            timestamps,
        },
    }
}
