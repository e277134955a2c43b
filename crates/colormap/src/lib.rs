//! # GeoLens Colormap
//!
//! Colours, colour scales and the numeric groundwork for data-driven styling.
//!
//! - [`Color`]: RGB or RGBA value as written in style documents
//! - [`ColorScheme`] presets and the multi-stop interpolation engine ([`evaluate`], [`sample`])
//! - [`min_max`]: field range over features or records, with the `{0, 1}` sentinel
//! - [`Breaks`]: quantile, equal-interval and Jenks-style class breaks
//! - [`legend`]: value bins paired with their colours
//!
//! ## Usage
//!
//! ```ignore
//! use geolens_colormap::{min_max, ColorScaleKind};
//!
//! let range = ColorScaleKind::Sequential.default_range();
//! let stats = min_max("population", &features);
//! ```

mod classify;
mod color;
mod legend;
mod scheme;
mod stats;

pub use classify::{Breaks, ClassificationMethod};
pub use color::{range_index, Color, Rgba, MID_GRAY};
pub use legend::{legend, LegendEntry};
pub use scheme::{evaluate, sample, ColorScaleKind, ColorScheme, ColorStop};
pub use stats::{min_max, numeric_values, FieldRange};
