//! Colour schemes and multi-stop interpolation engine.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Color,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Color::rgb(r, g, b),
        }
    }
}

/// How values relate to colours in a style's `colorRange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScaleKind {
    /// Low to high
    #[default]
    Sequential,
    /// Two extremes around a neutral midpoint
    Diverging,
    /// Unordered classes
    Categorical,
}

impl ColorScaleKind {
    /// Preset used when a style does not name its own range.
    pub fn default_scheme(&self) -> ColorScheme {
        match self {
            Self::Sequential => ColorScheme::Viridis,
            Self::Diverging => ColorScheme::RedBlue,
            Self::Categorical => ColorScheme::Qualitative,
        }
    }

    /// Six stops sampled from the default scheme (the full palette for categorical).
    pub fn default_range(&self) -> Vec<Color> {
        match self {
            Self::Categorical => QUALITATIVE_PALETTE.to_vec(),
            _ => sample(self.default_scheme(), 6),
        }
    }
}

/// Available color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    /// Dark purple -> Teal -> Yellow
    Viridis,
    /// White -> Dark blue
    Blues,
    /// White -> Dark red
    Reds,
    /// White -> Dark green
    Greens,
    /// Green -> Yellow -> Brown -> White (elevation)
    Terrain,
    /// White -> Cyan -> Blue (water depth/moisture)
    Water,
    /// Yellow -> Orange -> Red -> Purple (counts, densities)
    Accumulation,
    /// Red -> White -> Blue
    RedBlue,
    /// Blue -> White -> Red
    BlueWhiteRed,
    /// Black -> White
    Grayscale,
    /// 10 distinct classes
    Qualitative,
}

impl ColorScheme {
    /// All available schemes, useful for UI combo boxes.
    pub const ALL: &[ColorScheme] = &[
        Self::Viridis,
        Self::Blues,
        Self::Reds,
        Self::Greens,
        Self::Terrain,
        Self::Water,
        Self::Accumulation,
        Self::RedBlue,
        Self::BlueWhiteRed,
        Self::Grayscale,
        Self::Qualitative,
    ];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Viridis => "Viridis",
            Self::Blues => "Blues",
            Self::Reds => "Reds",
            Self::Greens => "Greens",
            Self::Terrain => "Terrain",
            Self::Water => "Water",
            Self::Accumulation => "Accumulation",
            Self::RedBlue => "Red-Blue",
            Self::BlueWhiteRed => "Blue-White-Red",
            Self::Grayscale => "Grayscale",
            Self::Qualitative => "Qualitative",
        }
    }

    pub fn kind(&self) -> ColorScaleKind {
        match self {
            Self::RedBlue | Self::BlueWhiteRed => ColorScaleKind::Diverging,
            Self::Qualitative => ColorScaleKind::Categorical,
            _ => ColorScaleKind::Sequential,
        }
    }
}

// ─── Color stop definitions ────────────────────────────────────────────

const VIRIDIS_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 68, 1, 84),
    ColorStop::new(0.25, 59, 82, 139),
    ColorStop::new(0.50, 33, 145, 140),
    ColorStop::new(0.75, 94, 201, 98),
    ColorStop::new(1.00, 253, 231, 37),
];

const BLUES_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 247, 251, 255),
    ColorStop::new(0.5, 107, 174, 214),
    ColorStop::new(1.0, 8, 48, 107),
];

const REDS_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 255, 245, 240),
    ColorStop::new(0.5, 251, 106, 74),
    ColorStop::new(1.0, 103, 0, 13),
];

const GREENS_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 247, 252, 245),
    ColorStop::new(0.5, 116, 196, 118),
    ColorStop::new(1.0, 0, 68, 27),
];

const TERRAIN_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 34, 139, 34),
    ColorStop::new(0.25, 144, 190, 60),
    ColorStop::new(0.50, 220, 200, 80),
    ColorStop::new(0.75, 180, 120, 60),
    ColorStop::new(1.00, 255, 255, 255),
];

const WATER_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 240, 249, 255),
    ColorStop::new(0.25, 186, 228, 250),
    ColorStop::new(0.50, 80, 180, 230),
    ColorStop::new(0.75, 30, 120, 200),
    ColorStop::new(1.00, 8, 48, 107),
];

const ACCUMULATION_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 255, 255, 212),
    ColorStop::new(0.25, 254, 217, 142),
    ColorStop::new(0.50, 254, 153, 41),
    ColorStop::new(0.75, 204, 76, 2),
    ColorStop::new(1.00, 102, 37, 6),
];

const RED_BLUE_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 178, 24, 43),
    ColorStop::new(0.25, 239, 138, 98),
    ColorStop::new(0.50, 247, 247, 247),
    ColorStop::new(0.75, 103, 169, 207),
    ColorStop::new(1.00, 33, 102, 172),
];

const BLUE_WHITE_RED_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 33, 102, 172),
    ColorStop::new(0.25, 103, 169, 207),
    ColorStop::new(0.50, 247, 247, 247),
    ColorStop::new(0.75, 239, 138, 98),
    ColorStop::new(1.00, 178, 24, 43),
];

/// Qualitative palette: 10 distinct classes.
const QUALITATIVE_PALETTE: &[Color] = &[
    Color::rgb(78, 121, 167),
    Color::rgb(242, 142, 43),
    Color::rgb(225, 87, 89),
    Color::rgb(118, 183, 178),
    Color::rgb(89, 161, 79),
    Color::rgb(237, 201, 72),
    Color::rgb(176, 122, 161),
    Color::rgb(255, 157, 167),
    Color::rgb(156, 117, 95),
    Color::rgb(186, 176, 172),
];

// ─── Interpolation engine ──────────────────────────────────────────────

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Color, c2: Color, t: f64) -> Color {
    Color::rgb(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Color {
    if t.is_nan() || t <= 0.0 {
        return stops[0].color;
    }
    if t >= 1.0 {
        return stops[stops.len() - 1].color;
    }
    for i in 1..stops.len() {
        if t <= stops[i].t {
            let ratio = (t - stops[i - 1].t) / (stops[i].t - stops[i - 1].t);
            return lerp_color(stops[i - 1].color, stops[i].color, ratio);
        }
    }
    stops[stops.len() - 1].color
}

/// Evaluate a color scheme at normalized position `t` ∈ [0, 1].
///
/// Continuous schemes interpolate between their stops. `Qualitative` maps
/// `t` onto one of its 10 discrete classes; `Grayscale` is a linear ramp.
pub fn evaluate(scheme: ColorScheme, t: f64) -> Color {
    match scheme {
        ColorScheme::Viridis => multi_stop(VIRIDIS_STOPS, t),
        ColorScheme::Blues => multi_stop(BLUES_STOPS, t),
        ColorScheme::Reds => multi_stop(REDS_STOPS, t),
        ColorScheme::Greens => multi_stop(GREENS_STOPS, t),
        ColorScheme::Terrain => multi_stop(TERRAIN_STOPS, t),
        ColorScheme::Water => multi_stop(WATER_STOPS, t),
        ColorScheme::Accumulation => multi_stop(ACCUMULATION_STOPS, t),
        ColorScheme::RedBlue => multi_stop(RED_BLUE_STOPS, t),
        ColorScheme::BlueWhiteRed => multi_stop(BLUE_WHITE_RED_STOPS, t),
        ColorScheme::Grayscale => {
            let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
            let v = (t * 255.0).round() as u8;
            Color::rgb(v, v, v)
        }
        ColorScheme::Qualitative => {
            let n = QUALITATIVE_PALETTE.len();
            QUALITATIVE_PALETTE[crate::color::range_index(t, n)]
        }
    }
}

/// `n` evenly spaced colours from a scheme, first and last at the endpoints.
pub fn sample(scheme: ColorScheme, n: usize) -> Vec<Color> {
    match n {
        0 => Vec::new(),
        1 => vec![evaluate(scheme, 0.0)],
        _ => (0..n)
            .map(|i| evaluate(scheme, i as f64 / (n - 1) as f64))
            .collect(),
    }
}
