//! Colour values.

use serde::{Deserialize, Serialize};

/// Render-ready colour, always with alpha.
pub type Rgba = [u8; 4];

/// Fallback colour for layers of an unrecognized kind.
pub const MID_GRAY: Rgba = [128, 128, 128, 255];

/// An RGB colour with optional alpha, as written in style documents.
///
/// Serializes as `[r, g, b]` or `[r, g, b, a]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: Option<u8>,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: None }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a: Some(a) }
    }

    /// Append full opacity unless the colour already carries an alpha.
    pub const fn to_rgba(self) -> Rgba {
        let a = match self.a {
            Some(a) => a,
            None => 255,
        };
        [self.r, self.g, self.b, a]
    }
}

impl From<Rgba> for Color {
    fn from(c: Rgba) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

impl TryFrom<Vec<u8>> for Color {
    type Error = String;

    fn try_from(v: Vec<u8>) -> Result<Self, Self::Error> {
        match v.as_slice() {
            [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
            other => Err(format!("colour needs 3 or 4 components, got {}", other.len())),
        }
    }
}

impl From<Color> for Vec<u8> {
    fn from(c: Color) -> Self {
        match c.a {
            Some(a) => vec![c.r, c.g, c.b, a],
            None => vec![c.r, c.g, c.b],
        }
    }
}

/// Index into a colour range of `len` entries for a normalized `t`.
///
/// `floor(t * len)` clamped to `len - 1`; `t` outside `[0, 1]` is clamped first.
pub fn range_index(t: f64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    ((t * len as f64).floor() as usize).min(len - 1)
}
