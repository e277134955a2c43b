//! Legend bins for data-driven colour styling.

use serde::Serialize;

use crate::classify::Breaks;
use crate::color::{range_index, Color, Rgba};
use crate::stats::FieldRange;

/// One legend row: values in `[lower, upper]` drawn with `color`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub lower: f64,
    pub upper: f64,
    pub color: Rgba,
}

/// Build legend rows for a colour range.
///
/// Without `breaks` the field range is cut into `range.len()` equal bins, which
/// matches linear colour indexing. With `breaks` each class gets one row.
pub fn legend(range: &[Color], stats: FieldRange, breaks: Option<&Breaks>, reverse: bool) -> Vec<LegendEntry> {
    let n = range.len();
    if n == 0 {
        return Vec::new();
    }

    let bounds: Vec<f64> = match breaks {
        Some(b) => b.bounds().to_vec(),
        None => (0..=n)
            .map(|i| stats.min + stats.span() * i as f64 / n as f64)
            .collect(),
    };
    let classes = bounds.len() - 1;

    bounds
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let mut t = (i as f64 + 0.5) / classes as f64;
            if reverse {
                t = 1.0 - t;
            }
            LegendEntry {
                lower: w[0],
                upper: w[1],
                color: range[range_index(t, n)].to_rgba(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassificationMethod;

    fn ramp() -> Vec<Color> {
        vec![Color::rgb(0, 0, 0), Color::rgb(100, 100, 100), Color::rgb(200, 200, 200)]
    }

    #[test]
    fn equal_bins_follow_range() {
        let rows = legend(&ramp(), FieldRange::new(0.0, 30.0), None, false);
        assert_eq!(rows.len(), 3);
        assert_eq!((rows[0].lower, rows[0].upper), (0.0, 10.0));
        assert_eq!(rows[0].color, [0, 0, 0, 255]);
        assert_eq!(rows[2].color, [200, 200, 200, 255]);
    }

    #[test]
    fn reversed_bins() {
        let rows = legend(&ramp(), FieldRange::new(0.0, 30.0), None, true);
        assert_eq!(rows[0].color, [200, 200, 200, 255]);
        assert_eq!(rows[2].color, [0, 0, 0, 255]);
    }

    #[test]
    fn bins_from_breaks() {
        let breaks = Breaks::compute(&[1.0, 2.0, 3.0, 4.0], ClassificationMethod::Quantile, 2).unwrap();
        let rows = legend(&ramp(), FieldRange::new(1.0, 4.0), Some(&breaks), false);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].upper, 4.0);
    }
}
