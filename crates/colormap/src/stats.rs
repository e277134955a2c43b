//! Field statistics over features or records.

use geolens_core::FieldSource;
use serde::{Deserialize, Serialize};

/// Value range of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    /// Returned when a field has no usable spread.
    pub const SENTINEL: Self = Self { min: 0.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// `(value - min) / (max - min)` clamped to `[0, 1]`.
    ///
    /// Never divides by zero: ranges from [`min_max`] always have `max > min`.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if !value.is_finite() || span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

impl Default for FieldRange {
    fn default() -> Self {
        Self::SENTINEL
    }
}

/// Finite numeric values of `field` across `items`, in input order.
pub fn numeric_values<'a, S, I>(field: &str, items: I) -> Vec<f64>
where
    S: FieldSource + 'a,
    I: IntoIterator<Item = &'a S>,
{
    items
        .into_iter()
        .filter_map(|item| item.numeric_field(field))
        .collect()
}

/// Minimum and maximum of `field`.
///
/// Non-numeric and missing values are ignored. With no valid value, or when
/// every valid value is equal, the result is exactly `{min: 0, max: 1}`.
pub fn min_max<'a, S, I>(field: &str, items: I) -> FieldRange
where
    S: FieldSource + 'a,
    I: IntoIterator<Item = &'a S>,
{
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for item in items {
        if let Some(v) = item.numeric_field(field) {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
    }

    if !min.is_finite() || !max.is_finite() || min == max {
        return FieldRange::SENTINEL;
    }
    FieldRange { min, max }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolens_core::{PropertyValue as V, TabularRecord};

    fn rows(values: &[V]) -> Vec<TabularRecord> {
        values
            .iter()
            .map(|v| TabularRecord::new().with("value", v.clone()))
            .collect()
    }

    #[test]
    fn ignores_non_numeric_entries() {
        let data = rows(&[V::from(5.0), V::from("x"), V::from(15.0)]);
        assert_eq!(min_max("value", &data), FieldRange::new(5.0, 15.0));
    }

    #[test]
    fn sentinel_when_nothing_numeric() {
        let data = rows(&[V::from("a"), V::Null]);
        assert_eq!(min_max("value", &data), FieldRange::SENTINEL);
        assert_eq!(min_max("missing", &data), FieldRange::SENTINEL);
        let empty: Vec<TabularRecord> = Vec::new();
        assert_eq!(min_max("value", &empty), FieldRange::SENTINEL);
    }

    #[test]
    fn sentinel_when_all_values_equal() {
        let data = rows(&[V::from(7.0), V::from(7.0), V::from("7")]);
        assert_eq!(min_max("value", &data), FieldRange { min: 0.0, max: 1.0 });
    }

    #[test]
    fn numeric_strings_count() {
        let data = rows(&[V::from("2"), V::from(10.0)]);
        assert_eq!(min_max("value", &data), FieldRange::new(2.0, 10.0));
    }

    #[test]
    fn normalize_clamps() {
        let r = FieldRange::new(0.0, 100.0);
        assert_eq!(r.normalize(50.0), 0.5);
        assert_eq!(r.normalize(-10.0), 0.0);
        assert_eq!(r.normalize(500.0), 1.0);
        assert_eq!(r.normalize(f64::NAN), 0.0);
    }
}
