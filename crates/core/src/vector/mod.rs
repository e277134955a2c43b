//! Vector data model: features, collections and tabular records.
//!
//! Coordinates are always `(x, y) = (longitude, latitude)`.

mod feature;
mod record;
mod value;

pub use feature::{Feature, FeatureCollection, GeometryKind};
pub use record::{order_key, LayerData, TabularRecord, COORDINATE_FIELDS, ORDER_FIELDS};
pub use value::{Properties, PropertyValue};

/// Anything a named scalar field can be read from.
///
/// Implemented by [`Feature`] (properties first, then top-level members) and by
/// [`TabularRecord`].
pub trait FieldSource {
    /// Raw field value, if present.
    fn field(&self, name: &str) -> Option<&PropertyValue>;

    /// Field coerced to a finite number.
    fn numeric_field(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(PropertyValue::as_f64)
    }
}
