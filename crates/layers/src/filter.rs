//! Attribute filters applied to layer input

use geolens_core::{FeatureCollection, FieldSource, LayerData, PropertyValue, TabularRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a [`Filter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterOp::Eq => "==",
            FilterOp::Ne => "!=",
            FilterOp::Gt => ">",
            FilterOp::Lt => "<",
            FilterOp::Ge => ">=",
            FilterOp::Le => "<=",
        })
    }
}

/// `field operator value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOp,
    pub value: PropertyValue,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: FilterOp, value: impl Into<PropertyValue>) -> Self {
        Self { field: field.into(), operator, value: value.into() }
    }

    /// Numeric comparison when both sides are numbers, otherwise text
    /// equality. Ordering operators never match text. An item without the
    /// field only passes `!=`.
    pub fn matches(&self, item: &impl FieldSource) -> bool {
        let Some(actual) = item.field(&self.field).filter(|v| !v.is_null()) else {
            return self.operator == FilterOp::Ne;
        };

        if let (Some(a), Some(b)) = (actual.as_f64(), self.value.as_f64()) {
            return match self.operator {
                FilterOp::Eq => a == b,
                FilterOp::Ne => a != b,
                FilterOp::Gt => a > b,
                FilterOp::Lt => a < b,
                FilterOp::Ge => a >= b,
                FilterOp::Le => a <= b,
            };
        }

        let equal = actual.to_string() == self.value.to_string();
        match self.operator {
            FilterOp::Eq => equal,
            FilterOp::Ne => !equal,
            _ => false,
        }
    }
}

/// True when `item` passes every filter.
pub fn passes<'a>(filters: impl IntoIterator<Item = &'a Filter>, item: &impl FieldSource) -> bool {
    filters.into_iter().all(|f| f.matches(item))
}

/// Copy of `data` with only the items that pass all filters.
pub fn apply(filters: &[&Filter], data: &LayerData) -> LayerData {
    if filters.is_empty() {
        return data.clone();
    }
    match data {
        LayerData::Features(fc) => LayerData::Features(
            fc.iter()
                .filter(|f| passes(filters.iter().copied(), *f))
                .cloned()
                .collect::<FeatureCollection>(),
        ),
        LayerData::Records(rows) => LayerData::Records(
            rows.iter()
                .filter(|r| passes(filters.iter().copied(), *r))
                .cloned()
                .collect::<Vec<TabularRecord>>(),
        ),
    }
}
