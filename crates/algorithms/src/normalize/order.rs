//! Ordering of points by time-like fields

use geolens_core::vector::ORDER_FIELDS;
use geolens_core::FieldSource;
use std::cmp::Ordering;

/// Sort key taken from the first ordering field an item carries.
///
/// Numbers sort before text, and items without any ordering field sort last.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderKey {
    Number(f64),
    Text(String),
    Missing,
}

impl OrderKey {
    pub fn of(source: &impl FieldSource) -> Self {
        let value = ORDER_FIELDS
            .iter()
            .find_map(|k| source.field(k).filter(|v| !v.is_null()));
        match value {
            None => OrderKey::Missing,
            Some(v) => match v.as_f64() {
                Some(n) => OrderKey::Number(n),
                None => OrderKey::Text(v.to_string()),
            },
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            OrderKey::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            OrderKey::Number(_) => 0,
            OrderKey::Text(_) => 1,
            OrderKey::Missing => 2,
        }
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (OrderKey::Number(a), OrderKey::Number(b)) => a.total_cmp(b),
            (OrderKey::Text(a), OrderKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Stable sort by [`OrderKey`]; items with equal keys keep input order.
pub fn sort_by_order<T: FieldSource>(items: Vec<&T>) -> Vec<&T> {
    let mut keyed: Vec<(OrderKey, &T)> = items.into_iter().map(|t| (OrderKey::of(t), t)).collect();
    keyed.sort_by(|a, b| a.0.compare(&b.0));
    keyed.into_iter().map(|(_, t)| t).collect()
}
