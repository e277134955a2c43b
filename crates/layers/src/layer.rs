//! Layer model

use crate::filter::Filter;
use crate::kind::LayerKind;
use crate::style::StyleConfig;
use geolens_core::LayerData;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Free-form layer metadata (source file name, provenance, ...)
pub type Metadata = BTreeMap<String, Value>;

/// A registered layer. Its render descriptor is owned by the registry and
/// derived from `kind`, `data` and `style`.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: String,
    pub title: String,
    pub kind: LayerKind,
    pub data: Option<LayerData>,
    pub style: StyleConfig,
    pub group_id: Option<String>,
    pub metadata: Metadata,
    /// Layer-level filters, combined with the style's filters
    pub filter: Vec<Filter>,
}

impl Layer {
    /// Style and layer filters together.
    pub fn all_filters(&self) -> Vec<&Filter> {
        self.style.filters.iter().chain(self.filter.iter()).collect()
    }
}

/// Input to [`LayerRegistry::add_layer`](crate::LayerRegistry::add_layer).
///
/// Missing `id` and `style` are filled in by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerConfig {
    pub id: Option<String>,
    pub title: String,
    pub kind: LayerKind,
    pub data: Option<LayerData>,
    pub style: Option<StyleConfig>,
    pub group_id: Option<String>,
    pub metadata: Metadata,
    pub filter: Vec<Filter>,
}

impl LayerConfig {
    pub fn new(title: impl Into<String>, kind: impl Into<LayerKind>) -> Self {
        Self {
            id: None,
            title: title.into(),
            kind: kind.into(),
            data: None,
            style: None,
            group_id: None,
            metadata: Metadata::new(),
            filter: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<LayerData>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter.push(filter);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl From<Layer> for LayerConfig {
    fn from(layer: Layer) -> Self {
        Self {
            id: Some(layer.id),
            title: layer.title,
            kind: layer.kind,
            data: layer.data,
            style: Some(layer.style),
            group_id: layer.group_id,
            metadata: layer.metadata,
            filter: layer.filter,
        }
    }
}

/// Named, user-visible grouping of layers. Does not affect draw order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerGroup {
    pub id: String,
    pub name: String,
    pub layers: Vec<String>,
}
