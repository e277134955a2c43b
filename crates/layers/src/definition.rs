//! Portable layer definitions
//!
//! A definition holds only the non-derived parts of a layer. Data travels
//! separately and the descriptor is rebuilt on import.

use crate::filter::Filter;
use crate::kind::LayerKind;
use crate::layer::{Layer, LayerConfig, Metadata};
use crate::style::StyleConfig;
use geolens_core::LayerData;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDefinition {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub filter: Vec<Filter>,
}

impl LayerDefinition {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Registry input recreating the layer, with `data` attached.
    pub fn into_config(self, data: Option<LayerData>) -> LayerConfig {
        LayerConfig {
            id: Some(self.id),
            title: self.title,
            kind: self.kind,
            data,
            style: Some(self.style),
            group_id: None,
            metadata: self.metadata,
            filter: self.filter,
        }
    }
}

impl From<&Layer> for LayerDefinition {
    fn from(layer: &Layer) -> Self {
        Self {
            id: layer.id.clone(),
            title: layer.title.clone(),
            kind: layer.kind.clone(),
            style: layer.style.clone(),
            metadata: layer.metadata.clone(),
            filter: layer.filter.clone(),
        }
    }
}
