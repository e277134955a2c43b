//! Persistence boundary
//!
//! The registry saves datasets opportunistically through a [`Storage`]; a
//! failed save is logged by the caller and never rolls back in-memory state.

use crate::definition::LayerDefinition;
use crate::layer::LayerGroup;
use geolens_core::io::{read_geojson, write_geojson};
use geolens_core::{LayerData, Properties, TabularRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("no stored record with id {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("data error: {0}")]
    Core(#[from] geolens_core::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Stored form of a layer's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "content", rename_all = "lowercase")]
pub enum DatasetContent {
    /// GeoJSON text
    GeoJson(String),
    Records(Vec<Properties>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetRecord {
    pub layer_id: String,
    pub title: String,
    pub content: DatasetContent,
}

impl DatasetRecord {
    pub fn from_data(layer_id: &str, title: &str, data: &LayerData) -> Result<Self, StorageError> {
        let content = match data {
            LayerData::Features(fc) => DatasetContent::GeoJson(write_geojson(fc)?),
            LayerData::Records(rows) => DatasetContent::Records(rows.iter().map(|r| r.fields.clone()).collect()),
        };
        Ok(Self { layer_id: layer_id.to_string(), title: title.to_string(), content })
    }

    pub fn to_data(&self) -> Result<LayerData, StorageError> {
        Ok(match &self.content {
            DatasetContent::GeoJson(text) => LayerData::Features(read_geojson(text)?),
            DatasetContent::Records(rows) => LayerData::Records(
                rows.iter()
                    .map(|fields| TabularRecord { fields: fields.clone() })
                    .collect(),
            ),
        })
    }
}

/// Everything needed to rebuild a registry apart from the data itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub layers: Vec<LayerDefinition>,
    /// Draw order, front first
    pub order: Vec<String>,
    pub visible: Vec<String>,
    pub groups: Vec<LayerGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoredRecord {
    Dataset(DatasetRecord),
    Project(ProjectRecord),
}

/// Save/load backend for dataset and project records.
pub trait Storage: Send + Sync {
    /// Persist `record`, returning the id it can be loaded back with.
    fn save(&self, record: StoredRecord) -> Result<String, StorageError>;

    fn load(&self, id: &str) -> Result<StoredRecord, StorageError>;
}

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, StoredRecord>>,
    next: AtomicU64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn save(&self, record: StoredRecord) -> Result<String, StorageError> {
        let prefix = match &record {
            StoredRecord::Dataset(_) => "dataset",
            StoredRecord::Project(_) => "project",
        };
        let id = format!("{prefix}-{}", self.next.fetch_add(1, Ordering::Relaxed) + 1);
        self.records
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .insert(id.clone(), record);
        Ok(id)
    }

    fn load(&self, id: &str) -> Result<StoredRecord, StorageError> {
        self.records
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }
}
