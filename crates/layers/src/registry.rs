//! Layer registry
//!
//! Owns every layer by id together with the separately tracked draw order,
//! visibility, lock state, active layer and groups. Each layer's descriptor
//! is regenerated through [`generate`] after any change to its kind, data or
//! style, so a stored descriptor always reflects the current layer.
//!
//! Ids are never reused: an id handed out once stays retired after the layer
//! is removed, and a requested id that collides with a retired or live one is
//! replaced by a fresh `layer-N`.

use crate::definition::LayerDefinition;
use crate::descriptor::RenderableDescriptor;
use crate::dispatch::generate;
use crate::kind::LayerKind;
use crate::layer::{Layer, LayerConfig, LayerGroup, Metadata};
use crate::storage::{DatasetRecord, ProjectRecord, Storage, StorageError, StoredRecord};
use crate::style::default_style_for;
use geolens_core::validate::validate_collection;
use geolens_core::{FeatureCollection, LayerData};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("no layer or group with id {0}")]
    NotFound(String),

    #[error("layer {0} is locked")]
    Locked(String),

    #[error("invalid layer definition: {0}")]
    Definition(String),

    #[error("invalid style for layer {id}: {reason}")]
    InvalidStyle { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Default)]
pub struct LayerRegistry {
    layers: HashMap<String, Layer>,
    descriptors: HashMap<String, RenderableDescriptor>,
    /// Front first
    order: Vec<String>,
    visible: HashSet<String>,
    locked: HashSet<String>,
    active: Option<String>,
    groups: Vec<LayerGroup>,
    /// Insertion sequence per live layer
    inserted: HashMap<String, u64>,
    seq: u64,
    issued: HashSet<String>,
    next_id: u64,
    next_group_id: u64,
    storage: Option<Arc<dyn Storage>>,
}

impl fmt::Debug for LayerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerRegistry")
            .field("order", &self.order)
            .field("visible", &self.visible)
            .field("locked", &self.locked)
            .field("active", &self.active)
            .field("groups", &self.groups)
            .field("storage", &self.storage.is_some())
            .finish_non_exhaustive()
    }
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that saves each added dataset to `storage`.
    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage: Some(storage),
            ..Self::default()
        }
    }

    fn issue_id(&mut self, requested: Option<String>) -> String {
        let id = match requested {
            Some(id) if !id.is_empty() && !self.issued.contains(&id) => id,
            requested => {
                let fresh = loop {
                    self.next_id += 1;
                    let candidate = format!("layer-{}", self.next_id);
                    if !self.issued.contains(&candidate) {
                        break candidate;
                    }
                };
                if let Some(old) = requested {
                    debug!(requested = %old, assigned = %fresh, "layer id already used");
                }
                fresh
            }
        };
        self.issued.insert(id.clone());
        id
    }

    fn regenerate(&mut self, id: &str) {
        match self.layers.get(id).and_then(generate) {
            Some(descriptor) => {
                self.descriptors.insert(id.to_string(), descriptor);
            }
            None => {
                self.descriptors.remove(id);
            }
        }
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Layer> {
        self.layers
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    fn ensure_unlocked(&self, id: &str) -> Result<()> {
        if !self.layers.contains_key(id) {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        if self.locked.contains(id) {
            return Err(RegistryError::Locked(id.to_string()));
        }
        Ok(())
    }

    fn insert_layer(&mut self, layer: Layer) {
        let id = layer.id.clone();
        self.seq += 1;
        self.inserted.insert(id.clone(), self.seq);
        self.layers.insert(id.clone(), layer);
        self.regenerate(&id);
    }

    fn persist(&self, layer: &Layer) {
        let (Some(storage), Some(data)) = (&self.storage, &layer.data) else {
            return;
        };
        let saved = DatasetRecord::from_data(&layer.id, &layer.title, data)
            .and_then(|record| storage.save(StoredRecord::Dataset(record)));
        match saved {
            Ok(record_id) => debug!(layer = %layer.id, record = %record_id, "dataset saved"),
            Err(e) => warn!(layer = %layer.id, error = %e, "could not save dataset"),
        }
    }

    /// Register a layer; it becomes the front-most, visible and active one.
    pub fn add_layer(&mut self, config: LayerConfig) -> String {
        let id = self.issue_id(config.id);
        let style = match config.style {
            Some(style) => style.sanitized(),
            None => default_style_for(&config.kind),
        };
        if let Some(data) = &config.data {
            report_validation(&id, data);
        }

        let layer = Layer {
            id: id.clone(),
            title: config.title,
            kind: config.kind,
            data: config.data,
            style,
            group_id: config.group_id,
            metadata: config.metadata,
            filter: config.filter,
        };
        self.persist(&layer);
        self.insert_layer(layer);
        self.order.insert(0, id.clone());
        self.visible.insert(id.clone());
        self.active = Some(id.clone());
        info!(layer = %id, "layer added");
        id
    }

    pub fn remove_layer(&mut self, id: &str) -> Result<Layer> {
        let layer = self
            .layers
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        self.descriptors.remove(id);
        self.order.retain(|o| o != id);
        self.visible.remove(id);
        self.locked.remove(id);
        self.inserted.remove(id);
        for group in &mut self.groups {
            group.layers.retain(|l| l != id);
        }
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        info!(layer = %id, "layer removed");
        Ok(layer)
    }

    /// Replace every layer. Order follows `layers`; previously visible or
    /// unseen ids are visible, explicitly hidden ones stay hidden.
    pub fn set_layers(&mut self, layers: Vec<Layer>) {
        let hidden: HashSet<String> = self
            .layers
            .keys()
            .filter(|id| !self.visible.contains(*id))
            .cloned()
            .collect();

        let previous: HashSet<String> = self.layers.keys().cloned().collect();

        self.layers.clear();
        self.descriptors.clear();
        self.inserted.clear();
        self.order.clear();

        for mut layer in layers {
            // Live ids carry over; retired ids and duplicates get a fresh one.
            let keep = !layer.id.is_empty()
                && !self.layers.contains_key(&layer.id)
                && (previous.contains(&layer.id) || !self.issued.contains(&layer.id));
            if keep {
                self.issued.insert(layer.id.clone());
            } else {
                let requested = (!layer.id.is_empty()).then(|| std::mem::take(&mut layer.id));
                layer.id = self.issue_id(requested);
            }
            self.order.push(layer.id.clone());
            self.insert_layer(layer);
        }

        self.visible = self
            .order
            .iter()
            .filter(|id| !hidden.contains(*id))
            .cloned()
            .collect();
        self.locked.retain(|id| self.layers.contains_key(id));
        for group in &mut self.groups {
            group.layers.retain(|id| self.layers.contains_key(id));
        }
        if self.active.as_ref().is_some_and(|id| !self.layers.contains_key(id)) {
            self.active = None;
        }
    }

    /// Flip visibility, returning the new state.
    pub fn toggle_layer_visibility(&mut self, id: &str) -> Result<bool> {
        if !self.layers.contains_key(id) {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        if self.visible.remove(id) {
            Ok(false)
        } else {
            self.visible.insert(id.to_string());
            Ok(true)
        }
    }

    pub fn lock_layer(&mut self, id: &str, locked: bool) -> Result<()> {
        if !self.layers.contains_key(id) {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        if locked {
            self.locked.insert(id.to_string());
        } else {
            self.locked.remove(id);
        }
        Ok(())
    }

    /// `None` clears the active layer.
    pub fn set_active_layer(&mut self, id: Option<&str>) -> Result<()> {
        match id {
            Some(id) if !self.layers.contains_key(id) => Err(RegistryError::NotFound(id.to_string())),
            id => {
                self.active = id.map(str::to_string);
                Ok(())
            }
        }
    }

    /// Merge a partial JSON style into the layer and rebuild its descriptor.
    pub fn update_layer_style(&mut self, id: &str, patch: &Value) -> Result<()> {
        self.ensure_unlocked(id)?;
        let layer = self.get_mut(id)?;
        layer.style = layer.style.merged(patch).map_err(|e| RegistryError::InvalidStyle {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        self.regenerate(id);
        Ok(())
    }

    pub fn update_layer_data(&mut self, id: &str, data: Option<LayerData>) -> Result<()> {
        self.ensure_unlocked(id)?;
        if let Some(data) = &data {
            report_validation(id, data);
        }
        self.get_mut(id)?.data = data;
        self.regenerate(id);
        Ok(())
    }

    /// Merge keys into the layer's metadata; `null` values remove keys.
    pub fn update_layer_metadata(&mut self, id: &str, patch: Metadata) -> Result<()> {
        let layer = self.get_mut(id)?;
        for (key, value) in patch {
            if value.is_null() {
                layer.metadata.remove(&key);
            } else {
                layer.metadata.insert(key, value);
            }
        }
        Ok(())
    }

    /// Move one step towards the front. Returns whether anything moved.
    pub fn move_layer_up(&mut self, id: &str) -> Result<bool> {
        let index = self.position(id)?;
        if index == 0 {
            return Ok(false);
        }
        self.order.swap(index, index - 1);
        Ok(true)
    }

    /// Move one step towards the back. Returns whether anything moved.
    pub fn move_layer_down(&mut self, id: &str) -> Result<bool> {
        let index = self.position(id)?;
        if index + 1 >= self.order.len() {
            return Ok(false);
        }
        self.order.swap(index, index + 1);
        Ok(true)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.order
            .iter()
            .position(|o| o == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Copy a layer under a new id, placed right behind the original.
    pub fn duplicate_layer(&mut self, id: &str) -> Result<String> {
        let original = self
            .layers
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        let mut copy = original.clone();
        let new_id = self.issue_id(None);
        copy.id = new_id.clone();
        copy.title = format!("{} (copy)", copy.title);

        let group = copy.group_id.clone();
        self.insert_layer(copy);
        match self.order.iter().position(|o| o == id) {
            Some(index) => self.order.insert(index + 1, new_id.clone()),
            None => self.order.insert(0, new_id.clone()),
        }
        if self.visible.contains(id) {
            self.visible.insert(new_id.clone());
        }
        if let Some(group) = group.and_then(|g| self.groups.iter_mut().find(|x| x.id == g)) {
            group.layers.push(new_id.clone());
        }
        Ok(new_id)
    }

    /// Create a group of the registered ids among `layer_ids`.
    pub fn create_layer_group(&mut self, name: impl Into<String>, layer_ids: &[String]) -> String {
        self.next_group_id += 1;
        let id = format!("group-{}", self.next_group_id);
        let members = self.assign_group(&id, layer_ids);
        self.groups.push(LayerGroup {
            id: id.clone(),
            name: name.into(),
            layers: members,
        });
        id
    }

    /// Rename a group and/or replace its members.
    pub fn update_layer_group(&mut self, id: &str, name: Option<String>, layer_ids: Option<&[String]>) -> Result<()> {
        let index = self
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        if let Some(layer_ids) = layer_ids {
            let previous = std::mem::take(&mut self.groups[index].layers);
            self.release_group(id, &previous);
            self.groups[index].layers = self.assign_group(id, layer_ids);
        }
        if let Some(name) = name {
            self.groups[index].name = name;
        }
        Ok(())
    }

    pub fn remove_layer_group(&mut self, id: &str) -> Result<LayerGroup> {
        let index = self
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        let group = self.groups.remove(index);
        self.release_group(id, &group.layers);
        Ok(group)
    }

    fn assign_group(&mut self, group_id: &str, layer_ids: &[String]) -> Vec<String> {
        let mut members = Vec::new();
        for layer_id in layer_ids {
            if members.contains(layer_id) {
                continue;
            }
            match self.layers.get_mut(layer_id) {
                Some(layer) => {
                    layer.group_id = Some(group_id.to_string());
                    members.push(layer_id.clone());
                }
                None => debug!(layer = %layer_id, group = group_id, "unknown layer left out of group"),
            }
        }
        members
    }

    fn release_group(&mut self, group_id: &str, members: &[String]) {
        for layer_id in members {
            if let Some(layer) = self.layers.get_mut(layer_id) {
                if layer.group_id.as_deref() == Some(group_id) {
                    layer.group_id = None;
                }
            }
        }
    }

    pub fn export_layer_definition(&self, id: &str) -> Result<LayerDefinition> {
        self.layers
            .get(id)
            .map(LayerDefinition::from)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Register a layer from a definition; its descriptor is rebuilt from
    /// `data`. Returns the id, which differs from the definition's when that
    /// one is already taken.
    pub fn import_layer_definition(&mut self, definition: LayerDefinition, data: Option<LayerData>) -> String {
        self.add_layer(definition.into_config(data))
    }

    /// Same as [`import_layer_definition`](Self::import_layer_definition) for
    /// JSON text.
    pub fn import_layer_definition_json(&mut self, text: &str, data: Option<LayerData>) -> Result<String> {
        let definition = LayerDefinition::from_json(text).map_err(|e| RegistryError::Definition(e.to_string()))?;
        Ok(self.import_layer_definition(definition, data))
    }

    /// Register an analysis output as a new layer whose kind follows the
    /// collection's dominant geometry.
    pub fn add_analysis_result(&mut self, title: impl Into<String>, collection: FeatureCollection) -> String {
        let kind = match collection.dominant_kind() {
            Some(k) if k.is_polygonal() => LayerKind::Polygon,
            Some(k) if k.is_lineal() => LayerKind::Line,
            _ => LayerKind::Scatterplot,
        };
        let config = LayerConfig::new(title, kind)
            .with_data(collection)
            .with_metadata("source", "analysis");
        self.add_layer(config)
    }

    /// Descriptors of visible layers, front first.
    pub fn render_list(&self) -> Vec<&RenderableDescriptor> {
        let rank: HashMap<&str, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let mut ids: Vec<&String> = self.visible.iter().collect();
        ids.sort_by_key(|id| {
            (
                rank.get(id.as_str()).copied().unwrap_or(usize::MAX),
                self.inserted.get(*id).copied().unwrap_or(u64::MAX),
            )
        });
        ids.into_iter().filter_map(|id| self.descriptors.get(id)).collect()
    }

    pub fn project_snapshot(&self) -> ProjectRecord {
        ProjectRecord {
            layers: self.layers_in_order().map(LayerDefinition::from).collect(),
            order: self.order.clone(),
            visible: self.order.iter().filter(|id| self.visible.contains(*id)).cloned().collect(),
            groups: self.groups.clone(),
        }
    }

    /// Save the project snapshot to the attached storage.
    pub fn save_project(&self) -> std::result::Result<String, StorageError> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| StorageError::Backend("no storage attached".into()))?;
        storage.save(StoredRecord::Project(self.project_snapshot()))
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.get(id)
    }

    /// Layers in draw order, front first.
    pub fn layers_in_order(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.order.iter().filter_map(|id| self.layers.get(id))
    }

    pub fn descriptor(&self, id: &str) -> Option<&RenderableDescriptor> {
        self.descriptors.get(id)
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    pub fn is_locked(&self, id: &str) -> bool {
        self.locked.contains(id)
    }

    pub fn active_layer(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn groups(&self) -> &[LayerGroup] {
        &self.groups
    }

    pub fn group(&self, id: &str) -> Option<&LayerGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

fn report_validation(id: &str, data: &LayerData) {
    let Some(fc) = data.as_features() else {
        return;
    };
    let report = validate_collection(fc);
    for issue in report.errors.iter().chain(&report.warnings) {
        warn!(layer = id, %issue, "layer data failed validation");
    }
}

/// Registry shared between threads; each closure runs under the lock, so
/// callers never observe a half-applied mutation.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry(Arc<RwLock<LayerRegistry>>);

impl SharedRegistry {
    pub fn new(registry: LayerRegistry) -> Self {
        Self(Arc::new(RwLock::new(registry)))
    }

    pub fn read<T>(&self, f: impl FnOnce(&LayerRegistry) -> T) -> T {
        let guard = self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    pub fn write<T>(&self, f: impl FnOnce(&mut LayerRegistry) -> T) -> T {
        let mut guard = self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use approx::assert_relative_eq;
    use geo_types::point;
    use geolens_core::{Feature, TabularRecord};
    use serde_json::json;

    fn points(n: usize) -> FeatureCollection {
        (0..n)
            .map(|i| Feature::new(point!(x: i as f64, y: 0.0)).with_property("v", i as f64))
            .collect()
    }

    fn registry_with(n: usize) -> (LayerRegistry, Vec<String>) {
        let mut r = LayerRegistry::new();
        let ids = (0..n)
            .map(|i| r.add_layer(LayerConfig::new(format!("L{i}"), "point").with_data(points(3))))
            .collect();
        (r, ids)
    }

    #[test]
    fn add_puts_layer_in_front_visible_and_active() {
        let (r, ids) = registry_with(2);
        assert_eq!(r.order(), &[ids[1].clone(), ids[0].clone()]);
        assert!(r.is_visible(&ids[0]) && r.is_visible(&ids[1]));
        assert_eq!(r.active_layer(), Some(ids[1].as_str()));
        assert_eq!(r.descriptor(&ids[0]).map(|d| d.len()), Some(3));
    }

    #[test]
    fn ids_are_never_reused() {
        let (mut r, ids) = registry_with(1);
        r.remove_layer(&ids[0]).unwrap();
        let again = r.add_layer(LayerConfig::new("x", "point").with_id(ids[0].clone()));
        assert_ne!(again, ids[0]);
        let explicit = r.add_layer(LayerConfig::new("y", "point").with_id("roads"));
        assert_eq!(explicit, "roads");
    }

    #[test]
    fn remove_clears_every_collection() {
        let (mut r, ids) = registry_with(2);
        r.lock_layer(&ids[1], true).unwrap();
        let g = r.create_layer_group("g", &ids);
        r.remove_layer(&ids[1]).unwrap();
        assert_eq!(r.order(), &[ids[0].clone()]);
        assert!(!r.is_visible(&ids[1]) && !r.is_locked(&ids[1]));
        assert_eq!(r.active_layer(), None);
        assert_eq!(r.group(&g).unwrap().layers, vec![ids[0].clone()]);
        assert_eq!(r.remove_layer(&ids[1]), Err(RegistryError::NotFound(ids[1].clone())));
    }

    #[test]
    fn moves_stop_at_the_edges() {
        let (mut r, ids) = registry_with(3);
        // order: 2, 1, 0
        assert!(!r.move_layer_up(&ids[2]).unwrap());
        assert!(!r.move_layer_down(&ids[0]).unwrap());
        assert!(r.move_layer_up(&ids[0]).unwrap());
        assert_eq!(r.order(), &[ids[2].clone(), ids[0].clone(), ids[1].clone()]);
        assert!(r.move_layer_down(&ids[2]).unwrap());
        assert_eq!(r.order(), &[ids[0].clone(), ids[2].clone(), ids[1].clone()]);
    }

    #[test]
    fn duplicate_goes_right_behind_original() {
        let (mut r, ids) = registry_with(3);
        let copy = r.duplicate_layer(&ids[1]).unwrap();
        assert_eq!(r.order(), &[ids[2].clone(), ids[1].clone(), copy.clone(), ids[0].clone()]);
        assert_eq!(r.layer(&copy).unwrap().title, "L1 (copy)");
        assert!(r.descriptor(&copy).is_some());
    }

    #[test]
    fn style_updates_regenerate_from_merged_style() {
        let (mut r, ids) = registry_with(1);
        r.update_layer_style(&ids[0], &json!({"sizeField": "v", "radius": 10})).unwrap();
        let d = r.descriptor(&ids[0]).unwrap();
        assert_relative_eq!(d.radii[0], 1.0);
        assert_relative_eq!(d.radii[1], 5.5, epsilon = 1e-9);
        assert_relative_eq!(d.radii[2], 10.0, epsilon = 1e-9);

        let err = r.update_layer_style(&ids[0], &json!("red")).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidStyle { .. }));
    }

    #[test]
    fn locked_layers_reject_edits_but_move() {
        let (mut r, ids) = registry_with(2);
        r.lock_layer(&ids[0], true).unwrap();
        assert_eq!(
            r.update_layer_style(&ids[0], &json!({"opacity": 0.1})),
            Err(RegistryError::Locked(ids[0].clone()))
        );
        assert_eq!(r.update_layer_data(&ids[0], None), Err(RegistryError::Locked(ids[0].clone())));
        assert!(r.move_layer_up(&ids[0]).unwrap());
        assert!(!r.toggle_layer_visibility(&ids[0]).unwrap());
    }

    #[test]
    fn data_removal_drops_descriptor() {
        let (mut r, ids) = registry_with(1);
        r.update_layer_data(&ids[0], None).unwrap();
        assert!(r.descriptor(&ids[0]).is_none());
        assert!(r.render_list().is_empty());
        r.update_layer_data(&ids[0], Some(vec![TabularRecord::new().with("lat", 1.0).with("lng", 2.0)].into()))
            .unwrap();
        assert_eq!(r.render_list().len(), 1);
    }

    #[test]
    fn render_list_follows_order_and_visibility() {
        let (mut r, ids) = registry_with(3);
        r.toggle_layer_visibility(&ids[1]).unwrap();
        let listed: Vec<&str> = r.render_list().iter().map(|d| d.layer_id.as_str()).collect();
        assert_eq!(listed, vec![ids[2].as_str(), ids[0].as_str()]);
    }

    #[test]
    fn set_layers_rebuilds_order_and_prunes() {
        let (mut r, ids) = registry_with(2);
        r.toggle_layer_visibility(&ids[0]).unwrap();
        let mut kept = r.layer(&ids[0]).unwrap().clone();
        kept.title = "kept".into();
        let mut dup = kept.clone();
        dup.title = "dup".into();
        r.set_layers(vec![kept, dup]);

        assert_eq!(r.len(), 2);
        assert_eq!(r.order()[0], ids[0]);
        assert_ne!(r.order()[1], ids[0]);
        assert!(!r.is_visible(&ids[0]));
        assert!(r.is_visible(&r.order()[1]));
        assert!(r.layer(&ids[1]).is_none());
        assert_eq!(r.active_layer(), None);
    }

    #[test]
    fn set_layers_does_not_revive_retired_ids() {
        let (mut r, ids) = registry_with(2);
        let removed = r.layer(&ids[0]).unwrap().clone();
        let live = r.layer(&ids[1]).unwrap().clone();
        r.remove_layer(&ids[0]).unwrap();

        let mut fresh = live.clone();
        fresh.id = "rivers".into();
        r.set_layers(vec![removed, live, fresh]);

        assert_eq!(r.len(), 3);
        assert!(r.layer(&ids[0]).is_none());
        assert_eq!(r.order()[1], ids[1]);
        assert_eq!(r.order()[2], "rivers");

        // Dropped by a replacement, so retired as well.
        let dropped = r.layer(&ids[1]).unwrap().clone();
        r.set_layers(Vec::new());
        r.set_layers(vec![dropped]);
        assert!(r.layer(&ids[1]).is_none());
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn groups_are_bookkeeping_only() {
        let (mut r, ids) = registry_with(2);
        let order = r.order().to_vec();
        let g = r.create_layer_group("roads", &[ids[0].clone(), "ghost".into()]);
        assert_eq!(r.group(&g).unwrap().layers, vec![ids[0].clone()]);
        assert_eq!(r.layer(&ids[0]).unwrap().group_id.as_deref(), Some(g.as_str()));

        r.update_layer_group(&g, Some("streets".into()), Some(&[ids[1].clone()])).unwrap();
        assert_eq!(r.layer(&ids[0]).unwrap().group_id, None);
        assert_eq!(r.group(&g).unwrap().name, "streets");

        r.remove_layer_group(&g).unwrap();
        assert_eq!(r.layer(&ids[1]).unwrap().group_id, None);
        assert_eq!(r.order(), order.as_slice());
        assert!(r.remove_layer_group(&g).is_err());
    }

    #[test]
    fn metadata_patch_merges_and_removes() {
        let (mut r, ids) = registry_with(1);
        let mut patch = Metadata::new();
        patch.insert("source".into(), json!("upload.csv"));
        r.update_layer_metadata(&ids[0], patch).unwrap();
        let mut clear = Metadata::new();
        clear.insert("source".into(), Value::Null);
        r.update_layer_metadata(&ids[0], clear).unwrap();
        assert!(r.layer(&ids[0]).unwrap().metadata.is_empty());
    }

    #[test]
    fn datasets_and_projects_reach_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let mut r = LayerRegistry::with_storage(storage.clone());
        r.add_layer(LayerConfig::new("a", "point").with_data(points(2)));
        r.add_layer(LayerConfig::new("empty", "point"));
        assert_eq!(storage.len(), 1);

        let id = r.save_project().unwrap();
        let StoredRecord::Project(project) = storage.load(&id).unwrap() else {
            panic!("expected a project");
        };
        assert_eq!(project.layers.len(), 2);
        assert_eq!(project.order, r.order());
    }

    #[test]
    fn shared_registry_applies_mutations_atomically() {
        let shared = SharedRegistry::default();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let s = shared.clone();
                std::thread::spawn(move || {
                    s.write(|r| r.add_layer(LayerConfig::new(format!("t{i}"), "point").with_data(points(1))))
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        shared.read(|r| {
            assert_eq!(r.len(), 4);
            assert_eq!(r.order().len(), 4);
            assert_eq!(r.render_list().len(), 4);
        });
    }
}
