//! # GeoLens Layers
//!
//! Layer registry and render dispatch.
//!
//! - [`LayerRegistry`]: layers by id plus draw order, visibility, locks, groups
//! - [`generate`]: layer -> [`RenderableDescriptor`], one arm per [`LayerKind`]
//! - [`Encoder`]: per-item colour, radius and elevation from a [`StyleConfig`]
//! - [`Storage`]: save/load boundary for datasets and projects

pub mod definition;
pub mod descriptor;
pub mod dispatch;
pub mod encoding;
pub mod filter;
pub mod format;
pub mod kind;
pub mod layer;
pub mod registry;
pub mod storage;
pub mod style;

pub use definition::LayerDefinition;
pub use descriptor::{DescriptorSummary, RenderableDescriptor, StyleParams};
pub use dispatch::generate;
pub use encoding::Encoder;
pub use filter::{Filter, FilterOp};
pub use kind::LayerKind;
pub use layer::{Layer, LayerConfig, LayerGroup, Metadata};
pub use registry::{LayerRegistry, RegistryError, SharedRegistry};
pub use storage::{DatasetContent, DatasetRecord, MemoryStorage, ProjectRecord, Storage, StorageError, StoredRecord};
pub use style::{default_style_for, StyleConfig};
