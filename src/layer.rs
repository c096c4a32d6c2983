//! Layers and the model's layer registry
//!
//! Layers are owned by the model and referenced (non-owning) by
//! entities. A sentinel layer with id 0 backs entities that never named
//! a layer; registered layers get running ids from 1.

use ahash::RandomState;
use indexmap::IndexMap;
use std::rc::Rc;

/// Name of the sentinel layer entities start out on.
pub const DEFAULT_LAYER_NAME: &str = "Default DIME layer";

/// Shared, immutable reference to a registered layer.
pub type LayerRef = Rc<Layer>;

/// A drawing layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    name: String,
    layer_num: i32,
    color_number: i16,
    flags: i16,
}

impl Layer {
    pub(crate) fn new(name: impl Into<String>, layer_num: i32, color_number: i16, flags: i16) -> Self {
        Layer {
            name: name.into(),
            layer_num,
            color_number,
            flags,
        }
    }

    /// The layer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The layer's running id; 0 is the sentinel default layer.
    pub fn layer_num(&self) -> i32 {
        self.layer_num
    }

    /// The layer color number.
    pub fn color_number(&self) -> i16 {
        self.color_number
    }

    /// The layer flags (group code 70 of the LAYER table entry).
    pub fn flags(&self) -> i16 {
        self.flags
    }

    /// The shared sentinel layer (id 0, color 7).
    pub fn default_layer() -> LayerRef {
        thread_local! {
            static DEFAULT: LayerRef = Rc::new(Layer::new(DEFAULT_LAYER_NAME, 0, 7, 0));
        }
        DEFAULT.with(|layer| layer.clone())
    }
}

/// The model's layer registry: insertion-ordered, de-duplicated by
/// name.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: IndexMap<String, LayerRef, RandomState>,
}

impl LayerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        LayerRegistry {
            layers: IndexMap::default(),
        }
    }

    /// Add a layer, or return the existing one with the same name.
    /// Ids are assigned in registration order, starting at 1.
    pub fn add_layer(&mut self, name: &str, color_number: i16, flags: i16) -> LayerRef {
        if let Some(existing) = self.layers.get(name) {
            return existing.clone();
        }
        let layer = Rc::new(Layer::new(
            name,
            self.layers.len() as i32 + 1,
            color_number,
            flags,
        ));
        self.layers.insert(name.to_string(), layer.clone());
        layer
    }

    /// Look up a layer by name. The sentinel default layer is always
    /// found under its own name.
    pub fn get(&self, name: &str) -> Option<LayerRef> {
        if let Some(layer) = self.layers.get(name) {
            return Some(layer.clone());
        }
        if name == DEFAULT_LAYER_NAME {
            return Some(Layer::default_layer());
        }
        None
    }

    /// Look up a layer by index, in registration order.
    pub fn get_by_index(&self, index: usize) -> Option<LayerRef> {
        self.layers.get_index(index).map(|(_, l)| l.clone())
    }

    /// Number of registered layers (the sentinel is not counted).
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no layers are registered.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Iterate over registered layers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &LayerRef> {
        self.layers.values()
    }

    /// Remove all registered layers.
    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Register the layers declared by a LAYER table entry list.
    pub(crate) fn register_table_entry(&mut self, entry: &crate::tables::LayerTableEntry) {
        if !entry.name().is_empty() {
            self.add_layer(entry.name(), entry.color_number(), entry.flags());
        }
    }

    /// Resolve an entity's pending layer name, creating the layer on
    /// first sight. An auto-created layer adopts the entity's explicit
    /// color when it has one. The sentinel name maps back to the
    /// sentinel layer so unlayered entities round-trip.
    pub(crate) fn resolve_entity_layer(
        &mut self,
        common: &mut crate::entities::EntityCommon,
    ) {
        if let Some(name) = common.take_pending_layer_name() {
            if name == DEFAULT_LAYER_NAME {
                common.set_layer_ref(Layer::default_layer());
                return;
            }
            let color = common.explicit_color().unwrap_or(7);
            let layer = self.add_layer(&name, color, 0);
            common.set_layer_ref(layer);
        }
    }
}
