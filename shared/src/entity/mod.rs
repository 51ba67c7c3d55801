mod action;
mod error;
mod id;

pub use action::{EntityAction, ExecType};
pub use error::EntityError;
pub use id::{
    id_range, is_local_id, is_unacked_id, IdRange, UniqueIdGenerator, FIRST_LOCAL_ID,
    FIRST_UNACKED_ID, LAST_REPLICATED_ID, LAST_UNACKED_ID,
};

use std::collections::BTreeMap;

use crate::{
    attribute::{AttributeChange, AttributeValue},
    component::{Component, ComponentTypeId, NAME, PLACEABLE},
};

/// A container of components keyed by component id.
///
/// Entities are owned by a `Scene`; all structural changes go through the
/// scene so that listeners hear about them.
#[derive(Debug)]
pub struct Entity {
    id: u32,
    temporary: bool,
    parent: Option<u32>,
    components: BTreeMap<u32, Component>,
    id_generator: UniqueIdGenerator,
}

impl Entity {
    pub(crate) fn new(id: u32) -> Self {
        Self {
            id,
            temporary: false,
            parent: None,
            components: BTreeMap::new(),
            id_generator: UniqueIdGenerator::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Value of the `name` attribute of the Name component, empty without one.
    pub fn name(&self) -> &str {
        self.component_by_type_id(ComponentTypeId(NAME))
            .and_then(|component| component.attribute_by_id("name"))
            .and_then(|attribute| attribute.value().as_str())
            .unwrap_or("")
    }

    pub fn is_local(&self) -> bool {
        is_local_id(self.id)
    }

    pub fn is_unacked(&self) -> bool {
        is_unacked_id(self.id)
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn parent(&self) -> Option<u32> {
        self.parent
    }

    pub fn component_by_id(&self, id: u32) -> Option<&Component> {
        self.components.get(&id)
    }

    /// First component of a type, optionally matching a component name.
    pub fn component(&self, type_name: &str, name: Option<&str>) -> Option<&Component> {
        let type_name = crate::component::strip_type_prefix(type_name);
        self.components.values().find(|component| {
            component.type_name() == type_name && name.map_or(true, |name| component.name() == name)
        })
    }

    pub fn component_by_type_id(&self, type_id: ComponentTypeId) -> Option<&Component> {
        self.components.values().find(|component| component.type_id() == type_id)
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn components_of_type(&self, type_id: ComponentTypeId) -> impl Iterator<Item = &Component> {
        self.components
            .values()
            .filter(move |component| component.type_id() == type_id)
    }

    pub fn has_component(&self, type_name: &str) -> bool {
        self.component(type_name, None).is_some()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn attribute_value(&self, component_id: u32, index: u8) -> Option<&AttributeValue> {
        self.component_by_id(component_id)?.value(index)
    }

    // Scene-side mutation

    pub(crate) fn set_id(&mut self, id: u32) {
        self.id = id;
        for component in self.components.values_mut() {
            component.set_parent_entity(Some(id));
        }
    }

    pub(crate) fn set_temporary(&mut self, temporary: bool) {
        self.temporary = temporary;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<u32>) {
        self.parent = parent;
    }

    pub(crate) fn component_by_id_mut(&mut self, id: u32) -> Option<&mut Component> {
        self.components.get_mut(&id)
    }

    /// Picks an id for a new component. Local entities and local changes get
    /// local ids; otherwise server-side allocation hands out replicated ids
    /// and clients hand out unacked ones.
    pub(crate) fn allocate_component_id(&mut self, change: AttributeChange, server_side: bool) -> u32 {
        loop {
            let id = if self.is_local() || change == AttributeChange::LocalOnly {
                self.id_generator.allocate_local()
            } else if server_side {
                self.id_generator.allocate_replicated()
            } else {
                self.id_generator.allocate_unacked()
            };
            if !self.components.contains_key(&id) {
                return id;
            }
        }
    }

    pub(crate) fn add_component(&mut self, mut component: Component) -> Result<&mut Component, EntityError> {
        let id = component.id();
        if self.components.contains_key(&id) {
            return Err(EntityError::IdInUse { entity: self.id, id });
        }
        self.id_generator.observe(id);
        component.set_parent_entity(Some(self.id));
        Ok(self.components.entry(id).or_insert(component))
    }

    pub(crate) fn take_component(&mut self, id: u32) -> Option<Component> {
        let mut component = self.components.remove(&id)?;
        component.set_parent_entity(None);
        Some(component)
    }

    /// Re-keys an unacked component under the id the server assigned.
    pub(crate) fn change_component_id(&mut self, old: u32, new: u32) -> Result<(), EntityError> {
        if !is_unacked_id(old) || id_range(new) != IdRange::Replicated {
            return Err(EntityError::InvalidIdChange { old, new });
        }
        if self.components.contains_key(&new) {
            return Err(EntityError::IdInUse { entity: self.id, id: new });
        }
        let mut component = self
            .components
            .remove(&old)
            .ok_or(EntityError::ComponentNotFound { entity: self.id, id: old })?;
        component.set_id(new);
        self.id_generator.observe(new);
        self.components.insert(new, component);
        Ok(())
    }

    /// Component ids in removal order: Placeable goes last so that dependants
    /// can still read the transform while being torn down.
    pub(crate) fn component_ids_for_removal(&self) -> Vec<u32> {
        let (placeables, rest): (Vec<&Component>, Vec<&Component>) = self
            .components
            .values()
            .partition(|component| component.type_id() == ComponentTypeId(PLACEABLE));
        let mut ids: Vec<u32> = rest.iter().map(|component| component.id()).collect();
        let placeables = placeables.iter().map(|component| component.id());
        ids.extend(placeables);
        ids
    }
}
