use tundra_serde::Deserializer;

use crate::{
    attribute::{AttributeChange, AttributeTypeId, AttributeValue},
    component::{Component, ComponentListener, ComponentRegistry},
    entity::{is_local_id, Entity, EntityAction, EntityError, ExecType},
};

use super::{event::emit, EntityHandle, Scene, SceneError, SceneEvent, SceneListener};

/// Mutable view of one entity. Every change made through it is announced to
/// the scene listeners, after the component listeners.
pub struct EntityMut<'s> {
    scene: &'s mut Scene,
    handle: EntityHandle,
}

impl<'s> EntityMut<'s> {
    pub(crate) fn new(scene: &'s mut Scene, handle: EntityHandle) -> Self {
        Self { scene, handle }
    }

    pub fn handle(&self) -> EntityHandle {
        self.handle
    }

    pub fn entity(&self) -> &Entity {
        match self.scene.entity(self.handle) {
            Some(entity) => entity,
            // the view is only built for live handles and holds the scene
            None => unreachable!("EntityMut outlived its entity"),
        }
    }

    pub fn id(&self) -> u32 {
        self.entity().id()
    }

    fn parts(&mut self) -> (&mut Entity, &mut Vec<Box<dyn SceneListener>>, &ComponentRegistry, bool) {
        let scene = &mut *self.scene;
        let slot = &mut scene.slots[self.handle.slot as usize];
        let entity = match slot.entity.as_mut() {
            Some(entity) => entity,
            None => unreachable!("EntityMut outlived its entity"),
        };
        (entity, &mut scene.listeners, scene.registry.as_ref(), scene.server_side_ids)
    }

    fn component_mut<'a>(entity: &'a mut Entity, component_id: u32) -> Result<&'a mut Component, SceneError> {
        let entity_id = entity.id();
        entity.component_by_id_mut(component_id).ok_or(SceneError::Entity(
            EntityError::ComponentNotFound {
                entity: entity_id,
                id: component_id,
            },
        ))
    }

    // Components

    /// Instantiates a component of `type_id`. Component id 0 allocates:
    /// local for local entities or `LocalOnly` changes, unacked otherwise
    /// (replicated with server-side allocation).
    pub fn create_component(
        &mut self,
        type_id: u32,
        component_id: u32,
        name: &str,
        change: AttributeChange,
    ) -> Result<u32, SceneError> {
        let (_, _, registry, _) = self.parts();
        let component = registry.create_component(type_id, component_id, name)?;
        self.add_component(component, change)
    }

    pub fn create_component_by_name(
        &mut self,
        type_name: &str,
        component_id: u32,
        name: &str,
        change: AttributeChange,
    ) -> Result<u32, SceneError> {
        let type_id = self
            .scene
            .registry
            .type_id(type_name)
            .ok_or_else(|| crate::component::RegistryError::UnknownTypeName {
                type_name: type_name.to_string(),
            })
            .inspect_err(|err| log::error!("{}", err))?;
        self.create_component(type_id, component_id, name, change)
    }

    /// Existing component of the type and name, or a new one.
    pub fn get_or_create_component(
        &mut self,
        type_name: &str,
        name: &str,
        change: AttributeChange,
    ) -> Result<u32, SceneError> {
        if let Some(component) = self.entity().component(type_name, Some(name)) {
            return Ok(component.id());
        }
        self.create_component_by_name(type_name, 0, name, change)
    }

    /// Instantiates a component and fills it from full-update bytes before
    /// announcing it.
    pub fn create_component_from_binary(
        &mut self,
        type_id: u32,
        component_id: u32,
        name: &str,
        reader: &mut Deserializer,
        change: AttributeChange,
    ) -> Result<u32, SceneError> {
        let (_, _, registry, _) = self.parts();
        let mut component = registry.create_component(type_id, component_id, name)?;
        component.deserialize_from_binary(reader)?;
        self.add_component(component, change)
    }

    /// Adds an instantiated component, allocating an id for id 0.
    pub fn add_component(&mut self, mut component: Component, change: AttributeChange) -> Result<u32, SceneError> {
        let (entity, listeners, _, server_side) = self.parts();
        if component.id() == 0 {
            let id = entity.allocate_component_id(change, server_side);
            component.set_id(id);
        }
        let local = entity.is_local() || is_local_id(component.id());
        component.set_replicated(!local);
        let resolved = change.resolve(local);

        let entity_id = entity.id();
        let component = entity.add_component(component)?;
        let (component_id, type_id) = (component.id(), component.type_id());
        log::debug!(
            "entity {} gained {} component {}",
            entity_id,
            component.type_name(),
            component_id
        );
        if !resolved.is_disconnected() {
            emit(
                listeners,
                SceneEvent::ComponentAdded {
                    entity_id,
                    component_id,
                    type_id,
                    change: resolved,
                },
            );
        }
        Ok(component_id)
    }

    /// Announces the removal, then detaches the component.
    pub fn remove_component(&mut self, component_id: u32, change: AttributeChange) -> Result<Component, SceneError> {
        let (entity, listeners, _, _) = self.parts();
        let entity_id = entity.id();
        let component = Self::component_mut(entity, component_id)?;
        let resolved = component.resolve_change(change);
        let type_id = component.type_id();
        if !resolved.is_disconnected() {
            emit(
                listeners,
                SceneEvent::ComponentRemoved {
                    entity_id,
                    component_id,
                    type_id,
                    change: resolved,
                },
            );
        }
        entity
            .take_component(component_id)
            .ok_or(SceneError::Entity(EntityError::ComponentNotFound {
                entity: entity_id,
                id: component_id,
            }))
    }

    /// Removes every component, Placeable last.
    pub fn remove_all_components(&mut self, change: AttributeChange) -> Result<(), SceneError> {
        for component_id in self.entity().component_ids_for_removal() {
            self.remove_component(component_id, change)?;
        }
        Ok(())
    }

    /// Replaces an unacked component id with the server-assigned one.
    pub fn change_component_id(&mut self, old: u32, new: u32) -> Result<(), SceneError> {
        let (entity, listeners, _, _) = self.parts();
        entity.change_component_id(old, new)?;
        emit(
            listeners,
            SceneEvent::ComponentIdChanged {
                entity_id: entity.id(),
                old,
                new,
                change: AttributeChange::LocalOnly,
            },
        );
        Ok(())
    }

    /// Attaches a listener to one component of this entity.
    pub fn add_component_listener(
        &mut self,
        component_id: u32,
        listener: Box<dyn ComponentListener>,
    ) -> Result<(), SceneError> {
        let (entity, _, _, _) = self.parts();
        Self::component_mut(entity, component_id)?.add_listener(listener);
        Ok(())
    }

    // Attributes

    pub fn set_attribute(
        &mut self,
        component_id: u32,
        index: u8,
        value: AttributeValue,
        change: AttributeChange,
    ) -> Result<Option<AttributeChange>, SceneError> {
        let (entity, listeners, _, _) = self.parts();
        let entity_id = entity.id();
        let component = Self::component_mut(entity, component_id)?;
        let fired = component.try_set_attribute(index, value, change)?;
        if let Some(scope) = fired {
            Self::emit_changed(listeners, component, entity_id, index, scope);
        }
        Ok(fired)
    }

    pub fn set_attribute_by_name(
        &mut self,
        component_id: u32,
        name: &str,
        value: AttributeValue,
        change: AttributeChange,
    ) -> Result<Option<AttributeChange>, SceneError> {
        let index = self
            .entity()
            .component_by_id(component_id)
            .and_then(|component| component.attribute_index(name))
            .ok_or_else(|| crate::component::ComponentError::AttributeNotFound {
                type_name: self.component_type_name(component_id),
                attribute: name.to_string(),
            })?;
        self.set_attribute(component_id, index, value, change)
    }

    /// Decodes one attribute value from the reader and assigns it.
    pub fn read_attribute(
        &mut self,
        component_id: u32,
        index: u8,
        reader: &mut Deserializer,
        change: AttributeChange,
    ) -> Result<Option<AttributeChange>, SceneError> {
        let (entity, listeners, _, _) = self.parts();
        let entity_id = entity.id();
        let component = Self::component_mut(entity, component_id)?;
        let fired = component.read_attribute(index, reader, change)?;
        if let Some(scope) = fired {
            Self::emit_changed(listeners, component, entity_id, index, scope);
        }
        Ok(fired)
    }

    /// Applies full-update bytes to an existing component and announces
    /// every attribute whose value changed.
    pub fn apply_full_update(
        &mut self,
        component_id: u32,
        reader: &mut Deserializer,
        change: AttributeChange,
    ) -> Result<Vec<u8>, SceneError> {
        let (entity, listeners, _, _) = self.parts();
        let entity_id = entity.id();
        let component = Self::component_mut(entity, component_id)?;
        let changed = component.deserialize_from_binary(reader)?;
        let resolved = component.resolve_change(change);
        if !resolved.is_disconnected() {
            for index in &changed {
                component.notify_attribute_changed(*index, resolved);
                Self::emit_changed(listeners, component, entity_id, *index, resolved);
            }
        }
        Ok(changed)
    }

    pub fn create_attribute(
        &mut self,
        component_id: u32,
        type_id: AttributeTypeId,
        name: &str,
        change: AttributeChange,
    ) -> Result<u8, SceneError> {
        let (entity, listeners, _, _) = self.parts();
        let entity_id = entity.id();
        let component = Self::component_mut(entity, component_id)?;
        let index = component.create_attribute(type_id, name, change)?;
        Self::emit_added(listeners, component, entity_id, index, change);
        Ok(index)
    }

    /// Dynamic attribute at a fixed index with an initial value, as received
    /// from the wire.
    pub fn create_attribute_with_value(
        &mut self,
        component_id: u32,
        index: u8,
        name: &str,
        value: AttributeValue,
        change: AttributeChange,
    ) -> Result<(), SceneError> {
        let (entity, listeners, _, _) = self.parts();
        let entity_id = entity.id();
        let component = Self::component_mut(entity, component_id)?;
        component.create_attribute_with_value(index, name, value, change)?;
        Self::emit_added(listeners, component, entity_id, index, change);
        Ok(())
    }

    pub fn remove_attribute(&mut self, component_id: u32, index: u8, change: AttributeChange) -> Result<(), SceneError> {
        let (entity, listeners, _, _) = self.parts();
        let entity_id = entity.id();
        let component = Self::component_mut(entity, component_id)?;
        let resolved = component.resolve_change(change);
        let removed = component.remove_attribute(index, change)?;
        if !resolved.is_disconnected() {
            emit(
                listeners,
                SceneEvent::AttributeRemoved {
                    entity_id,
                    component_id,
                    index,
                    name: removed.id().to_string(),
                    change: resolved,
                },
            );
        }
        Ok(())
    }

    // Entity state

    /// Sets or clears the parent. An entity cannot become its own ancestor.
    pub fn set_parent(&mut self, parent: Option<u32>, change: AttributeChange) -> Result<(), SceneError> {
        let entity_id = self.id();
        if let Some(parent_id) = parent {
            let mut ancestor = Some(parent_id);
            while let Some(current) = ancestor {
                if current == entity_id {
                    let err = EntityError::CyclicParent {
                        entity: entity_id,
                        parent: parent_id,
                    };
                    log::error!("{}", err);
                    return Err(err.into());
                }
                ancestor = self
                    .scene
                    .entity_by_id(current)
                    .ok_or(SceneError::EntityNotFound { id: current })?
                    .parent();
            }
        }

        let (entity, listeners, _, _) = self.parts();
        if entity.parent() == parent {
            return Ok(());
        }
        entity.set_parent(parent);
        let resolved = change.resolve(entity.is_local());
        if !resolved.is_disconnected() {
            emit(
                listeners,
                SceneEvent::ParentChanged {
                    entity_id,
                    parent,
                    change: resolved,
                },
            );
        }
        Ok(())
    }

    pub fn set_temporary(&mut self, temporary: bool) {
        let (entity, _, _, _) = self.parts();
        entity.set_temporary(temporary);
    }

    /// Publishes an action on this entity.
    pub fn trigger_action(&mut self, name: &str, parameters: Vec<String>, exec_type: ExecType) {
        let (entity, listeners, _, _) = self.parts();
        let action = EntityAction::new(entity.id(), name, exec_type, parameters);
        emit(listeners, SceneEvent::ActionTriggered { action });
    }

    fn component_type_name(&self, component_id: u32) -> String {
        self.entity()
            .component_by_id(component_id)
            .map(|component| component.type_name().to_string())
            .unwrap_or_default()
    }

    fn emit_changed(
        listeners: &mut [Box<dyn SceneListener>],
        component: &Component,
        entity_id: u32,
        index: u8,
        change: AttributeChange,
    ) {
        if let Some(value) = component.value(index) {
            emit(
                listeners,
                SceneEvent::AttributeChanged {
                    entity_id,
                    component_id: component.id(),
                    index,
                    value: value.clone(),
                    change,
                },
            );
        }
    }

    fn emit_added(
        listeners: &mut [Box<dyn SceneListener>],
        component: &Component,
        entity_id: u32,
        index: u8,
        change: AttributeChange,
    ) {
        let resolved = component.resolve_change(change);
        if !resolved.is_disconnected() {
            emit(
                listeners,
                SceneEvent::AttributeAdded {
                    entity_id,
                    component_id: component.id(),
                    index,
                    change: resolved,
                },
            );
        }
    }
}
