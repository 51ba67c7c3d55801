mod entity_mut;
mod error;
mod event;

pub use entity_mut::EntityMut;
pub use error::SceneError;
pub use event::{SceneEvent, SceneEventLog, SceneListener};

use std::{collections::HashMap, fmt, sync::Arc};

use event::emit;

use crate::{
    attribute::{AttributeChange, AttributeValue},
    component::{ComponentRegistry, ComponentSchema, RegistryError},
    entity::{id_range, is_local_id, is_unacked_id, Entity, EntityAction, IdRange, UniqueIdGenerator},
};

/// Stable reference to an arena slot. A handle outlives id changes of its
/// entity and goes stale once the entity is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    slot: u32,
    generation: u32,
}

struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Owner of all entities. Entities live in an arena and are found by wire id
/// through an index; every structural change is announced to listeners.
pub struct Scene {
    id: u32,
    registry: Arc<ComponentRegistry>,
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    handles: HashMap<u32, EntityHandle>,
    id_generator: UniqueIdGenerator,
    server_side_ids: bool,
    listeners: Vec<Box<dyn SceneListener>>,
}

impl Scene {
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self {
            id: 0,
            registry,
            slots: Vec::new(),
            free_slots: Vec::new(),
            handles: HashMap::new(),
            id_generator: UniqueIdGenerator::new(),
            server_side_ids: false,
            listeners: Vec::new(),
        }
    }

    /// Scene id as carried in scene messages.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// When set, id 0 allocates replicated ids instead of unacked ones.
    pub fn set_server_side_id_allocation(&mut self, server_side: bool) {
        self.server_side_ids = server_side;
    }

    pub fn is_server_side_id_allocation(&self) -> bool {
        self.server_side_ids
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Adds a component type announced at runtime. The registry is cloned
    /// first if it is shared with another scene.
    pub fn register_component_type(
        &mut self,
        type_id: u32,
        type_name: &str,
        schema: ComponentSchema,
    ) -> Result<u32, RegistryError> {
        Arc::make_mut(&mut self.registry).register_at_runtime(type_id, type_name, schema)
    }

    pub fn add_listener(&mut self, listener: Box<dyn SceneListener>) {
        self.listeners.push(listener);
    }

    /// Registers a new event log and returns a handle to it.
    pub fn event_log(&mut self) -> SceneEventLog {
        let log = SceneEventLog::new();
        self.add_listener(Box::new(log.clone()));
        log
    }

    // Lookup

    pub fn handle_of(&self, id: u32) -> Option<EntityHandle> {
        self.handles.get(&id).copied()
    }

    pub fn entity(&self, handle: EntityHandle) -> Option<&Entity> {
        let slot = self.slots.get(handle.slot as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entity.as_ref()
    }

    pub fn entity_by_id(&self, id: u32) -> Option<&Entity> {
        self.entity(self.handle_of(id)?)
    }

    /// First entity whose Name component carries `name`.
    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities().find(|entity| entity.name() == name)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.handles.contains_key(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter_map(|slot| slot.entity.as_ref())
    }

    pub fn entity_ids(&self) -> Vec<u32> {
        self.entities().map(Entity::id).collect()
    }

    pub fn entity_count(&self) -> usize {
        self.handles.len()
    }

    /// Direct children of `parent`.
    pub fn children(&self, parent: u32) -> impl Iterator<Item = &Entity> {
        self.entities().filter(move |entity| entity.parent() == Some(parent))
    }

    pub fn attribute_value(&self, entity_id: u32, component_id: u32, index: u8) -> Option<&AttributeValue> {
        self.entity_by_id(entity_id)?.attribute_value(component_id, index)
    }

    pub fn entity_mut(&mut self, id: u32) -> Option<EntityMut<'_>> {
        let handle = self.handle_of(id)?;
        Some(EntityMut::new(self, handle))
    }

    pub fn entity_mut_by_handle(&mut self, handle: EntityHandle) -> Option<EntityMut<'_>> {
        self.entity(handle)?;
        Some(EntityMut::new(self, handle))
    }

    // Entity lifecycle

    /// Creates an empty entity. Id 0 allocates: local for `LocalOnly`,
    /// otherwise replicated with server-side allocation and unacked without.
    pub fn create_entity(&mut self, id: u32, change: AttributeChange) -> Result<EntityMut<'_>, SceneError> {
        let id = if id == 0 { self.allocate_entity_id(change) } else { id };
        if self.handles.contains_key(&id) {
            return Err(SceneError::EntityIdInUse { id });
        }
        self.id_generator.observe(id);

        let handle = match self.free_slots.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                entry.generation = entry.generation.wrapping_add(1);
                entry.entity = Some(Entity::new(id));
                EntityHandle {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                // entity counts stay far below u32::MAX
                let slot = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entity: Some(Entity::new(id)),
                });
                EntityHandle { slot, generation: 0 }
            }
        };
        self.handles.insert(id, handle);

        let resolved = change.resolve(is_local_id(id));
        log::debug!("created entity {} ({:?})", id, resolved);
        if !resolved.is_disconnected() {
            emit(
                &mut self.listeners,
                SceneEvent::EntityCreated {
                    entity_id: id,
                    change: resolved,
                },
            );
        }
        Ok(EntityMut::new(self, handle))
    }

    pub fn create_local_entity(&mut self) -> Result<EntityMut<'_>, SceneError> {
        self.create_entity(0, AttributeChange::LocalOnly)
    }

    /// Entity with a temporary client-side id, to be replaced by the
    /// server's reply.
    pub fn create_unacked_entity(&mut self) -> Result<EntityMut<'_>, SceneError> {
        let id = self.next_free(UniqueIdGenerator::allocate_unacked);
        self.create_entity(id, AttributeChange::Replicate)
    }

    /// Announces the removal, tears down components and frees the slot.
    /// Children are detached silently.
    pub fn remove_entity(&mut self, id: u32, change: AttributeChange) -> Result<(), SceneError> {
        let handle = self.handle_of(id).ok_or(SceneError::EntityNotFound { id })?;
        let resolved = change.resolve(is_local_id(id));
        if !resolved.is_disconnected() {
            emit(
                &mut self.listeners,
                SceneEvent::EntityRemoved {
                    entity_id: id,
                    change: resolved,
                },
            );
        }
        EntityMut::new(self, handle).remove_all_components(resolved)?;

        self.handles.remove(&id);
        let slot = &mut self.slots[handle.slot as usize];
        slot.entity = None;
        self.free_slots.push(handle.slot);
        for entity in self.entities_mut() {
            if entity.parent() == Some(id) {
                entity.set_parent(None);
            }
        }
        log::debug!("removed entity {}", id);
        Ok(())
    }

    pub fn remove_all_entities(&mut self, change: AttributeChange) {
        for id in self.entity_ids() {
            if let Err(err) = self.remove_entity(id, change) {
                log::error!("{}", err);
            }
        }
    }

    /// Replaces an unacked id with the id the server assigned. The handle
    /// stays valid.
    pub fn change_entity_id(&mut self, old: u32, new: u32) -> Result<(), SceneError> {
        if !is_unacked_id(old) || id_range(new) != IdRange::Replicated {
            return Err(SceneError::InvalidIdChange { old, new });
        }
        if self.handles.contains_key(&new) {
            return Err(SceneError::EntityIdInUse { id: new });
        }
        let handle = self.handles.remove(&old).ok_or(SceneError::EntityNotFound { id: old })?;
        self.handles.insert(new, handle);
        self.id_generator.observe(new);
        for entity in self.entities_mut() {
            if entity.id() == old {
                entity.set_id(new);
            } else if entity.parent() == Some(old) {
                entity.set_parent(Some(new));
            }
        }
        emit(
            &mut self.listeners,
            SceneEvent::EntityIdChanged {
                old,
                new,
                change: AttributeChange::LocalOnly,
            },
        );
        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        entity_id: u32,
        component_id: u32,
        index: u8,
        value: AttributeValue,
        change: AttributeChange,
    ) -> Result<Option<AttributeChange>, SceneError> {
        self.entity_mut(entity_id)
            .ok_or(SceneError::EntityNotFound { id: entity_id })?
            .set_attribute(component_id, index, value, change)
    }

    /// Publishes an action to listeners. Local handlers react to the `LOCAL`
    /// bit, the sync manager forwards `SERVER` and `PEERS`.
    pub fn trigger_action(&mut self, action: EntityAction) -> Result<(), SceneError> {
        if !self.contains(action.entity_id) {
            return Err(SceneError::EntityNotFound { id: action.entity_id });
        }
        emit(&mut self.listeners, SceneEvent::ActionTriggered { action });
        Ok(())
    }

    fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().filter_map(|slot| slot.entity.as_mut())
    }

    fn allocate_entity_id(&mut self, change: AttributeChange) -> u32 {
        if change == AttributeChange::LocalOnly {
            self.next_free(UniqueIdGenerator::allocate_local)
        } else if self.server_side_ids {
            self.next_free(UniqueIdGenerator::allocate_replicated)
        } else {
            self.next_free(UniqueIdGenerator::allocate_unacked)
        }
    }

    fn next_free(&mut self, allocate: fn(&mut UniqueIdGenerator) -> u32) -> u32 {
        loop {
            let id = allocate(&mut self.id_generator);
            if !self.handles.contains_key(&id) {
                return id;
            }
        }
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("entities", &self.handles.len())
            .field("server_side_ids", &self.server_side_ids)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
