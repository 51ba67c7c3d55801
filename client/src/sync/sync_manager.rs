use std::collections::{BTreeSet, HashMap};

use tundra_shared::{
    is_local_id, message_id, AttributeChange, Entity, EntityAction, ProtocolVersion, Scene,
    SceneEvent, SceneEventLog, SerdeErr,
};

use crate::{
    messages::{
        write_sized_block, EntityActionMessage, NetworkMessage, OutgoingMessage,
        RegisterComponentTypeMessage, SetEntityParentMessage,
    },
    sync::{
        sync_state::SyncState,
        wire::{wire_id, write_component_full_update},
    },
};

// index method edits carry a u8 count
const MAX_EDITS_PER_MESSAGE: usize = u8::MAX as usize;

/// Collects replicated scene changes from the event log and turns them into
/// outbound scene messages.
pub struct SyncManager {
    events: SceneEventLog,
    scene_state: SyncState<u32>,
    entity_states: HashMap<u32, SyncState<u32>>,
    component_states: HashMap<(u32, u32), SyncState<u8>>,
    actions: Vec<EntityAction>,
    component_types: BTreeSet<u32>,
}

impl SyncManager {
    /// Starts listening to `scene`.
    pub fn new(scene: &mut Scene) -> Self {
        Self {
            events: scene.event_log(),
            scene_state: SyncState::new(),
            entity_states: HashMap::new(),
            component_states: HashMap::new(),
            actions: Vec::new(),
            component_types: BTreeSet::new(),
        }
    }

    pub fn scene_state(&self) -> &SyncState<u32> {
        &self.scene_state
    }

    pub fn entity_state(&self, entity_id: u32) -> Option<&SyncState<u32>> {
        self.entity_states.get(&entity_id)
    }

    pub fn component_state(&self, entity_id: u32, component_id: u32) -> Option<&SyncState<u8>> {
        self.component_states.get(&(entity_id, component_id))
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.events.is_empty()
            || !self.scene_state.is_empty()
            || !self.actions.is_empty()
            || !self.component_types.is_empty()
    }

    /// Queues a custom component type announcement.
    pub fn replicate_component_type(&mut self, type_id: u32) {
        self.component_types.insert(type_id);
    }

    /// Folds queued scene events into the sync states. Only replicated
    /// changes to non-local ids count; id changes re-key existing state.
    pub fn process_events(&mut self) {
        for event in self.events.drain() {
            self.process_event(event);
        }
    }

    fn process_event(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::EntityIdChanged { old, new, .. } => {
                self.scene_state.rename(old, new);
                if let Some(state) = self.entity_states.remove(&old) {
                    self.entity_states.insert(new, state);
                }
                let moved: Vec<(u32, u32)> = self
                    .component_states
                    .keys()
                    .filter(|(entity_id, _)| *entity_id == old)
                    .copied()
                    .collect();
                for key in moved {
                    if let Some(state) = self.component_states.remove(&key) {
                        self.component_states.insert((new, key.1), state);
                    }
                }
            }
            SceneEvent::ComponentIdChanged {
                entity_id, old, new, ..
            } => {
                if let Some(state) = self.entity_states.get_mut(&entity_id) {
                    state.rename(old, new);
                }
                if let Some(state) = self.component_states.remove(&(entity_id, old)) {
                    self.component_states.insert((entity_id, new), state);
                }
            }
            SceneEvent::ActionTriggered { action } => {
                if !action.exec_type.remote().is_empty() {
                    self.actions.push(action);
                }
            }
            event => {
                let replicated = event.change().is_some_and(AttributeChange::replicates);
                if replicated && !is_local_id(event.entity_id()) {
                    self.process_replicated(event);
                }
            }
        }
    }

    fn process_replicated(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::EntityCreated { entity_id, .. } => {
                self.scene_state.add_created(entity_id);
            }
            SceneEvent::EntityRemoved { entity_id, .. } => {
                self.forget_entity(entity_id);
                if self.scene_state.is_created(entity_id) {
                    // the server never heard of it
                    self.scene_state.remove_created(entity_id);
                } else {
                    self.scene_state.add_removed(entity_id);
                }
            }
            SceneEvent::ComponentAdded {
                entity_id,
                component_id,
                ..
            } if !is_local_id(component_id) => {
                self.scene_state.add_modified(entity_id);
                self.update_entity_state(entity_id, |state| state.add_created(component_id));
            }
            SceneEvent::ComponentRemoved {
                entity_id,
                component_id,
                ..
            } if !is_local_id(component_id) => {
                self.component_states.remove(&(entity_id, component_id));
                if self.scene_state.is_removed(entity_id) {
                    return;
                }
                self.scene_state.add_modified(entity_id);
                self.update_entity_state(entity_id, |state| {
                    if state.is_created(component_id) {
                        state.remove_created(component_id);
                    } else {
                        state.add_removed(component_id);
                    }
                });
            }
            SceneEvent::AttributeChanged {
                entity_id,
                component_id,
                index,
                ..
            } if !is_local_id(component_id) => {
                self.update_component_state(entity_id, component_id, |state| state.add_modified(index));
            }
            SceneEvent::AttributeAdded {
                entity_id,
                component_id,
                index,
                ..
            } if !is_local_id(component_id) => {
                self.update_component_state(entity_id, component_id, |state| state.add_created(index));
            }
            SceneEvent::AttributeRemoved {
                entity_id,
                component_id,
                index,
                ..
            } if !is_local_id(component_id) => {
                self.update_component_state(entity_id, component_id, |state| state.add_removed(index));
            }
            SceneEvent::ParentChanged { entity_id, .. } => {
                self.scene_state.add_modified(entity_id);
                self.update_entity_state(entity_id, |state| state.parent_changed = true);
            }
            _ => {}
        }
    }

    fn update_entity_state<F: FnOnce(&mut SyncState<u32>)>(&mut self, entity_id: u32, update: F) {
        update(self.entity_states.entry(entity_id).or_default());
    }

    fn update_component_state<F: FnOnce(&mut SyncState<u8>)>(&mut self, entity_id: u32, component_id: u32, update: F) {
        self.scene_state.add_modified(entity_id);
        self.update_entity_state(entity_id, |state| state.add_modified(component_id));
        update(self.component_states.entry((entity_id, component_id)).or_default());
    }

    fn forget_entity(&mut self, entity_id: u32) {
        self.entity_states.remove(&entity_id);
        self.component_states.retain(|(owner, _), _| *owner != entity_id);
    }

    /// Builds the messages for everything pending, in the order the server
    /// expects: type announcements, entity removals, entity creations, then
    /// per entity component removals and creations, attribute removals,
    /// creations and edits, the parent, and finally actions.
    ///
    /// A message that cannot be encoded is logged and dropped; the rest
    /// still go out.
    pub fn send_changes(&mut self, scene: &Scene, version: ProtocolVersion) -> Vec<OutgoingMessage> {
        self.process_events();
        let mut messages = Vec::new();

        let component_types = std::mem::take(&mut self.component_types);
        if version >= ProtocolVersion::CustomComponents {
            for type_id in component_types {
                let registry = scene.registry();
                let (Some(type_name), Some(schema)) = (registry.type_name(type_id), registry.schema(type_id)) else {
                    log::warn!("Component type {} not found for replication", type_id);
                    continue;
                };
                let message = RegisterComponentTypeMessage::from_schema(type_id, type_name, schema).serialize();
                push_message(&mut messages, message, "RegisterComponentType", type_id);
                log::debug!("Sent RegisterComponentType message for type {} ({})", type_name, type_id);
            }
        } else if !component_types.is_empty() {
            log::warn!("Server protocol {:?} cannot register custom component types", version);
        }

        for entity_id in self.scene_state.take_removed() {
            self.forget_entity(entity_id);
            let message = OutgoingMessage::build(message_id::REMOVE_ENTITY, |writer| {
                writer.write_vle(0)?;
                writer.write_vle(wire_id(entity_id))
            });
            push_message(&mut messages, message, "RemoveEntity", entity_id);
            log::debug!("Sent RemoveEntity message for entity id {}", entity_id);
        }

        for entity_id in self.scene_state.take_created() {
            self.scene_state.remove_modified(entity_id);
            self.forget_entity(entity_id);
            let Some(entity) = scene.entity_by_id(entity_id) else {
                log::warn!("Entity id {} not found for sending create", entity_id);
                continue;
            };
            push_message(&mut messages, create_entity_message(entity, version), "CreateEntity", entity_id);
            log::debug!("Sent CreateEntity message for entity id {}", entity_id);
        }

        for entity_id in self.scene_state.take_modified() {
            let Some(mut state) = self.entity_states.remove(&entity_id) else {
                continue;
            };
            let Some(entity) = scene.entity_by_id(entity_id) else {
                log::warn!("Entity id {} not found for sending modify", entity_id);
                continue;
            };
            self.entity_changes(entity, &mut state, version, &mut messages);
        }

        for action in std::mem::take(&mut self.actions) {
            log::debug!("Sent EntityAction {} for entity id {}", action.name, action.entity_id);
            let entity_id = action.entity_id;
            push_message(&mut messages, EntityActionMessage::new(action).serialize(), "EntityAction", entity_id);
        }
        messages
    }

    fn entity_changes(
        &mut self,
        entity: &Entity,
        state: &mut SyncState<u32>,
        version: ProtocolVersion,
        messages: &mut Vec<OutgoingMessage>,
    ) {
        let entity_id = entity.id();

        for component_id in state.take_removed() {
            let message = OutgoingMessage::build(message_id::REMOVE_COMPONENTS, |writer| {
                writer.write_vle(0)?;
                writer.write_vle(wire_id(entity_id))?;
                writer.write_vle(wire_id(component_id))
            });
            push_message(messages, message, "RemoveComponents", entity_id);
        }

        for component_id in state.take_created() {
            self.component_states.remove(&(entity_id, component_id));
            let Some(component) = entity.component_by_id(component_id) else {
                log::warn!(
                    "Component id {} not found in entity id {} for sending create",
                    component_id,
                    entity_id
                );
                continue;
            };
            if component.is_local() {
                continue;
            }
            let message = OutgoingMessage::build(message_id::CREATE_COMPONENTS, |writer| {
                writer.write_vle(0)?;
                writer.write_vle(wire_id(entity_id))?;
                write_component_full_update(writer, component)
            });
            push_message(messages, message, "CreateComponents", entity_id);
        }

        for component_id in state.take_modified() {
            let Some(mut component_state) = self.component_states.remove(&(entity_id, component_id)) else {
                continue;
            };
            let Some(component) = entity.component_by_id(component_id) else {
                log::warn!(
                    "Component id {} not found in entity id {} for sending modify",
                    component_id,
                    entity_id
                );
                continue;
            };
            let (entity_wire, component_wire) = (wire_id(entity_id), wire_id(component_id));

            for index in component_state.take_removed() {
                let message = OutgoingMessage::build(message_id::REMOVE_ATTRIBUTES, |writer| {
                    writer.write_vle(0)?;
                    writer.write_vle(entity_wire)?;
                    writer.write_vle(component_wire)?;
                    writer.write_u8(index)
                });
                push_message(messages, message, "RemoveAttributes", entity_id);
            }

            let created = component_state.take_created();
            for index in &created {
                let Some(attribute) = component.attribute(*index) else {
                    continue;
                };
                let message = OutgoingMessage::build(message_id::CREATE_ATTRIBUTES, |writer| {
                    writer.write_vle(0)?;
                    writer.write_vle(entity_wire)?;
                    writer.write_vle(component_wire)?;
                    writer.write_u8(*index)?;
                    writer.write_u8(attribute.type_id().to_u8())?;
                    writer.write_string_u8(attribute.name())?;
                    attribute.to_binary(writer)
                });
                push_message(messages, message, "CreateAttributes", entity_id);
            }

            // values of just created attributes already went out
            let edited: Vec<u8> = component_state
                .take_modified()
                .into_iter()
                .filter(|index| !created.contains(index) && component.attribute(*index).is_some())
                .collect();
            for chunk in edited.chunks(MAX_EDITS_PER_MESSAGE) {
                let message = OutgoingMessage::build(message_id::EDIT_ATTRIBUTES, |writer| {
                    writer.write_vle(0)?;
                    writer.write_vle(entity_wire)?;
                    writer.write_vle(component_wire)?;
                    write_sized_block(writer, |block| {
                        // index method
                        block.write_bit(false)?;
                        block.write_u8(chunk.len() as u8)?;
                        for index in chunk {
                            block.write_u8(*index)?;
                            if let Some(attribute) = component.attribute(*index) {
                                attribute.to_binary(block)?;
                            }
                        }
                        Ok(())
                    })
                });
                push_message(messages, message, "EditAttributes", entity_id);
            }
        }

        if state.parent_changed {
            if version >= ProtocolVersion::HierarchicScene {
                let message = SetEntityParentMessage {
                    entity_id,
                    parent: entity.parent(),
                };
                push_message(messages, message.serialize(), "SetEntityParent", entity_id);
                log::debug!("Sent SetEntityParent message for entity id {}", entity_id);
            }
            state.parent_changed = false;
        }
    }

    /// Drops all pending work and queued events.
    pub fn reset(&mut self) {
        self.events.clear();
        self.scene_state.clear();
        self.entity_states.clear();
        self.component_states.clear();
        self.actions.clear();
        self.component_types.clear();
    }
}

fn push_message(messages: &mut Vec<OutgoingMessage>, message: Result<OutgoingMessage, SerdeErr>, kind: &str, id: u32) {
    match message {
        Ok(message) => messages.push(message),
        Err(err) => log::error!("Dropped {} message for id {}: {}", kind, id, err),
    }
}

fn create_entity_message(entity: &Entity, version: ProtocolVersion) -> Result<OutgoingMessage, SerdeErr> {
    let components: Vec<_> = entity.components().filter(|component| !component.is_local()).collect();
    OutgoingMessage::build(message_id::CREATE_ENTITY, |writer| {
        writer.write_vle(0)?;
        writer.write_vle(wire_id(entity.id()))?;
        writer.write_bool(entity.is_temporary())?;
        if version >= ProtocolVersion::HierarchicScene {
            writer.write_u32(entity.parent().unwrap_or(0))?;
        }
        writer.write_vle(components.len() as u32)?;
        for component in &components {
            write_component_full_update(writer, component)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tundra_shared::{
        AttributeTypeId, AttributeValue, ComponentRegistry, ComponentSchema, Deserializer, ExecType,
        FIRST_UNACKED_ID, MESH, NAME,
    };

    use super::*;
    use crate::messages::read_sized_block;

    fn scene() -> Scene {
        Scene::new(Arc::new(ComponentRegistry::tundra()))
    }

    fn ids(messages: &[OutgoingMessage]) -> Vec<u16> {
        messages.iter().map(OutgoingMessage::id).collect()
    }

    fn body(message: &OutgoingMessage) -> Deserializer<'_> {
        let mut reader = Deserializer::new(message.buffer().unwrap());
        reader.read_u16().unwrap();
        reader
    }

    #[test]
    fn local_and_server_changes_stay_home() {
        let mut scene = scene();
        let mut sync = SyncManager::new(&mut scene);
        scene.create_local_entity().unwrap();
        scene.create_entity(5, AttributeChange::LocalOnly).unwrap();
        let messages = sync.send_changes(&scene, ProtocolVersion::LATEST);
        assert!(messages.is_empty());
        assert!(!sync.has_pending_changes());
    }

    #[test]
    fn new_entity_is_sent_whole() {
        let mut scene = scene();
        let mut sync = SyncManager::new(&mut scene);
        let entity_id = {
            let mut entity = scene.create_unacked_entity().unwrap();
            let name = entity.create_component(NAME, 0, "", AttributeChange::Default).unwrap();
            entity.set_attribute(name, 0, "box".into(), AttributeChange::Default).unwrap();
            entity.id()
        };

        let messages = sync.send_changes(&scene, ProtocolVersion::LATEST);
        assert_eq!(ids(&messages), vec![message_id::CREATE_ENTITY]);
        let mut reader = body(&messages[0]);
        assert_eq!(reader.read_vle().unwrap(), 0);
        assert_eq!(reader.read_vle().unwrap(), entity_id - FIRST_UNACKED_ID);
        assert!(!reader.read_bool().unwrap());
        assert_eq!(reader.read_u32().unwrap(), 0);
        assert_eq!(reader.read_vle().unwrap(), 1);
        assert_eq!(reader.read_vle().unwrap(), 1, "component id as unacked offset");
        assert_eq!(reader.read_vle().unwrap(), NAME);

        // everything was consumed by the create
        assert!(sync.send_changes(&scene, ProtocolVersion::LATEST).is_empty());
    }

    #[test]
    fn unencodable_entity_does_not_hold_back_others() {
        let mut scene = scene();
        let mut sync = SyncManager::new(&mut scene);
        let good = {
            let mut entity = scene.create_unacked_entity().unwrap();
            entity.create_component(NAME, 0, "", AttributeChange::Default).unwrap();
            entity.id()
        };
        {
            let mut entity = scene.create_unacked_entity().unwrap();
            let mesh = entity.create_component(MESH, 0, "", AttributeChange::Default).unwrap();
            // too long for the u8 header of an asset reference
            let mesh_ref = AttributeValue::AssetReference("a".repeat(300));
            entity.set_attribute(mesh, 1, mesh_ref, AttributeChange::Default).unwrap();
        }

        let messages = sync.send_changes(&scene, ProtocolVersion::LATEST);
        assert_eq!(ids(&messages), vec![message_id::CREATE_ENTITY]);
        let mut reader = body(&messages[0]);
        assert_eq!(reader.read_vle().unwrap(), 0);
        assert_eq!(reader.read_vle().unwrap(), good - FIRST_UNACKED_ID);
        assert!(!sync.has_pending_changes());
    }

    #[test]
    fn attribute_edits_use_the_index_method() {
        let mut scene = scene();
        let mut entity = scene.create_entity(7, AttributeChange::LocalOnly).unwrap();
        entity.create_component(NAME, 3, "", AttributeChange::LocalOnly).unwrap();
        let mut sync = SyncManager::new(&mut scene);

        let mut entity = scene.entity_mut(7).unwrap();
        entity.set_attribute(3, 0, "renamed".into(), AttributeChange::Replicate).unwrap();
        entity.set_attribute(3, 2, "team".into(), AttributeChange::Replicate).unwrap();

        let messages = sync.send_changes(&scene, ProtocolVersion::LATEST);
        assert_eq!(ids(&messages), vec![message_id::EDIT_ATTRIBUTES]);
        let mut reader = body(&messages[0]);
        assert_eq!(reader.read_vle().unwrap(), 0);
        assert_eq!(reader.read_vle().unwrap(), 7);
        assert_eq!(reader.read_vle().unwrap(), 3);
        let mut block = read_sized_block(&mut reader).unwrap();
        assert!(!block.read_bit().unwrap());
        assert_eq!(block.read_u8().unwrap(), 2);
        assert_eq!(block.read_u8().unwrap(), 0);
        assert_eq!(
            AttributeValue::from_binary(AttributeTypeId::String, &mut block).unwrap(),
            AttributeValue::from("renamed")
        );
        assert_eq!(block.read_u8().unwrap(), 2);
        assert_eq!(reader.bytes_left(), 0);
    }

    #[test]
    fn message_order() {
        let mut scene = scene();
        scene.create_entity(1, AttributeChange::LocalOnly).unwrap();
        scene.create_entity(2, AttributeChange::LocalOnly).unwrap();
        scene
            .entity_mut(1)
            .unwrap()
            .create_component(NAME, 4, "", AttributeChange::LocalOnly)
            .unwrap();
        scene
            .register_component_type(4000, "Boat", ComponentSchema::new().attribute(AttributeTypeId::Real, "speed", "Speed"))
            .unwrap();
        let mut sync = SyncManager::new(&mut scene);

        sync.replicate_component_type(4000);
        scene.trigger_action(EntityAction::new(1, "Go", ExecType::SERVER, Vec::new())).unwrap();
        scene.create_unacked_entity().unwrap();
        scene.remove_entity(2, AttributeChange::Replicate).unwrap();
        {
            let mut entity = scene.entity_mut(1).unwrap();
            entity.set_attribute(4, 0, "x".into(), AttributeChange::Replicate).unwrap();
            entity.remove_component(4, AttributeChange::Replicate).unwrap();
            entity.create_component(NAME, 0, "", AttributeChange::Replicate).unwrap();
        }

        let messages = sync.send_changes(&scene, ProtocolVersion::LATEST);
        assert_eq!(
            ids(&messages),
            vec![
                message_id::REGISTER_COMPONENT_TYPE,
                message_id::REMOVE_ENTITY,
                message_id::CREATE_ENTITY,
                message_id::REMOVE_COMPONENTS,
                message_id::CREATE_COMPONENTS,
                message_id::ENTITY_ACTION,
            ]
        );
    }

    #[test]
    fn parent_change_needs_hierarchic_protocol() {
        let mut scene = scene();
        scene.create_entity(1, AttributeChange::LocalOnly).unwrap();
        scene.create_entity(2, AttributeChange::LocalOnly).unwrap();
        let mut sync = SyncManager::new(&mut scene);

        let mut child = scene.entity_mut(2).unwrap();
        child.set_parent(Some(1), AttributeChange::Replicate).unwrap();
        assert!(sync
            .send_changes(&scene, ProtocolVersion::CustomComponents)
            .is_empty());

        let mut child = scene.entity_mut(2).unwrap();
        child.set_parent(None, AttributeChange::Replicate).unwrap();
        let messages = sync.send_changes(&scene, ProtocolVersion::HierarchicScene);
        assert_eq!(ids(&messages), vec![message_id::SET_ENTITY_PARENT]);
    }

    #[test]
    fn id_change_rekeys_pending_state() {
        let mut scene = scene();
        let mut sync = SyncManager::new(&mut scene);
        let pending = scene.create_unacked_entity().unwrap().id();
        scene.change_entity_id(pending, 30).unwrap();
        sync.process_events();
        assert!(sync.scene_state().is_created(30));
        assert!(!sync.scene_state().is_created(pending));
    }

    #[test]
    fn created_then_removed_sends_nothing() {
        let mut scene = scene();
        let mut sync = SyncManager::new(&mut scene);
        let pending = scene.create_unacked_entity().unwrap().id();
        scene.remove_entity(pending, AttributeChange::Default).unwrap();
        assert!(sync.send_changes(&scene, ProtocolVersion::LATEST).is_empty());
    }

    #[test]
    fn reset_drops_everything() {
        let mut scene = scene();
        let mut sync = SyncManager::new(&mut scene);
        scene.create_unacked_entity().unwrap();
        sync.replicate_component_type(4000);
        assert!(sync.has_pending_changes());
        sync.reset();
        assert!(!sync.has_pending_changes());
        assert!(sync.send_changes(&scene, ProtocolVersion::LATEST).is_empty());
    }
}
