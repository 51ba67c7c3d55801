//! Inbound scene replication. Everything the server sends is applied as a
//! `LocalOnly` change so it is never replicated back.

use tundra_shared::{
    AttributeChange, AttributeError, AttributeTypeId, AttributeValue, ComponentError, Deserializer,
    EntityAction, ExecType, ProtocolVersion, SceneError, FIRST_UNACKED_ID,
};

use crate::{
    error::HandlerError,
    messages::{
        read_sized_block, EntityActionMessage, IncomingMessage, RegisterComponentTypeMessage,
        RigidBodyUpdateMessage, SetEntityParentMessage,
    },
    network::ClientContext,
    sync::{rigid_body::apply_rigid_body_update, wire::read_component_full_update},
};

const LOCAL: AttributeChange = AttributeChange::LocalOnly;

macro_rules! trace_debug {
    ($context:expr, $($arg:tt)*) => {
        if $context.debug {
            log::info!($($arg)*);
        } else {
            log::trace!($($arg)*);
        }
    };
}

fn entity_not_found(entity_id: u32, message: &str) {
    log::warn!("Entity id {} not found when handling {} message", entity_id, message);
}

fn component_not_found(entity_id: u32, component_id: u32, message: &str) {
    log::warn!(
        "Component id {} not found in entity id {} when handling {} message",
        component_id,
        entity_id,
        message
    );
}

pub(crate) fn create_entity(reader: &mut Deserializer, context: &mut ClientContext) -> Result<(), HandlerError> {
    let _scene_id = reader.read_vle()?;
    let entity_id = reader.read_vle()?;
    let temporary = reader.read_bool()?;
    let parent = if context.protocol_version >= ProtocolVersion::HierarchicScene {
        reader.read_u32()?
    } else {
        0
    };
    let count = reader.read_vle()?;

    context.scene.create_entity(entity_id, LOCAL)?.set_temporary(temporary);
    trace_debug!(context, "Created entity id {}", entity_id);

    if parent != 0 {
        if context.scene.contains(parent) {
            if let Some(mut entity) = context.scene.entity_mut(entity_id) {
                entity.set_parent(Some(parent), LOCAL)?;
            }
            trace_debug!(context, "Parented entity id {} to entity id {}", entity_id, parent);
        } else {
            log::warn!(
                "Parent entity id {} not found from scene when handling CreateEntity message",
                parent
            );
        }
    }

    for _ in 0..count {
        read_component_full_update(&mut context.scene, entity_id, reader)?;
    }
    Ok(())
}

pub(crate) fn create_components(reader: &mut Deserializer, context: &mut ClientContext) -> Result<(), HandlerError> {
    let _scene_id = reader.read_vle()?;
    let entity_id = reader.read_vle()?;
    if !context.scene.contains(entity_id) {
        entity_not_found(entity_id, "CreateComponents");
        return Ok(());
    }
    while reader.bytes_left() > 0 {
        read_component_full_update(&mut context.scene, entity_id, reader)?;
    }
    Ok(())
}

pub(crate) fn create_attributes(reader: &mut Deserializer, context: &mut ClientContext) -> Result<(), HandlerError> {
    let _scene_id = reader.read_vle()?;
    let entity_id = reader.read_vle()?;
    let Some(mut entity) = context.scene.entity_mut(entity_id) else {
        entity_not_found(entity_id, "CreateAttributes");
        return Ok(());
    };

    while reader.bytes_left() > 0 {
        let component_id = reader.read_vle()?;
        if entity.entity().component_by_id(component_id).is_none() {
            component_not_found(entity_id, component_id, "CreateAttributes");
            return Ok(());
        }
        let index = reader.read_u8()?;
        let raw_type = reader.read_u8()?;
        let type_id = AttributeTypeId::from_u8(raw_type).ok_or(AttributeError::UnknownType { type_id: raw_type })?;
        let name = reader.read_string_u8()?;
        let value = AttributeValue::from_binary(type_id, reader)?;

        match entity.create_attribute_with_value(component_id, index, &name, value, LOCAL) {
            Ok(()) => {
                trace_debug!(
                    context,
                    "Created attribute {} in component id {} entity id {}",
                    name,
                    component_id,
                    entity_id
                );
            }
            Err(SceneError::Component(err @ ComponentError::AttributeAlreadyExists { .. })) => {
                log::warn!("{}", err);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

pub(crate) fn edit_attributes(reader: &mut Deserializer, context: &mut ClientContext) -> Result<(), HandlerError> {
    let _scene_id = reader.read_vle()?;
    let entity_id = reader.read_vle()?;
    let Some(mut entity) = context.scene.entity_mut(entity_id) else {
        entity_not_found(entity_id, "EditAttributes");
        return Ok(());
    };

    while reader.bytes_left() > 0 {
        let component_id = reader.read_vle()?;
        let Some(component) = entity.entity().component_by_id(component_id) else {
            component_not_found(entity_id, component_id, "EditAttributes");
            return Ok(());
        };
        let implemented = component.is_implemented();
        let slot_count = component.slot_count();
        let mut block = read_sized_block(reader)?;
        if !implemented {
            continue;
        }

        let bitmask_method = block.read_bit()?;
        if bitmask_method {
            for index in (0..=u8::MAX).take(slot_count) {
                if block.read_bit()? {
                    entity.read_attribute(component_id, index, &mut block, LOCAL)?;
                }
            }
        } else {
            let count = block.read_u8()?;
            for _ in 0..count {
                let index = block.read_u8()?;
                entity.read_attribute(component_id, index, &mut block, LOCAL)?;
            }
        }
        trace_debug!(context, "Updated attributes of component id {} entity id {}", component_id, entity_id);
    }
    Ok(())
}

pub(crate) fn remove_attributes(reader: &mut Deserializer, context: &mut ClientContext) -> Result<(), HandlerError> {
    let _scene_id = reader.read_vle()?;
    let entity_id = reader.read_vle()?;
    let Some(mut entity) = context.scene.entity_mut(entity_id) else {
        entity_not_found(entity_id, "RemoveAttributes");
        return Ok(());
    };

    while reader.bytes_left() > 0 {
        let component_id = reader.read_vle()?;
        if entity.entity().component_by_id(component_id).is_none() {
            component_not_found(entity_id, component_id, "RemoveAttributes");
            return Ok(());
        }
        let index = reader.read_u8()?;
        entity.remove_attribute(component_id, index, LOCAL)?;
        trace_debug!(
            context,
            "Removed attribute index {} in component id {} entity id {}",
            index,
            component_id,
            entity_id
        );
    }
    Ok(())
}

pub(crate) fn remove_components(reader: &mut Deserializer, context: &mut ClientContext) -> Result<(), HandlerError> {
    let _scene_id = reader.read_vle()?;
    let entity_id = reader.read_vle()?;
    let Some(mut entity) = context.scene.entity_mut(entity_id) else {
        entity_not_found(entity_id, "RemoveComponents");
        return Ok(());
    };

    while reader.bytes_left() > 0 {
        let component_id = reader.read_vle()?;
        if entity.entity().component_by_id(component_id).is_none() {
            component_not_found(entity_id, component_id, "RemoveComponents");
            continue;
        }
        entity.remove_component(component_id, LOCAL)?;
        trace_debug!(context, "Removed component id {} in entity id {}", component_id, entity_id);
    }
    Ok(())
}

pub(crate) fn remove_entity(reader: &mut Deserializer, context: &mut ClientContext) -> Result<(), HandlerError> {
    let _scene_id = reader.read_vle()?;
    let entity_id = reader.read_vle()?;
    if !context.scene.contains(entity_id) {
        entity_not_found(entity_id, "RemoveEntity");
        return Ok(());
    }
    context.scene.remove_entity(entity_id, LOCAL)?;
    trace_debug!(context, "Removed entity id {}", entity_id);
    Ok(())
}

/// Reads `(unacked, server)` component id pairs and renames them.
fn rename_components(
    reader: &mut Deserializer,
    context: &mut ClientContext,
    entity_id: u32,
) -> Result<(), HandlerError> {
    let count = reader.read_vle()?;
    let mut renames = Vec::new();
    for _ in 0..count {
        let pending = reader.read_vle()? + FIRST_UNACKED_ID;
        let server = reader.read_vle()?;
        renames.push((pending, server));
    }
    let Some(mut entity) = context.scene.entity_mut(entity_id) else {
        return Ok(());
    };
    for (pending, server) in renames {
        entity.change_component_id(pending, server)?;
        trace_debug!(
            context,
            "Server sent authoritative component id {} for pending component id {}, reassigning",
            server,
            pending
        );
    }
    Ok(())
}

pub(crate) fn create_entity_reply(reader: &mut Deserializer, context: &mut ClientContext) -> Result<(), HandlerError> {
    let _scene_id = reader.read_vle()?;
    let pending = reader.read_vle()? + FIRST_UNACKED_ID;
    let server = reader.read_vle()?;
    if !context.scene.contains(pending) {
        entity_not_found(pending, "CreateEntityReply");
        return Ok(());
    }
    context.scene.change_entity_id(pending, server)?;
    trace_debug!(
        context,
        "Server sent authoritative entity id {} for pending entity id {}, reassigning",
        server,
        pending
    );
    rename_components(reader, context, server)
}

pub(crate) fn create_components_reply(
    reader: &mut Deserializer,
    context: &mut ClientContext,
) -> Result<(), HandlerError> {
    let _scene_id = reader.read_vle()?;
    let entity_id = reader.read_vle()?;
    if !context.scene.contains(entity_id) {
        entity_not_found(entity_id, "CreateComponentsReply");
        return Ok(());
    }
    rename_components(reader, context, entity_id)
}

pub(crate) fn rigid_body_update(reader: &mut Deserializer, context: &mut ClientContext) -> Result<(), HandlerError> {
    let message = RigidBodyUpdateMessage::deserialize(reader)?;
    for update in &message.updates {
        if !apply_rigid_body_update(&mut context.scene, update)? && context.debug {
            entity_not_found(update.entity_id, "RigidBodyUpdate");
        }
    }
    Ok(())
}

/// Runs a server or peer action locally. The exec type is forced to local so
/// the action does not travel back.
pub(crate) fn entity_action(reader: &mut Deserializer, context: &mut ClientContext) -> Result<(), HandlerError> {
    let EntityActionMessage { action } = EntityActionMessage::deserialize(reader)?;
    let local = EntityAction {
        exec_type: ExecType::LOCAL,
        ..action
    };
    let (entity_id, name) = (local.entity_id, local.name.clone());
    match context.scene.trigger_action(local) {
        Ok(()) => {
            trace_debug!(context, "Triggered action {} on entity id {}", name, entity_id);
            Ok(())
        }
        Err(SceneError::EntityNotFound { .. }) => {
            log::debug!("Entity id {} not found when handling EntityAction {}", entity_id, name);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn register_component_type(
    reader: &mut Deserializer,
    context: &mut ClientContext,
) -> Result<(), HandlerError> {
    let message = RegisterComponentTypeMessage::deserialize(reader)?;
    let schema = message.to_schema()?;
    let type_id = context
        .scene
        .register_component_type(message.type_id, &message.type_name, schema)?;
    log::info!("Registered component type {} ({})", message.type_name, type_id);
    Ok(())
}

pub(crate) fn set_entity_parent(reader: &mut Deserializer, context: &mut ClientContext) -> Result<(), HandlerError> {
    let SetEntityParentMessage { entity_id, parent } = SetEntityParentMessage::deserialize(reader)?;
    if let Some(parent) = parent {
        if !context.scene.contains(parent) {
            log::warn!(
                "Parent entity id {} not found when handling SetEntityParent message",
                parent
            );
            return Ok(());
        }
    }
    let Some(mut entity) = context.scene.entity_mut(entity_id) else {
        entity_not_found(entity_id, "SetEntityParent");
        return Ok(());
    };
    entity.set_parent(parent, LOCAL)?;
    match parent {
        Some(parent) => trace_debug!(context, "Parented entity id {} to entity id {}", entity_id, parent),
        None => trace_debug!(context, "Unparented entity id {}", entity_id),
    }
    Ok(())
}
