use tundra_shared::{
    is_unacked_id, AttributeChange, BitWrite, Component, Deserializer, EntityMut, RegistryError,
    Scene, SceneError, SerdeErr, FIRST_UNACKED_ID,
};

use crate::messages::{read_sized_block, write_sized_block};

/// Id as written on the wire. Unacked ids travel as an offset into the
/// unacked range so they fit a VLE.
pub fn wire_id(id: u32) -> u32 {
    if is_unacked_id(id) {
        id - FIRST_UNACKED_ID
    } else {
        id
    }
}

/// Component id, type id, name and the sized full-update block.
pub fn write_component_full_update(writer: &mut dyn BitWrite, component: &Component) -> Result<(), SerdeErr> {
    writer.write_vle(wire_id(component.id()))?;
    writer.write_vle(component.type_id().get())?;
    writer.write_string_u8(component.name())?;
    write_sized_block(writer, |block| component.serialize_to_binary(block))
}

/// Reads one component full update into `entity_id`. An existing component
/// with the same id and type is updated in place, otherwise one is created.
/// Unknown component types are skipped.
pub fn read_component_full_update(
    scene: &mut Scene,
    entity_id: u32,
    reader: &mut Deserializer,
) -> Result<(), SceneError> {
    let component_id = reader.read_vle().map_err(component_codec)?;
    let type_id = reader.read_vle().map_err(component_codec)?;
    let name = reader.read_string_u8().map_err(component_codec)?;
    let mut block = read_sized_block(reader).map_err(component_codec)?;

    let mut entity = scene
        .entity_mut(entity_id)
        .ok_or(SceneError::EntityNotFound { id: entity_id })?;
    let existing = entity
        .entity()
        .component_by_id(component_id)
        .map(|component| component.type_id().get() == type_id);

    match existing {
        Some(true) => {
            entity.apply_full_update(component_id, &mut block, AttributeChange::LocalOnly)?;
        }
        Some(false) => {
            log::warn!(
                "component {} of entity {} changed type to {}, replacing it",
                component_id,
                entity_id,
                type_id
            );
            entity.remove_component(component_id, AttributeChange::LocalOnly)?;
            create_from_block(&mut entity, type_id, component_id, &name, &mut block)?;
        }
        None => create_from_block(&mut entity, type_id, component_id, &name, &mut block)?,
    }
    Ok(())
}

fn create_from_block(
    entity: &mut EntityMut<'_>,
    type_id: u32,
    component_id: u32,
    name: &str,
    block: &mut Deserializer,
) -> Result<(), SceneError> {
    match entity.create_component_from_binary(type_id, component_id, name, block, AttributeChange::LocalOnly) {
        Ok(_) => Ok(()),
        Err(SceneError::Registry(RegistryError::UnknownTypeId { type_id })) => {
            log::warn!(
                "skipped component {} of unknown type {} on entity {}",
                component_id,
                type_id,
                entity.id()
            );
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn component_codec(err: SerdeErr) -> SceneError {
    SceneError::Component(err.into())
}
