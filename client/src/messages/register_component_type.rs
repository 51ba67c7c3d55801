use tundra_shared::{
    message_id::{self, MessageId},
    AttributeError, AttributeTypeId, BitWrite, ComponentSchema, Deserializer, SerdeErr,
};

use super::{IncomingMessage, NetworkMessage};

/// One attribute of an announced type. The type id stays raw until the
/// schema is built, so unknown ids surface as attribute errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncedAttribute {
    pub type_id: u8,
    pub id: String,
    pub name: String,
}

/// Announces a custom component type and its static attributes. Sent both
/// ways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterComponentTypeMessage {
    pub type_id: u32,
    pub type_name: String,
    pub attributes: Vec<AnnouncedAttribute>,
}

impl RegisterComponentTypeMessage {
    pub fn from_schema(type_id: u32, type_name: &str, schema: &ComponentSchema) -> Self {
        let attributes = schema
            .attributes()
            .iter()
            .map(|decl| AnnouncedAttribute {
                type_id: decl.type_id.to_u8(),
                id: decl.id.clone(),
                name: decl.name.clone(),
            })
            .collect();
        Self {
            type_id,
            type_name: type_name.to_string(),
            attributes,
        }
    }

    pub fn to_schema(&self) -> Result<ComponentSchema, AttributeError> {
        self.attributes.iter().try_fold(ComponentSchema::new(), |schema, attribute| {
            let type_id = AttributeTypeId::from_u8(attribute.type_id).ok_or(AttributeError::UnknownType {
                type_id: attribute.type_id,
            })?;
            Ok(schema.attribute(type_id, &attribute.id, &attribute.name))
        })
    }
}

impl NetworkMessage for RegisterComponentTypeMessage {
    fn id(&self) -> MessageId {
        message_id::REGISTER_COMPONENT_TYPE
    }

    fn write_body(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        writer.write_vle(self.type_id)?;
        writer.write_string_u8(&self.type_name)?;
        writer.write_vle(self.attributes.len() as u32)?;
        for attribute in &self.attributes {
            writer.write_u8(attribute.type_id)?;
            writer.write_string_u8(&attribute.id)?;
            writer.write_string_u8(&attribute.name)?;
        }
        Ok(())
    }
}

impl IncomingMessage for RegisterComponentTypeMessage {
    const ID: MessageId = message_id::REGISTER_COMPONENT_TYPE;

    fn deserialize(reader: &mut Deserializer) -> Result<Self, SerdeErr> {
        let type_id = reader.read_vle()?;
        let type_name = reader.read_string_u8()?;
        let count = reader.read_vle()?;
        let mut attributes = Vec::new();
        for _ in 0..count {
            attributes.push(AnnouncedAttribute {
                type_id: reader.read_u8()?,
                id: reader.read_string_u8()?,
                name: reader.read_string_u8()?,
            });
        }
        Ok(Self {
            type_id,
            type_name,
            attributes,
        })
    }
}
