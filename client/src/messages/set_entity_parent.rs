use tundra_shared::{
    message_id::{self, MessageId},
    BitWrite, Deserializer, SerdeErr,
};

use super::{IncomingMessage, NetworkMessage};

/// Parents or unparents an entity. Ids are full u32 values, parent 0 means
/// no parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetEntityParentMessage {
    pub entity_id: u32,
    pub parent: Option<u32>,
}

impl NetworkMessage for SetEntityParentMessage {
    fn id(&self) -> MessageId {
        message_id::SET_ENTITY_PARENT
    }

    fn write_body(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        // scene id
        writer.write_vle(0)?;
        writer.write_u32(self.entity_id)?;
        writer.write_u32(self.parent.unwrap_or(0))
    }
}

impl IncomingMessage for SetEntityParentMessage {
    const ID: MessageId = message_id::SET_ENTITY_PARENT;

    fn deserialize(reader: &mut Deserializer) -> Result<Self, SerdeErr> {
        let _scene_id = reader.read_vle()?;
        let entity_id = reader.read_u32()?;
        let parent = reader.read_u32()?;
        Ok(Self {
            entity_id,
            parent: (parent != 0).then_some(parent),
        })
    }
}
