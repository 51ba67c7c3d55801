use tundra_shared::{
    message_id::{self, MessageId},
    BitWrite, Deserializer, EntityAction, ExecType, SerdeErr, StringHeader,
};

use super::{IncomingMessage, NetworkMessage};

/// An entity action travelling between client and server. Names and
/// parameters are single-byte strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityActionMessage {
    pub action: EntityAction,
}

impl EntityActionMessage {
    pub fn new(action: EntityAction) -> Self {
        Self { action }
    }
}

impl NetworkMessage for EntityActionMessage {
    fn id(&self) -> MessageId {
        message_id::ENTITY_ACTION
    }

    /// Only the server and peers bits of the execution type are sent.
    fn write_body(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        writer.write_u32(self.action.entity_id)?;
        writer.write_string_latin1(&self.action.name, StringHeader::U8)?;
        writer.write_u8(self.action.exec_type.remote().bits())?;
        let count = u8::try_from(self.action.parameters.len()).unwrap_or(u8::MAX);
        writer.write_u8(count)?;
        for parameter in self.action.parameters.iter().take(usize::from(count)) {
            writer.write_string_latin1(parameter, StringHeader::Vle)?;
        }
        Ok(())
    }
}

impl IncomingMessage for EntityActionMessage {
    const ID: MessageId = message_id::ENTITY_ACTION;

    fn deserialize(reader: &mut Deserializer) -> Result<Self, SerdeErr> {
        let entity_id = reader.read_u32()?;
        let name = reader.read_string_latin1(StringHeader::U8)?;
        let exec_type = ExecType::from_bits(reader.read_u8()?);
        let count = reader.read_u8()?;
        let mut parameters = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            parameters.push(reader.read_string_latin1(StringHeader::Vle)?);
        }
        Ok(Self::new(EntityAction::new(entity_id, &name, exec_type, parameters)))
    }
}
