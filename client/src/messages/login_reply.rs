use tundra_shared::{
    message_id::{self, MessageId},
    BitWrite, Deserializer, ProtocolVersion, SerdeErr,
};

use super::{IncomingMessage, NetworkMessage};

/// Server answer to a login. The protocol version is only present from
/// servers that speak a newer revision than `Original`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginReplyMessage {
    pub success: bool,
    pub connection_id: u32,
    pub reply_data: String,
    pub protocol_version: ProtocolVersion,
}

impl IncomingMessage for LoginReplyMessage {
    const ID: MessageId = message_id::LOGIN_REPLY;

    fn deserialize(reader: &mut Deserializer) -> Result<Self, SerdeErr> {
        let success = reader.read_bool()?;
        let connection_id = reader.read_vle()?;
        let reply_data = reader.read_string_u16()?;
        let protocol_version = if reader.bytes_left() >= 1 {
            ProtocolVersion::from_u32_saturating(reader.read_vle()?)
        } else {
            ProtocolVersion::Original
        };
        Ok(Self {
            success,
            connection_id,
            reply_data,
            protocol_version,
        })
    }
}

impl NetworkMessage for LoginReplyMessage {
    fn id(&self) -> MessageId {
        message_id::LOGIN_REPLY
    }

    fn write_body(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        writer.write_bool(self.success)?;
        writer.write_vle(self.connection_id)?;
        writer.write_string_u16(&self.reply_data)?;
        writer.write_vle(self.protocol_version.to_u32())
    }
}
