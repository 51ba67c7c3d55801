use tundra_shared::{
    message_id::{self, MessageId},
    BitWrite, Deserializer, SerdeErr,
};

use super::{IncomingMessage, NetworkMessage};

/// Another client joined the server. Newer servers append the username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientJoinedMessage {
    pub connection_id: u32,
    pub username: Option<String>,
}

/// Another client left the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientLeftMessage {
    pub connection_id: u32,
}

impl IncomingMessage for ClientJoinedMessage {
    const ID: MessageId = message_id::CLIENT_JOINED;

    fn deserialize(reader: &mut Deserializer) -> Result<Self, SerdeErr> {
        let connection_id = reader.read_vle()?;
        let username = if reader.bytes_left() >= 2 {
            Some(reader.read_string_u16()?)
        } else {
            None
        };
        Ok(Self {
            connection_id,
            username,
        })
    }
}

impl NetworkMessage for ClientJoinedMessage {
    fn id(&self) -> MessageId {
        message_id::CLIENT_JOINED
    }

    fn write_body(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        writer.write_vle(self.connection_id)?;
        if let Some(username) = &self.username {
            writer.write_string_u16(username)?;
        }
        Ok(())
    }
}

impl IncomingMessage for ClientLeftMessage {
    const ID: MessageId = message_id::CLIENT_LEFT;

    fn deserialize(reader: &mut Deserializer) -> Result<Self, SerdeErr> {
        Ok(Self {
            connection_id: reader.read_vle()?,
        })
    }
}

impl NetworkMessage for ClientLeftMessage {
    fn id(&self) -> MessageId {
        message_id::CLIENT_LEFT
    }

    fn write_body(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        writer.write_vle(self.connection_id)
    }
}
