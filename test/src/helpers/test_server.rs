use tundra_client::{
    messages::{
        write_sized_block, IncomingMessage, LoginMessage, LoginReplyMessage, NetworkMessage,
        OutgoingMessage,
    },
    write_component_full_update,
};
use tundra_shared::{
    message_id, AttributeValue, BitWrite, Component, Deserializer, MessageId, ProtocolVersion,
};

use crate::local_transport::ServerEnd;

/// A message the client sent, id split from the body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub id: MessageId,
    pub body: Vec<u8>,
}

impl ReceivedMessage {
    fn parse(payload: Vec<u8>) -> Self {
        let id = u16::from_le_bytes([payload[0], payload[1]]);
        Self {
            id,
            body: payload[2..].to_vec(),
        }
    }

    /// Reader positioned after the message id
    pub fn reader(&self) -> Deserializer<'_> {
        Deserializer::new(&self.body)
    }

    pub fn decode<M: IncomingMessage>(&self) -> M {
        assert_eq!(self.id, M::ID, "decoding the wrong message type");
        M::deserialize(&mut self.reader()).unwrap()
    }
}

/// Plays the server side of the protocol by hand
pub struct TestServer {
    end: ServerEnd,
    next_connection_id: u32,
}

impl TestServer {
    pub fn new(end: ServerEnd) -> Self {
        Self {
            end,
            next_connection_id: 1,
        }
    }

    pub fn end(&self) -> &ServerEnd {
        &self.end
    }

    /// Messages the client sent since the last poll
    pub fn poll(&mut self) -> Vec<ReceivedMessage> {
        self.end
            .receive_all()
            .into_iter()
            .map(ReceivedMessage::parse)
            .collect()
    }

    pub fn send(&self, message: &dyn NetworkMessage) {
        self.send_raw(message.serialize().unwrap());
    }

    pub fn send_raw(&self, message: OutgoingMessage) {
        self.end.send(message.buffer().unwrap().to_vec());
    }

    /// Builds and sends a message body in place
    pub fn send_built<F>(&self, id: MessageId, body: F)
    where
        F: Fn(&mut dyn BitWrite) -> Result<(), tundra_shared::SerdeErr>,
    {
        self.send_raw(OutgoingMessage::build(id, body).unwrap());
    }

    // Login

    /// Takes the pending login and accepts it. Returns the login and the
    /// connection id handed out.
    pub fn accept_login(&mut self, version: ProtocolVersion) -> (LoginMessage, u32) {
        let login = self.expect_login();
        let connection_id = self.next_connection_id;
        self.next_connection_id += 1;
        self.send(&LoginReplyMessage {
            success: true,
            connection_id,
            reply_data: String::new(),
            protocol_version: version,
        });
        (login, connection_id)
    }

    pub fn reject_login(&mut self, reason: &str) -> LoginMessage {
        let login = self.expect_login();
        self.send(&LoginReplyMessage {
            success: false,
            connection_id: 0,
            reply_data: reason.to_string(),
            protocol_version: ProtocolVersion::LATEST,
        });
        login
    }

    fn expect_login(&mut self) -> LoginMessage {
        let messages = self.poll();
        let login = messages
            .iter()
            .find(|message| message.id == message_id::LOGIN)
            .expect("client sent no login");
        login.decode()
    }

    // Scene

    pub fn create_entity(&self, entity_id: u32, parent: Option<u32>, components: &[Component]) {
        self.send_built(message_id::CREATE_ENTITY, |writer| {
            writer.write_vle(0)?;
            writer.write_vle(entity_id)?;
            writer.write_bool(false)?;
            writer.write_u32(parent.unwrap_or(0))?;
            writer.write_vle(components.len() as u32)?;
            for component in components {
                write_component_full_update(writer, component)?;
            }
            Ok(())
        });
    }

    /// Confirms an entity the client created. `pending` and the component
    /// pairs use the offsets the client sent.
    pub fn reply_create_entity(&self, pending: u32, entity_id: u32, components: &[(u32, u32)]) {
        self.send_built(message_id::CREATE_ENTITY_REPLY, |writer| {
            writer.write_vle(0)?;
            writer.write_vle(pending)?;
            writer.write_vle(entity_id)?;
            writer.write_vle(components.len() as u32)?;
            for (pending, component_id) in components {
                writer.write_vle(*pending)?;
                writer.write_vle(*component_id)?;
            }
            Ok(())
        });
    }

    /// EditAttributes with the index method and a single attribute
    pub fn edit_attribute(&self, entity_id: u32, component_id: u32, index: u8, value: &AttributeValue) {
        self.send_built(message_id::EDIT_ATTRIBUTES, |writer| {
            writer.write_vle(0)?;
            writer.write_vle(entity_id)?;
            writer.write_vle(component_id)?;
            write_sized_block(writer, |block| {
                block.write_bit(false)?;
                block.write_u8(1)?;
                block.write_u8(index)?;
                value.to_binary(block)
            })
        });
    }

    pub fn remove_entity(&self, entity_id: u32) {
        self.send_built(message_id::REMOVE_ENTITY, |writer| {
            writer.write_vle(0)?;
            writer.write_vle(entity_id)
        });
    }

    /// Drops the connection
    pub fn close(&self) {
        self.end.close();
    }
}
