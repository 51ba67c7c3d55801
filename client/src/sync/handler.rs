use tundra_shared::{message_id, Deserializer, MessageId};

use crate::{
    error::HandlerError,
    messages::{ClientJoinedMessage, ClientLeftMessage, IncomingMessage, LoginReplyMessage},
    network::{ClientContext, ClientEvent, ConnectionState, MessageHandler},
    sync::scene_messages,
};

/// Handles the core Tundra protocol: login reply, client presence and scene
/// replication.
#[derive(Debug, Default)]
pub struct TundraMessageHandler;

impl TundraMessageHandler {
    pub fn new() -> Self {
        Self
    }

    fn login_reply(&mut self, reader: &mut Deserializer, context: &mut ClientContext) -> Result<(), HandlerError> {
        let reply = LoginReplyMessage::deserialize(reader)?;
        if !reply.success {
            log::warn!("Login refused by the server: {}", reply.reply_data);
            context.state = ConnectionState::Disconnected;
            context.push_event(ClientEvent::LoginFailed {
                reply_data: reply.reply_data,
            });
            return Ok(());
        }

        log::info!(
            "Logged in as connection {}, protocol version {:?}",
            reply.connection_id,
            reply.protocol_version
        );
        context.state = ConnectionState::Connected;
        context.connection_id = reply.connection_id;
        context.protocol_version = reply.protocol_version;
        context.push_event(ClientEvent::Connected {
            connection_id: reply.connection_id,
            protocol_version: reply.protocol_version,
            reply_data: reply.reply_data,
        });
        Ok(())
    }
}

impl MessageHandler for TundraMessageHandler {
    fn name(&self) -> &str {
        "Tundra"
    }

    fn can_handle(&self, id: MessageId) -> bool {
        matches!(
            id,
            message_id::LOGIN_REPLY
                | message_id::CLIENT_JOINED
                | message_id::CLIENT_LEFT
                | message_id::RIGID_BODY_UPDATE
                | message_id::ENTITY_ACTION
                | message_id::REGISTER_COMPONENT_TYPE
                | message_id::SET_ENTITY_PARENT
        ) || message_id::is_scene_message(id)
    }

    fn handle(&mut self, id: MessageId, reader: &mut Deserializer, context: &mut ClientContext) -> Result<(), HandlerError> {
        match id {
            message_id::LOGIN_REPLY => self.login_reply(reader, context),
            message_id::CLIENT_JOINED => {
                let ClientJoinedMessage {
                    connection_id,
                    username,
                } = ClientJoinedMessage::deserialize(reader)?;
                log::info!("Client {} joined", connection_id);
                context.push_event(ClientEvent::ClientJoined {
                    connection_id,
                    username,
                });
                Ok(())
            }
            message_id::CLIENT_LEFT => {
                let ClientLeftMessage { connection_id } = ClientLeftMessage::deserialize(reader)?;
                log::info!("Client {} left", connection_id);
                context.push_event(ClientEvent::ClientLeft { connection_id });
                Ok(())
            }
            message_id::CREATE_ENTITY => scene_messages::create_entity(reader, context),
            message_id::CREATE_COMPONENTS => scene_messages::create_components(reader, context),
            message_id::CREATE_ATTRIBUTES => scene_messages::create_attributes(reader, context),
            message_id::EDIT_ATTRIBUTES => scene_messages::edit_attributes(reader, context),
            message_id::REMOVE_ATTRIBUTES => scene_messages::remove_attributes(reader, context),
            message_id::REMOVE_COMPONENTS => scene_messages::remove_components(reader, context),
            message_id::REMOVE_ENTITY => scene_messages::remove_entity(reader, context),
            message_id::CREATE_ENTITY_REPLY => scene_messages::create_entity_reply(reader, context),
            message_id::CREATE_COMPONENTS_REPLY => scene_messages::create_components_reply(reader, context),
            message_id::RIGID_BODY_UPDATE => scene_messages::rigid_body_update(reader, context),
            message_id::ENTITY_ACTION => scene_messages::entity_action(reader, context),
            message_id::REGISTER_COMPONENT_TYPE => scene_messages::register_component_type(reader, context),
            message_id::SET_ENTITY_PARENT => scene_messages::set_entity_parent(reader, context),
            _ => Err(HandlerError::UnexpectedMessage {
                handler: self.name().to_string(),
                id,
            }),
        }
    }
}
