use std::time::Instant;

use tundra_shared::{message_id, Deserializer, Float3, MessageId, Quat};

use crate::{
    client_config::NetworkConfig,
    error::{NetworkError, TransportError},
    messages::{NetworkMessage, ObserverPositionMessage, OutgoingMessage},
    network::{ClientContext, MessageHandler, ObserverHeartbeat},
    transport::Transport,
};

/// Routes inbound messages to handlers by id and puts outbound messages on
/// the transport. Also owns the observer heartbeat.
pub struct Network {
    config: NetworkConfig,
    handlers: Vec<Box<dyn MessageHandler>>,
    observer: ObserverHeartbeat,
}

impl Network {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            handlers: Vec::new(),
            observer: ObserverHeartbeat::new(),
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Appends a handler. Handlers registered earlier win for shared ids.
    /// Registering the same handler twice is not detected.
    pub fn register_handler(&mut self, handler: Box<dyn MessageHandler>) {
        log::debug!("registered message handler {}", handler.name());
        self.handlers.push(handler);
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }

    /// Handles one complete message. Failures are logged and returned; they
    /// never poison the router, the next message is handled normally.
    pub fn receive(&mut self, buffer: &[u8], context: &mut ClientContext) -> Result<MessageId, NetworkError> {
        let mut reader = Deserializer::new(buffer);
        let Ok(id) = reader.read_u16() else {
            let err = NetworkError::TruncatedMessage { len: buffer.len() };
            log::warn!("{}", err);
            return Err(err);
        };

        let Some(handler) = self.handlers.iter_mut().find(|handler| handler.can_handle(id)) else {
            let err = NetworkError::Unhandled {
                id,
                name: message_id::message_name(id),
            };
            log::warn!("{}", err);
            return Err(err);
        };

        log::trace!(
            "{} handling {} ({}), {} bytes",
            handler.name(),
            message_id::message_name(id),
            id,
            buffer.len()
        );
        handler.handle(id, &mut reader, context).map_err(|source| {
            let err = NetworkError::Handler {
                handler: handler.name().to_string(),
                id,
                source,
            };
            log::error!("{}", err);
            err
        })?;
        Ok(id)
    }

    /// Hands the message bytes to the transport. The message is consumed
    /// either way.
    pub fn send(&self, transport: &mut dyn Transport, message: OutgoingMessage) -> Result<(), NetworkError> {
        let id = message.id();
        if !transport.is_connected() {
            log::debug!("dropping {} message, transport is not connected", message.name());
            return Err(TransportError::NotConnected.into());
        }
        let Some(buffer) = message.into_buffer() else {
            let err = NetworkError::MissingBuffer { id };
            log::error!("{}", err);
            return Err(err);
        };
        if buffer.len() > self.config.max_message_size {
            let err = NetworkError::MessageTooLarge {
                id,
                len: buffer.len(),
                max: self.config.max_message_size,
            };
            log::error!("{}", err);
            return Err(err);
        }
        transport.send(&buffer)?;
        log::trace!("sent {} ({} bytes)", message_id::message_name(id), buffer.len());
        Ok(())
    }

    /// Serializes and sends a typed message.
    pub fn send_message(&self, transport: &mut dyn Transport, message: &dyn NetworkMessage) -> Result<(), NetworkError> {
        let outgoing = message.serialize().inspect_err(|err| {
            log::error!("failed to serialize {} message: {}", message.name(), err);
        })?;
        self.send(transport, outgoing)
    }

    /// Sends the observer position when the heartbeat allows it. Returns
    /// whether a message went out.
    pub fn update_observer(
        &mut self,
        transport: &mut dyn Transport,
        now: Instant,
        position: Float3,
        orientation: Quat,
    ) -> Result<bool, NetworkError> {
        if !self
            .observer
            .should_send(now, self.config.priority_update_period, position, orientation)
        {
            return Ok(false);
        }
        self.send_message(transport, &ObserverPositionMessage::new(position, orientation))?;
        self.observer.mark_sent(now, position, orientation);
        Ok(true)
    }

    pub fn reset_observer(&mut self) {
        self.observer.reset();
    }
}
