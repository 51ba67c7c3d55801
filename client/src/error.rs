use thiserror::Error;

use tundra_shared::{AttributeError, MessageId, RegistryError, SceneError, SerdeErr};

/// Errors reported by a transport implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport has no open connection
    #[error("Transport is not connected")]
    NotConnected,

    /// The underlying connection refused or failed the write
    #[error("Transport failed to send {len} bytes: {reason}")]
    SendFailed { len: usize, reason: String },
}

/// Errors raised by a message handler while applying one message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// Message body could not be decoded
    #[error("Malformed message body: {0}")]
    Codec(#[from] SerdeErr),

    /// Attribute record could not be decoded
    #[error(transparent)]
    Attribute(#[from] AttributeError),

    /// Scene rejected the change the message describes
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Announced component type could not be registered
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Handler was given a message id it does not take
    #[error("Handler '{handler}' cannot handle message id {id}")]
    UnexpectedMessage { handler: String, id: MessageId },
}

/// Errors raised by the message router and the client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Buffer too short to carry a message id
    #[error("Received a buffer of {len} bytes, too short for a message id")]
    TruncatedMessage { len: usize },

    /// No registered handler takes the message id
    #[error("Received an unhandled network message {name} ({id})")]
    Unhandled { id: MessageId, name: &'static str },

    /// A handler failed while applying the message
    #[error("Handler '{handler}' failed on message {id}: {source}")]
    Handler {
        handler: String,
        id: MessageId,
        source: HandlerError,
    },

    /// Outgoing message has no buffer; it was never serialized
    #[error("Cannot send message {id} as its buffer is empty, serialize it first")]
    MissingBuffer { id: MessageId },

    /// Outgoing message does not fit the configured size limit
    #[error("Message {id} is {len} bytes, more than the {max} byte limit")]
    MessageTooLarge { id: MessageId, len: usize, max: usize },

    /// Message could not be serialized
    #[error("Failed to serialize message: {0}")]
    Serialize(#[from] SerdeErr),

    /// Login properties could not be turned into JSON
    #[error("Invalid login properties: {0}")]
    InvalidLoginProperties(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
