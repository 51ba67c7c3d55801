use tundra_shared::{Deserializer, MessageId};

use crate::{error::HandlerError, network::ClientContext};

/// Takes inbound messages by id. Handlers are asked in registration order
/// and the first one that can handle an id gets the message.
pub trait MessageHandler {
    fn name(&self) -> &str;

    fn can_handle(&self, id: MessageId) -> bool;

    /// `reader` is positioned right after the message id.
    fn handle(
        &mut self,
        id: MessageId,
        reader: &mut Deserializer,
        context: &mut ClientContext,
    ) -> Result<(), HandlerError>;
}
