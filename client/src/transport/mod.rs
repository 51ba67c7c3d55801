//! The byte pipe under the client. One `send` carries exactly one message,
//! one `TransportEvent::Data` delivers exactly one message; framing is the
//! transport's job.

use crate::error::TransportError;

pub trait Transport {
    /// Sends one complete message.
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;

    /// Closes the connection. Further sends fail with `NotConnected`.
    fn close(&mut self) {}
}

/// Something the transport reports to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Data(Vec<u8>),
    Closed,
}
