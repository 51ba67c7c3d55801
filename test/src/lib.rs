pub mod helpers;
pub mod local_transport;

pub use helpers::*;
pub use local_transport::{LocalTransport, LocalTransportPair, ServerEnd};
