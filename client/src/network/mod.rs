mod context;
mod handler;
mod observer;
mod router;

pub use context::{ClientContext, ClientEvent, ConnectionState};
pub use handler::MessageHandler;
pub use observer::ObserverHeartbeat;
pub use router::Network;
