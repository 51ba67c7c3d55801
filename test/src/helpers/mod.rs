pub mod assertions;
pub mod entity_builder;
pub mod message_exchange;
pub mod test_server;

pub use entity_builder::TestEntityBuilder;
pub use message_exchange::{connect_client, deliver_to_client, exchange};
pub use test_server::{ReceivedMessage, TestServer};
