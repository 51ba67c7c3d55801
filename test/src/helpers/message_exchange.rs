use std::{sync::Arc, time::Instant};

use tundra_client::{
    messages::LoginProperties, ClientConfig, NetworkError, TundraClient,
};
use tundra_shared::{ComponentRegistry, ProtocolVersion};

use super::{ReceivedMessage, TestServer};
use crate::local_transport::LocalTransportPair;

/// Client logged in to a test server speaking `version`
pub fn connect_client(registry: ComponentRegistry, version: ProtocolVersion) -> (TundraClient, TestServer) {
    let pair = LocalTransportPair::new();
    let mut client = TundraClient::new(ClientConfig::default(), Arc::new(registry));
    client
        .connect(Box::new(pair.client), &LoginProperties::with_username("tester"))
        .unwrap();
    let mut server = TestServer::new(pair.server);
    server.accept_login(version);
    for result in deliver_to_client(&mut client, &server) {
        result.unwrap();
    }
    assert!(client.is_connected());
    client.take_events();
    (client, server)
}

/// Hands everything the server queued to the client
pub fn deliver_to_client(client: &mut TundraClient, server: &TestServer) -> Vec<Result<(), NetworkError>> {
    server
        .end()
        .client_events()
        .into_iter()
        .map(|event| client.handle_transport_event(event))
        .collect()
}

/// One frame: the server's messages reach the client, the client updates,
/// and the server collects what the client sent
pub fn exchange(client: &mut TundraClient, server: &mut TestServer, now: Instant) -> Vec<ReceivedMessage> {
    for result in deliver_to_client(client, server) {
        result.unwrap();
    }
    client.update(now).unwrap();
    server.poll()
}
