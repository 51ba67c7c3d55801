/// Login handshake between a client and a test server

use std::{sync::Arc, time::Instant};

use tundra_client::{
    messages::LoginProperties, ClientConfig, ClientEvent, ConnectionState, TundraClient,
};
use tundra_shared::{
    message_id, AttributeTypeId, ComponentRegistry, ComponentSchema, ProtocolVersion,
};
use tundra_test::{
    assert_received_ids, connect_client, deliver_to_client, LocalTransportPair, TestServer,
};

#[test]
fn login_carries_the_properties() {
    let pair = LocalTransportPair::new();
    let mut client = TundraClient::new(ClientConfig::default(), Arc::new(ComponentRegistry::tundra()));
    let mut properties = LoginProperties::with_username("tester");
    properties.extra.insert("avatar".to_string(), "robot".into());
    client.connect(Box::new(pair.client), &properties).unwrap();

    let mut server = TestServer::new(pair.server);
    let (login, connection_id) = server.accept_login(ProtocolVersion::HierarchicScene);
    let sent: LoginProperties = serde_json::from_str(&login.login_data).unwrap();
    assert_eq!(sent, properties);

    for result in deliver_to_client(&mut client, &server) {
        result.unwrap();
    }
    assert_eq!(client.state(), ConnectionState::Connected);
    assert_eq!(client.connection_id(), connection_id);
    assert_eq!(client.protocol_version(), ProtocolVersion::HierarchicScene);
}

#[test]
fn refused_login_disconnects() {
    let pair = LocalTransportPair::new();
    let mut client = TundraClient::new(ClientConfig::default(), Arc::new(ComponentRegistry::tundra()));
    client
        .connect(Box::new(pair.client), &LoginProperties::with_username("intruder"))
        .unwrap();
    let mut server = TestServer::new(pair.server);
    server.reject_login("banned");

    for result in deliver_to_client(&mut client, &server) {
        result.unwrap();
    }
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(!server.end().is_open());
    assert_eq!(
        client.take_events(),
        vec![ClientEvent::LoginFailed {
            reply_data: "banned".to_string()
        }]
    );
}

#[test]
fn custom_types_need_a_new_enough_server() {
    let schema = ComponentSchema::new().attribute(AttributeTypeId::Real, "speed", "Speed");

    let mut registry = ComponentRegistry::tundra();
    registry.register(5000, "Boat", schema.clone());
    let (mut client, mut server) = connect_client(registry.build(), ProtocolVersion::CustomComponents);
    client.update(Instant::now()).unwrap();
    assert_received_ids!(server.poll(), [message_id::REGISTER_COMPONENT_TYPE]);

    let mut registry = ComponentRegistry::tundra();
    registry.register(5000, "Boat", schema);
    let (mut client, mut server) = connect_client(registry.build(), ProtocolVersion::Original);
    client.update(Instant::now()).unwrap();
    assert!(server.poll().is_empty());
}
