/// Scene replication between a client and a hand driven server

use std::time::Instant;

use tundra_client::{
    messages::{read_sized_block, ClientJoinedMessage, SetEntityParentMessage},
    ClientEvent,
};
use tundra_shared::{
    message_id, placeable, AttributeChange, AttributeTypeId, AttributeValue, ComponentRegistry,
    ComponentTypeId, Float3, ProtocolVersion, Transform, FIRST_UNACKED_ID, NAME, PLACEABLE,
};
use tundra_test::{
    assert_has_entity, assert_received_ids, connect_client, deliver_to_client, exchange,
    TestEntityBuilder,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn server_entities_are_mirrored() {
    init_logger();
    let registry = ComponentRegistry::tundra();
    let (mut client, mut server) = connect_client(ComponentRegistry::tundra(), ProtocolVersion::LATEST);

    let transform = Transform::new(Float3::new(1.0, 2.0, 3.0), Float3::ZERO, Float3::ONE);
    let components = TestEntityBuilder::new().named("crate").placed(transform).build(&registry);
    server.create_entity(12, None, &components);
    let sent = exchange(&mut client, &mut server, Instant::now());

    // nothing echoes back
    assert!(sent.is_empty());
    assert_has_entity!(client, 12);
    let entity = client.scene().entity_by_id(12).unwrap();
    assert_eq!(entity.name(), "crate");
    assert_eq!(entity.component_count(), 2);
    let placeable = entity.component_by_type_id(ComponentTypeId(PLACEABLE)).unwrap();
    assert_eq!(
        placeable.value(placeable::TRANSFORM).and_then(AttributeValue::as_transform),
        Some(transform)
    );

    server.edit_attribute(12, 1, 0, &AttributeValue::from("barrel"));
    exchange(&mut client, &mut server, Instant::now());
    assert_eq!(client.scene().entity_by_id(12).unwrap().name(), "barrel");

    server.remove_entity(12);
    exchange(&mut client, &mut server, Instant::now());
    assert!(!client.scene().contains(12));
}

#[test]
fn children_follow_their_parent() {
    init_logger();
    let (mut client, mut server) = connect_client(ComponentRegistry::tundra(), ProtocolVersion::LATEST);
    server.create_entity(1, None, &[]);
    server.create_entity(2, Some(1), &[]);
    exchange(&mut client, &mut server, Instant::now());
    assert_eq!(client.scene().entity_by_id(2).unwrap().parent(), Some(1));

    server.send(&SetEntityParentMessage {
        entity_id: 2,
        parent: None,
    });
    exchange(&mut client, &mut server, Instant::now());
    assert_eq!(client.scene().entity_by_id(2).unwrap().parent(), None);
}

#[test]
fn unacked_entity_is_reconciled() {
    init_logger();
    let (mut client, mut server) = connect_client(ComponentRegistry::tundra(), ProtocolVersion::LATEST);
    let (pending, pending_component) = {
        let mut entity = client.scene_mut().create_unacked_entity().unwrap();
        let component = entity.create_component(NAME, 0, "", AttributeChange::Default).unwrap();
        entity
            .set_attribute(component, 0, "mine".into(), AttributeChange::Default)
            .unwrap();
        (entity.id(), component)
    };

    let sent = exchange(&mut client, &mut server, Instant::now());
    assert_received_ids!(sent, [message_id::CREATE_ENTITY]);
    let mut reader = sent[0].reader();
    assert_eq!(reader.read_vle().unwrap(), 0);
    let pending_wire = reader.read_vle().unwrap();
    assert_eq!(pending_wire, pending - FIRST_UNACKED_ID);

    server.reply_create_entity(pending_wire, 40, &[(pending_component - FIRST_UNACKED_ID, 7)]);
    let sent = exchange(&mut client, &mut server, Instant::now());
    assert!(sent.is_empty());
    assert!(!client.scene().contains(pending));
    let entity = client.scene().entity_by_id(40).unwrap();
    assert_eq!(entity.name(), "mine");
    assert!(entity.component_by_id(7).is_some());

    // later edits use the server ids
    client
        .scene_mut()
        .set_attribute(40, 7, 0, "ours".into(), AttributeChange::Default)
        .unwrap();
    let sent = exchange(&mut client, &mut server, Instant::now());
    assert_received_ids!(sent, [message_id::EDIT_ATTRIBUTES]);
    let mut reader = sent[0].reader();
    assert_eq!(reader.read_vle().unwrap(), 0);
    assert_eq!(reader.read_vle().unwrap(), 40);
    assert_eq!(reader.read_vle().unwrap(), 7);
    let mut block = read_sized_block(&mut reader).unwrap();
    assert!(!block.read_bit().unwrap());
    assert_eq!(block.read_u8().unwrap(), 1);
    assert_eq!(block.read_u8().unwrap(), 0);
    assert_eq!(
        AttributeValue::from_binary(AttributeTypeId::String, &mut block).unwrap(),
        AttributeValue::from("ours")
    );
}

#[test]
fn local_removal_reaches_the_server() {
    init_logger();
    let (mut client, mut server) = connect_client(ComponentRegistry::tundra(), ProtocolVersion::LATEST);
    server.create_entity(9, None, &[]);
    exchange(&mut client, &mut server, Instant::now());

    client.scene_mut().remove_entity(9, AttributeChange::Default).unwrap();
    let sent = exchange(&mut client, &mut server, Instant::now());
    assert_received_ids!(sent, [message_id::REMOVE_ENTITY]);
    let mut reader = sent[0].reader();
    assert_eq!(reader.read_vle().unwrap(), 0);
    assert_eq!(reader.read_vle().unwrap(), 9);
}

#[test]
fn presence_is_reported() {
    init_logger();
    let (mut client, server) = connect_client(ComponentRegistry::tundra(), ProtocolVersion::LATEST);
    server.send(&ClientJoinedMessage {
        connection_id: 5,
        username: Some("guest".to_string()),
    });
    server.send_built(message_id::CLIENT_LEFT, |writer| writer.write_vle(5));
    for result in deliver_to_client(&mut client, &server) {
        result.unwrap();
    }
    assert_eq!(
        client.take_events(),
        vec![
            ClientEvent::ClientJoined {
                connection_id: 5,
                username: Some("guest".to_string()),
            },
            ClientEvent::ClientLeft { connection_id: 5 },
        ]
    );
}
