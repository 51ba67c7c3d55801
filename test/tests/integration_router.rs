/// Message routing and the observer heartbeat through a logged in client

use std::{
    cell::RefCell,
    rc::Rc,
    time::{Duration, Instant},
};

use tundra_client::{ClientContext, HandlerError, MessageHandler, NetworkError};
use tundra_shared::{
    message_id, placeable, AttributeChange, ComponentRegistry, Deserializer, Float3, MessageId,
    ProtocolVersion, Transform, PLACEABLE,
};
use tundra_test::{assert_received_ids, connect_client, deliver_to_client};

struct Greeter {
    heard: Rc<RefCell<Vec<String>>>,
}

impl MessageHandler for Greeter {
    fn name(&self) -> &str {
        "Greeter"
    }

    fn can_handle(&self, id: MessageId) -> bool {
        id == 1
    }

    fn handle(&mut self, _id: MessageId, reader: &mut Deserializer, _context: &mut ClientContext) -> Result<(), HandlerError> {
        self.heard.borrow_mut().push(reader.read_string_u16()?);
        Ok(())
    }
}

#[test]
fn hello_reaches_an_application_handler() {
    let (mut client, server) = connect_client(ComponentRegistry::tundra(), ProtocolVersion::LATEST);
    let heard = Rc::new(RefCell::new(Vec::new()));
    client.register_handler(Box::new(Greeter { heard: heard.clone() }));

    server.end().send(vec![0x01, 0x00, 0x05, 0x00, 0x68, 0x65, 0x6C, 0x6C, 0x6F]);
    for result in deliver_to_client(&mut client, &server) {
        result.unwrap();
    }
    assert_eq!(*heard.borrow(), vec!["hello".to_string()]);
}

#[test]
fn unknown_ids_do_not_break_the_connection() {
    let (mut client, server) = connect_client(ComponentRegistry::tundra(), ProtocolVersion::LATEST);
    server.end().send(vec![0xE7, 0x03]);
    server.remove_entity(44);

    let results = deliver_to_client(&mut client, &server);
    assert_eq!(
        results[0],
        Err(NetworkError::Unhandled { id: 999, name: "Unknown" })
    );
    // removing an unknown entity is only a warning
    assert_eq!(results[1], Ok(()));
    assert!(client.is_connected());
}

#[test]
fn observer_heartbeat_sends_only_changes() {
    let (mut client, mut server) = connect_client(ComponentRegistry::tundra(), ProtocolVersion::LATEST);
    let observer = {
        let mut entity = client.scene_mut().create_local_entity().unwrap();
        entity.create_component(PLACEABLE, 0, "", AttributeChange::LocalOnly).unwrap();
        entity.id()
    };
    client.set_observer_entity_id(Some(observer));

    let start = Instant::now();
    let at = |millis| start + Duration::from_millis(millis);

    client.update(start).unwrap();
    client.update(at(500)).unwrap();
    client.update(at(1100)).unwrap();
    assert_received_ids!(server.poll(), [message_id::OBSERVER_POSITION]);

    let placeable_id = client
        .scene()
        .entity_by_id(observer)
        .unwrap()
        .components()
        .next()
        .unwrap()
        .id();
    let moved = Transform::new(Float3::new(0.0, 0.0, 5.0), Float3::ZERO, Float3::ONE);
    client
        .scene_mut()
        .set_attribute(observer, placeable_id, placeable::TRANSFORM, moved.into(), AttributeChange::LocalOnly)
        .unwrap();
    client.update(at(1100)).unwrap();
    assert_received_ids!(server.poll(), [message_id::OBSERVER_POSITION]);
}

#[test]
fn closed_connection_is_reported() {
    let (mut client, server) = connect_client(ComponentRegistry::tundra(), ProtocolVersion::LATEST);
    server.close();
    for result in deliver_to_client(&mut client, &server) {
        result.unwrap();
    }
    assert!(!client.is_connected());
    assert_eq!(client.take_events(), vec![tundra_client::ClientEvent::Disconnected]);
}
