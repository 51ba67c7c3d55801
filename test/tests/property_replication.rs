/// PROPERTY-BASED TESTS: replication invariants
///
/// 1. Attribute values survive a component full update
/// 2. Unacked ids stay in their range and map to wire offsets
/// 3. Sync state drops pending work for removed ids

use std::sync::Arc;

use proptest::prelude::*;
use tundra_client::{
    messages::OutgoingMessage, read_component_full_update, wire_id, write_component_full_update,
    SyncState,
};
use tundra_shared::{
    is_unacked_id, AttributeChange, AttributeValue, ComponentRegistry, Deserializer, Float3,
    Scene, DYNAMIC_COMPONENT, FIRST_LOCAL_ID, FIRST_UNACKED_ID, NAME,
};

fn value_strategy() -> impl Strategy<Value = AttributeValue> {
    prop_oneof![
        any::<i32>().prop_map(AttributeValue::from),
        any::<bool>().prop_map(AttributeValue::from),
        (-1.0e6f32..1.0e6).prop_map(AttributeValue::from),
        "\\PC{0,40}".prop_map(AttributeValue::from),
        (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0)
            .prop_map(|(x, y, z)| AttributeValue::from(Float3::new(x, y, z))),
    ]
}

#[derive(Debug, Clone)]
enum SyncOp {
    Create(u32),
    Remove(u32),
    Modify(u32),
}

fn sync_op_strategy() -> impl Strategy<Value = SyncOp> {
    prop_oneof![
        (0u32..8).prop_map(SyncOp::Create),
        (0u32..8).prop_map(SyncOp::Remove),
        (0u32..8).prop_map(SyncOp::Modify),
    ]
}

proptest! {
    /// A Name entity's text survives the trip through a full update
    #[test]
    fn prop_name_survives_full_update(name in "\\PC{0,60}") {
        let registry = ComponentRegistry::tundra();
        let mut component = registry.create_component(NAME, 3, "").unwrap();
        component.set_attribute(0, AttributeValue::from(name.as_str()), AttributeChange::Disconnected);

        let message = OutgoingMessage::build(1, |writer| write_component_full_update(writer, &component)).unwrap();
        let bytes = message.buffer().unwrap();
        let mut reader = Deserializer::new(&bytes[2..]);

        let mut scene = Scene::new(Arc::new(registry));
        scene.create_entity(1, AttributeChange::LocalOnly).unwrap();
        read_component_full_update(&mut scene, 1, &mut reader).unwrap();
        prop_assert_eq!(scene.entity_by_id(1).unwrap().name(), name.as_str());
        prop_assert_eq!(reader.bytes_left(), 0);
    }

    /// Dynamic attributes of any type keep their value and type
    #[test]
    fn prop_dynamic_attributes_survive_full_update(values in prop::collection::vec(value_strategy(), 1..8)) {
        let mut scene = Scene::new(Arc::new(ComponentRegistry::tundra()));
        {
            let mut entity = scene.create_entity(1, AttributeChange::LocalOnly).unwrap();
            entity.create_component(DYNAMIC_COMPONENT, 2, "dyn", AttributeChange::LocalOnly).unwrap();
            for (index, value) in values.iter().enumerate() {
                let name = format!("attr{}", index);
                entity
                    .create_attribute_with_value(2, index as u8, &name, value.clone(), AttributeChange::LocalOnly)
                    .unwrap();
            }
        }
        let component = scene.entity_by_id(1).unwrap().component_by_id(2).unwrap();
        let message = OutgoingMessage::build(1, |writer| write_component_full_update(writer, component)).unwrap();
        let bytes = message.buffer().unwrap().to_vec();

        let mut mirror = Scene::new(Arc::new(ComponentRegistry::tundra()));
        mirror.create_entity(1, AttributeChange::LocalOnly).unwrap();
        read_component_full_update(&mut mirror, 1, &mut Deserializer::new(&bytes[2..])).unwrap();
        for (index, value) in values.iter().enumerate() {
            prop_assert_eq!(mirror.attribute_value(1, 2, index as u8), Some(value));
        }
    }

    /// Unacked ids are allocated inside their range and written as offsets
    #[test]
    fn prop_unacked_ids_map_to_offsets(count in 1usize..50) {
        let mut scene = Scene::new(Arc::new(ComponentRegistry::tundra()));
        for _ in 0..count {
            let id = scene.create_unacked_entity().unwrap().id();
            prop_assert!(is_unacked_id(id));
            prop_assert!(id > FIRST_UNACKED_ID && id < FIRST_LOCAL_ID);
            prop_assert_eq!(wire_id(id) + FIRST_UNACKED_ID, id);
        }
    }

    /// Replicated ids go on the wire unchanged
    #[test]
    fn prop_replicated_ids_are_not_offset(id in 1u32..FIRST_UNACKED_ID) {
        prop_assert_eq!(wire_id(id), id);
    }

    /// A removal clears pending creation and modification of the same id
    #[test]
    fn prop_removal_cancels_pending_work(ops in prop::collection::vec(sync_op_strategy(), 0..40)) {
        let mut state = SyncState::new();
        let mut last_removed = std::collections::BTreeSet::new();
        for op in ops {
            match op {
                SyncOp::Create(id) => {
                    state.add_created(id);
                    last_removed.remove(&id);
                }
                SyncOp::Remove(id) => {
                    state.add_removed(id);
                    last_removed.insert(id);
                }
                SyncOp::Modify(id) => {
                    state.add_modified(id);
                    last_removed.remove(&id);
                }
            }
        }
        for id in last_removed {
            prop_assert!(state.is_removed(id));
            prop_assert!(!state.is_created(id));
            prop_assert!(!state.is_modified(id));
        }
    }
}
