use std::sync::Arc;

use tundra_shared::{
    AttributeChange, AttributeValue, ComponentRegistry, EntityAction, ExecType, RegistryError,
    Scene, SceneError, FIRST_UNACKED_ID, NAME,
};

/// Tests for Scene error handling

fn scene() -> Scene {
    let _ = env_logger::builder().is_test(true).try_init();
    Scene::new(Arc::new(ComponentRegistry::tundra()))
}

#[test]
fn test_entity_id_in_use() {
    let mut scene = scene();
    scene.create_entity(5, AttributeChange::Default).unwrap();

    let result = scene.create_entity(5, AttributeChange::Default);

    assert_eq!(result.err(), Some(SceneError::EntityIdInUse { id: 5 }));
    assert_eq!(
        format!("{}", SceneError::EntityIdInUse { id: 5 }),
        "Entity id 5 is already in use"
    );
    assert_eq!(scene.entity_count(), 1);
}

#[test]
fn test_entity_not_found() {
    let mut scene = scene();

    assert_eq!(
        scene.remove_entity(99, AttributeChange::Default),
        Err(SceneError::EntityNotFound { id: 99 })
    );
    assert_eq!(
        scene.set_attribute(99, 1, 0, AttributeValue::Bool(true), AttributeChange::Default),
        Err(SceneError::EntityNotFound { id: 99 })
    );
    assert_eq!(
        scene.trigger_action(EntityAction::new(99, "Poke", ExecType::LOCAL, Vec::new())),
        Err(SceneError::EntityNotFound { id: 99 })
    );
    assert_eq!(
        format!("{}", SceneError::EntityNotFound { id: 99 }),
        "Entity 99 not found in scene"
    );
}

#[test]
fn test_invalid_entity_id_change() {
    let mut scene = scene();
    scene.create_entity(5, AttributeChange::Default).unwrap();
    let unacked = scene.create_unacked_entity().unwrap().id();

    assert_eq!(
        scene.change_entity_id(5, 6),
        Err(SceneError::InvalidIdChange { old: 5, new: 6 })
    );
    assert_eq!(
        scene.change_entity_id(unacked, 5),
        Err(SceneError::EntityIdInUse { id: 5 })
    );
    assert_eq!(
        scene.change_entity_id(FIRST_UNACKED_ID + 500, 8),
        Err(SceneError::EntityNotFound {
            id: FIRST_UNACKED_ID + 500
        })
    );
    assert!(scene.contains(unacked));
}

#[test]
fn test_unknown_component_type() {
    let mut scene = scene();
    let mut entity = scene.create_entity(5, AttributeChange::Default).unwrap();

    assert_eq!(
        entity.create_component(12345, 0, "", AttributeChange::Default),
        Err(SceneError::Registry(RegistryError::UnknownTypeId { type_id: 12345 }))
    );
    assert_eq!(
        entity.create_component_by_name("EC_Teapot", 0, "", AttributeChange::Default),
        Err(SceneError::Registry(RegistryError::UnknownTypeName {
            type_name: "EC_Teapot".to_string()
        }))
    );
    assert_eq!(entity.entity().component_count(), 0);
}

#[test]
fn test_wrapped_errors_are_transparent() {
    let inner = RegistryError::UnknownTypeId { type_id: 3 };
    let error = SceneError::from(inner.clone());

    assert_eq!(format!("{}", error), format!("{}", inner));
}

#[test]
fn test_failed_set_leaves_value() {
    let mut scene = scene();
    let mut entity = scene.create_entity(5, AttributeChange::Default).unwrap();
    let name = entity.create_component(NAME, 0, "", AttributeChange::Default).unwrap();

    let result = scene.set_attribute(5, name, 0, AttributeValue::Int(1), AttributeChange::Default);

    assert!(matches!(result, Err(SceneError::Component(_))));
    assert_eq!(
        scene.attribute_value(5, name, 0),
        Some(&AttributeValue::String(String::new()))
    );
}

#[test]
fn test_error_clone() {
    let error1 = SceneError::InvalidIdChange { old: 1, new: 2 };
    let error2 = error1.clone();

    assert_eq!(error1, error2);
}
