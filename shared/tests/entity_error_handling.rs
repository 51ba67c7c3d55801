use std::sync::Arc;

use tundra_shared::{
    AttributeChange, ComponentRegistry, EntityError, Scene, SceneError, FIRST_LOCAL_ID,
    FIRST_UNACKED_ID, MESH, NAME,
};

/// Tests for Entity error handling

fn scene() -> Scene {
    Scene::new(Arc::new(ComponentRegistry::tundra()))
}

#[test]
fn test_component_id_in_use() {
    let mut scene = scene();
    let mut entity = scene.create_entity(10, AttributeChange::Disconnected).unwrap();
    entity.create_component(NAME, 3, "", AttributeChange::Disconnected).unwrap();

    let result = entity.create_component(MESH, 3, "", AttributeChange::Disconnected);

    assert_eq!(
        result,
        Err(SceneError::Entity(EntityError::IdInUse { entity: 10, id: 3 }))
    );
    assert_eq!(
        format!("{}", EntityError::IdInUse { entity: 10, id: 3 }),
        "Entity 10 already has a component with id 3"
    );
    assert_eq!(entity.entity().component_count(), 1);
}

#[test]
fn test_component_not_found() {
    let mut scene = scene();
    let mut entity = scene.create_entity(10, AttributeChange::Disconnected).unwrap();

    let result = entity.remove_component(44, AttributeChange::Default);

    assert_eq!(
        result.err(),
        Some(SceneError::Entity(EntityError::ComponentNotFound {
            entity: 10,
            id: 44
        }))
    );
}

#[test]
fn test_invalid_component_id_change() {
    let mut scene = scene();
    let mut entity = scene.create_entity(10, AttributeChange::Disconnected).unwrap();
    let unacked = FIRST_UNACKED_ID + 1;
    entity.create_component(NAME, unacked, "", AttributeChange::Disconnected).unwrap();

    assert_eq!(
        entity.change_component_id(unacked, FIRST_LOCAL_ID + 2),
        Err(SceneError::Entity(EntityError::InvalidIdChange {
            old: unacked,
            new: FIRST_LOCAL_ID + 2,
        }))
    );
    assert_eq!(
        entity.change_component_id(unacked + 5, 20),
        Err(SceneError::Entity(EntityError::ComponentNotFound {
            entity: 10,
            id: unacked + 5,
        }))
    );
    assert!(entity.entity().component_by_id(unacked).is_some());
}

#[test]
fn test_invalid_id_change_display() {
    let error = EntityError::InvalidIdChange { old: 5, new: 6 };

    assert_eq!(
        format!("{}", error),
        "Cannot change id 5 to 6: only unacked ids can be replaced by replicated ones"
    );
}

#[test]
fn test_cyclic_parent() {
    let mut scene = scene();
    scene.create_entity(1, AttributeChange::Disconnected).unwrap();
    scene.create_entity(2, AttributeChange::Disconnected).unwrap();
    scene.create_entity(3, AttributeChange::Disconnected).unwrap();
    scene.entity_mut(2).unwrap().set_parent(Some(1), AttributeChange::Default).unwrap();
    scene.entity_mut(3).unwrap().set_parent(Some(2), AttributeChange::Default).unwrap();

    let result = scene.entity_mut(1).unwrap().set_parent(Some(3), AttributeChange::Default);

    assert_eq!(
        result,
        Err(SceneError::Entity(EntityError::CyclicParent { entity: 1, parent: 3 }))
    );
    assert_eq!(scene.entity_by_id(1).unwrap().parent(), None);

    let own = scene.entity_mut(2).unwrap().set_parent(Some(2), AttributeChange::Default);
    assert!(matches!(own, Err(SceneError::Entity(EntityError::CyclicParent { .. }))));
}

#[test]
fn test_missing_parent() {
    let mut scene = scene();
    scene.create_entity(1, AttributeChange::Disconnected).unwrap();

    let result = scene.entity_mut(1).unwrap().set_parent(Some(77), AttributeChange::Default);

    assert_eq!(result, Err(SceneError::EntityNotFound { id: 77 }));
}

#[test]
fn test_error_clone() {
    let error1 = EntityError::CyclicParent { entity: 1, parent: 2 };
    let error2 = error1.clone();

    assert_eq!(error1, error2);
    assert_ne!(error1, EntityError::CyclicParent { entity: 2, parent: 1 });
}
