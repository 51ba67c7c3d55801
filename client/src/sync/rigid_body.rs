use tundra_shared::{
    placeable, rigid_body, AttributeChange, ComponentTypeId, Float3, Scene, SceneError, Transform,
    PLACEABLE, RIGID_BODY,
};

use crate::messages::{PositionUpdate, RigidBodyUpdate, RotationUpdate, ScaleUpdate, VelocityUpdate};

/// Applies a physics update to the entity's Placeable and RigidBody
/// components. Missing entities or components are skipped; returns whether
/// the entity was found.
pub fn apply_rigid_body_update(scene: &mut Scene, update: &RigidBodyUpdate) -> Result<bool, SceneError> {
    let Some(mut entity) = scene.entity_mut(update.entity_id) else {
        return Ok(false);
    };

    if update.moves() {
        let placeable = entity
            .entity()
            .component_by_type_id(ComponentTypeId(PLACEABLE))
            .map(|component| {
                let transform = component
                    .value(placeable::TRANSFORM)
                    .and_then(|value| value.as_transform())
                    .unwrap_or_default();
                (component.id(), transform)
            });
        if let Some((component_id, mut transform)) = placeable {
            apply_placement(&mut transform, update);
            entity.set_attribute(component_id, placeable::TRANSFORM, transform.into(), AttributeChange::LocalOnly)?;
        }
    }

    let rigid_body_id = entity
        .entity()
        .component_by_type_id(ComponentTypeId(RIGID_BODY))
        .map(|component| component.id());
    if let Some(component_id) = rigid_body_id {
        match update.velocity {
            VelocityUpdate::None => {}
            VelocityUpdate::Small(velocity) | VelocityUpdate::Large(velocity) => {
                entity.set_attribute(
                    component_id,
                    rigid_body::LINEAR_VELOCITY,
                    velocity.into(),
                    AttributeChange::LocalOnly,
                )?;
            }
        }
        if let Some(angular) = update.angular_velocity {
            entity.set_attribute(
                component_id,
                rigid_body::ANGULAR_VELOCITY,
                angular.to_euler_degrees().into(),
                AttributeChange::LocalOnly,
            )?;
        }
    }
    Ok(true)
}

fn apply_placement(transform: &mut Transform, update: &RigidBodyUpdate) {
    match update.position {
        PositionUpdate::None => {}
        PositionUpdate::Compact(pos) | PositionUpdate::Full(pos) => transform.pos = pos,
    }
    match update.rotation {
        RotationUpdate::None => {}
        RotationUpdate::Forward2D(forward) | RotationUpdate::Forward(forward) => transform.look_at(forward),
        RotationUpdate::Orientation(orientation) => transform.set_orientation(orientation),
    }
    match update.scale {
        ScaleUpdate::None => {}
        ScaleUpdate::Uniform(scale) => transform.scale = Float3::new(scale, scale, scale),
        ScaleUpdate::Full(scale) => transform.scale = scale,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tundra_shared::{AttributeValue, ComponentRegistry, Quat};

    use super::*;

    fn physics_scene() -> Scene {
        let mut scene = Scene::new(Arc::new(ComponentRegistry::tundra()));
        let mut entity = scene.create_entity(8, AttributeChange::LocalOnly).unwrap();
        entity.create_component(PLACEABLE, 1, "", AttributeChange::LocalOnly).unwrap();
        entity.create_component(RIGID_BODY, 2, "", AttributeChange::LocalOnly).unwrap();
        scene
    }

    #[test]
    fn moves_the_placeable() {
        let mut scene = physics_scene();
        let mut update = RigidBodyUpdate::new(8);
        update.position = PositionUpdate::Full(Float3::new(1.0, 2.0, 3.0));
        update.scale = ScaleUpdate::Uniform(2.0);
        assert_eq!(apply_rigid_body_update(&mut scene, &update), Ok(true));

        let transform = scene
            .attribute_value(8, 1, placeable::TRANSFORM)
            .and_then(AttributeValue::as_transform)
            .unwrap();
        assert_eq!(transform.pos, Float3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.scale, Float3::new(2.0, 2.0, 2.0));
        assert_eq!(transform.rot, Float3::ZERO);
    }

    #[test]
    fn velocities_go_to_the_rigid_body() {
        let mut scene = physics_scene();
        let mut update = RigidBodyUpdate::new(8);
        update.velocity = VelocityUpdate::Small(Float3::new(0.0, 1.5, 0.0));
        update.angular_velocity = Some(Quat::from_axis_angle(Float3::new(0.0, 1.0, 0.0), 30f32.to_radians()));
        apply_rigid_body_update(&mut scene, &update).unwrap();

        assert_eq!(
            scene.attribute_value(8, 2, rigid_body::LINEAR_VELOCITY),
            Some(&AttributeValue::Float3(Float3::new(0.0, 1.5, 0.0)))
        );
        let angular = scene
            .attribute_value(8, 2, rigid_body::ANGULAR_VELOCITY)
            .and_then(AttributeValue::as_float3)
            .unwrap();
        assert!((angular.y - 30.0).abs() < 0.01);
        // placement untouched
        assert_eq!(
            scene
                .attribute_value(8, 1, placeable::TRANSFORM)
                .and_then(AttributeValue::as_transform),
            Some(Transform::default())
        );
    }

    #[test]
    fn unknown_entity_is_reported() {
        let mut scene = physics_scene();
        let mut update = RigidBodyUpdate::new(9);
        update.position = PositionUpdate::Full(Float3::ONE);
        assert_eq!(apply_rigid_body_update(&mut scene, &update), Ok(false));
    }
}
