//! The component types every Tundra server knows, with the attribute layouts
//! this client implements.

use crate::attribute::{AttributeTypeId, AttributeValue, Float3, Transform};

use super::schema::ComponentSchema;

pub const AVATAR: u32 = 1;
pub const SCRIPT: u32 = 5;
pub const CAMERA: u32 = 15;
pub const MESH: u32 = 17;
pub const PLACEABLE: u32 = 20;
pub const RIGID_BODY: u32 = 23;
pub const DYNAMIC_COMPONENT: u32 = 25;
pub const NAME: u32 = 26;

/// `(type id, type name)` of every built-in component type.
pub const BUILTIN_COMPONENT_TYPES: &[(u32, &str)] = &[
    (1, "Avatar"),
    (2, "Billboard"),
    (5, "Script"),
    (6, "Sound"),
    (7, "SoundListener"),
    (8, "EnvironmentLight"),
    (9, "Fog"),
    (10, "Sky"),
    (11, "Terrain"),
    (12, "WaterPlane"),
    (13, "InputMapper"),
    (14, "AnimationController"),
    (15, "Camera"),
    (16, "Light"),
    (17, "Mesh"),
    (18, "OgreCompositor"),
    (19, "OgreCustomObject"),
    (20, "Placeable"),
    (21, "RttTarget"),
    (23, "RigidBody"),
    (24, "VolumeTrigger"),
    (25, "DynamicComponent"),
    (26, "Name"),
    (27, "ParticleSystem"),
    (28, "Highlight"),
    (29, "HoveringText"),
    (30, "TransformGizmo"),
    (31, "Material"),
    (32, "SceneShadowSetup"),
    (33, "ProximityTrigger"),
    (34, "PlanarMirror"),
    (35, "WidgetCanvas"),
    (36, "WebView"),
    (37, "MediaPlayer"),
    (38, "SkyX"),
    (39, "Hydrax"),
    (40, "LaserPointer"),
    (41, "SlideShow"),
    (42, "WidgetBillboard"),
    (43, "PhysicsMotor"),
    (52, "GraphicsViewCanvas"),
    (108, "StencilGlow"),
];

/// Rigid body shape, stored in the `shapeType` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Box = 0,
    Sphere = 1,
    Cylinder = 2,
    Capsule = 3,
    TriMesh = 4,
    HeightField = 5,
    ConvexHull = 6,
    Cone = 7,
}

pub mod rigid_body {
    //! Attribute indices of the RigidBody component.
    pub const MASS: u8 = 0;
    pub const SHAPE_TYPE: u8 = 1;
    pub const SIZE: u8 = 2;
    pub const LINEAR_VELOCITY: u8 = 13;
    pub const ANGULAR_VELOCITY: u8 = 14;
}

pub mod placeable {
    //! Attribute indices of the Placeable component.
    pub const TRANSFORM: u8 = 0;
    pub const PARENT_REF: u8 = 4;
}

/// Schema for a built-in type id.
pub fn builtin_schema(type_id: u32) -> ComponentSchema {
    match type_id {
        NAME => ComponentSchema::new()
            .attribute(AttributeTypeId::String, "name", "Name")
            .attribute(AttributeTypeId::String, "description", "Description")
            .attribute(AttributeTypeId::String, "group", "Group"),
        PLACEABLE => ComponentSchema::new()
            .attribute_with_default("transform", "Transform", Transform::default())
            .attribute_with_default("drawDebug", "Show bounding box", false)
            .attribute_with_default("visible", "Visible", true)
            .attribute_with_default("selectionLayer", "Selection layer", 1)
            .attribute(AttributeTypeId::EntityReference, "parentRef", "Parent entity ref")
            .attribute(AttributeTypeId::String, "parentBone", "Parent bone name"),
        RIGID_BODY => ComponentSchema::new()
            .attribute_with_default("mass", "Mass", 0.0f32)
            .attribute_with_default("shapeType", "Shape type", ShapeType::Box as i32)
            .attribute_with_default("size", "Size", Float3::ONE)
            .attribute(AttributeTypeId::AssetReference, "collisionMeshRef", "Collision mesh ref")
            .attribute_with_default("friction", "Friction", 0.5f32)
            .attribute_with_default("restitution", "Restitution", 0.0f32)
            .attribute_with_default("linearDamping", "Linear damping", 0.0f32)
            .attribute_with_default("angularDamping", "Angular damping", 0.0f32)
            .attribute_with_default("linearFactor", "Linear factor", Float3::ONE)
            .attribute_with_default("angularFactor", "Angular factor", Float3::ONE)
            .attribute_with_default("kinematic", "Kinematic", false)
            .attribute_with_default("phantom", "Phantom", false)
            .attribute_with_default("drawDebug", "Draw debug", false)
            .attribute_with_default("linearVelocity", "Linear velocity", Float3::ZERO)
            .attribute_with_default("angularVelocity", "Angular velocity", Float3::ZERO)
            .attribute_with_default("collisionLayer", "Collision layer", -1)
            .attribute_with_default("collisionMask", "Collision mask", -1)
            .attribute_with_default("rollingFriction", "Rolling friction", 0.5f32)
            .attribute_with_default("useGravity", "Use gravity", true),
        AVATAR => ComponentSchema::new().attribute(
            AttributeTypeId::AssetReference,
            "appearanceRef",
            "Appearance ref",
        ),
        SCRIPT => ComponentSchema::new()
            .attribute(AttributeTypeId::AssetReferenceList, "scriptRef", "Script ref")
            .attribute_with_default("runOnLoad", "Run on load", false)
            .attribute_with_default("runMode", "Run mode", 0)
            .attribute(AttributeTypeId::String, "applicationName", "Script application name")
            .attribute(AttributeTypeId::String, "className", "Script class name"),
        MESH => ComponentSchema::new()
            .attribute_with_default("nodeTransformation", "Transform", Transform::default())
            .attribute(AttributeTypeId::AssetReference, "meshRef", "Mesh ref")
            .attribute(AttributeTypeId::AssetReference, "skeletonRef", "Skeleton ref")
            .attribute(AttributeTypeId::AssetReferenceList, "materialRefs", "Mesh materials")
            .attribute_with_default("drawDistance", "Draw distance", 0.0f32)
            .attribute_with_default("castShadows", "Cast shadows", false),
        CAMERA => ComponentSchema::new()
            .attribute_with_default("upVector", "Up vector", Float3::new(0.0, 1.0, 0.0))
            .attribute_with_default("nearPlane", "Near plane", 0.1f32)
            .attribute_with_default("farPlane", "Far plane", 5000.0f32)
            .attribute_with_default("verticalFov", "Vertical FOV", 45.0f32)
            .attribute_with_default(
                "aspectRatio",
                "Aspect ratio",
                AttributeValue::String(String::new()),
            ),
        DYNAMIC_COMPONENT => ComponentSchema::dynamic(),
        _ => ComponentSchema::placeholder(),
    }
}
