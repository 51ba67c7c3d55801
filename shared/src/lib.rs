//! # Tundra Shared
//! Attribute, component, entity and scene model shared by Tundra protocol
//! clients, with the binary forms those types take inside scene messages.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

pub use tundra_serde::{
    BitCounter, BitWrite, ConstBitLength, Deserializer, Serde, SerdeErr, Serializer, StringHeader,
};

mod attribute;
mod component;
mod entity;
pub mod protocol;
mod scene;

cfg_if! {
    if #[cfg(feature = "json")] {
        mod json;
        pub use json::{
            load_entity, load_scene_json, scene_to_json, AttributeJson, ComponentJson, EntityJson,
            JsonError, SceneJson,
        };
    }
}

pub use attribute::{
    Attribute, AttributeChange, AttributeError, AttributeTypeId, AttributeValue, Color, Float2,
    Float3, Float4, Point, Quat, Transform,
};
pub use component::{
    builtin_schema, custom_type_id, ensure_type_name_with_prefix, placeable, rigid_body,
    strip_type_prefix, AttributeDecl, Component, ComponentError, ComponentListener,
    ComponentRegistry, ComponentSchema, ComponentTypeId, RegistryError, ShapeType, AVATAR,
    BUILTIN_COMPONENT_TYPES, CAMERA, DYNAMIC_COMPONENT, MAX_ATTRIBUTES, MESH, NAME, PLACEABLE,
    RIGID_BODY, SCRIPT, TYPE_NAME_PREFIX,
};
pub use entity::{
    id_range, is_local_id, is_unacked_id, Entity, EntityAction, EntityError, ExecType, IdRange,
    UniqueIdGenerator, FIRST_LOCAL_ID, FIRST_UNACKED_ID, LAST_REPLICATED_ID, LAST_UNACKED_ID,
};
pub use protocol::{message_id, MessageId, ProtocolError, ProtocolVersion};
pub use scene::{
    EntityHandle, EntityMut, Scene, SceneError, SceneEvent, SceneEventLog, SceneListener,
};
