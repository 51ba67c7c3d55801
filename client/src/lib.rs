//! # Tundra Client
//! A client for the Tundra scene protocol: logs in over any message
//! transport, mirrors the server's scene, sends local scene changes back
//! and keeps the server informed about where the observer is.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

pub mod shared {
    pub use tundra_shared::{
        message_id, Attribute, AttributeChange, AttributeTypeId, AttributeValue, BitWrite,
        Component, ComponentRegistry, ComponentSchema, Deserializer, Entity, EntityAction,
        ExecType, Float3, MessageId, ProtocolVersion, Quat, Scene, SceneEvent, SceneListener,
        Serde, SerdeErr, Serializer, Transform,
    };
}

mod client;
mod client_config;
mod error;
pub mod messages;
mod network;
mod sync;
pub mod transport;

cfg_if! {
    if #[cfg(feature = "json")] {
        pub use tundra_shared::{load_scene_json, scene_to_json, JsonError, SceneJson};
    }
}

pub use client::TundraClient;
pub use client_config::{ClientConfig, NetworkConfig};
pub use error::{HandlerError, NetworkError, TransportError};
pub use network::{
    ClientContext, ClientEvent, ConnectionState, MessageHandler, Network, ObserverHeartbeat,
};
pub use sync::{
    apply_rigid_body_update, read_component_full_update, wire_id, write_component_full_update,
    SyncManager, SyncState, TundraMessageHandler,
};
pub use transport::{Transport, TransportEvent};
