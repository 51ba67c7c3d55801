use thiserror::Error;
use tundra_serde::SerdeErr;

use crate::{attribute::AttributeError, protocol::ProtocolError};

/// Errors that can occur when registering or instantiating component types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Type id 0 is reserved
    #[error("Component type id 0 is reserved")]
    ReservedTypeId,

    /// Type name empty after stripping the EC_ prefix
    #[error("Component type name must not be empty")]
    EmptyTypeName,

    /// Type id already registered under another name
    #[error("Component type id {type_id} is already registered as '{existing}'")]
    DuplicateTypeId {
        type_id: u32,
        existing: String,
    },

    /// Type name already registered under another id
    #[error("Component type name '{type_name}' is already registered with id {existing}")]
    DuplicateTypeName {
        type_name: String,
        existing: u32,
    },

    /// Schema with more attributes than a u8 index can address
    #[error("Component type '{type_name}' declares {count} attributes, at most 256 are addressable")]
    TooManyAttributes {
        type_name: String,
        count: usize,
    },

    /// Type id not in the registry
    #[error("Unknown component type id {type_id}")]
    UnknownTypeId {
        type_id: u32,
    },

    /// Type name not in the registry
    #[error("Unknown component type name '{type_name}'")]
    UnknownTypeName {
        type_name: String,
    },

    /// Registry has been locked
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Errors that can occur during component attribute operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    /// Runtime attribute change on a component with a fixed layout
    #[error("Component '{type_name}' does not support dynamic attributes")]
    NotDynamic {
        type_name: String,
    },

    /// No live attribute with this name or index
    #[error("Attribute '{attribute}' not found in component '{type_name}'")]
    AttributeNotFound {
        type_name: String,
        attribute: String,
    },

    /// Name or index already taken by a live attribute
    #[error("Attribute '{attribute}' already exists in component '{type_name}'")]
    AttributeAlreadyExists {
        type_name: String,
        attribute: String,
    },

    /// Name longer than its u8 byte-length header allows
    #[error("Attribute name of {byte_len} bytes is too long for component '{type_name}', at most 255 fit")]
    NameTooLong {
        type_name: String,
        byte_len: usize,
    },

    /// All attribute indices are in use
    #[error("No free attribute index left in component '{type_name}'")]
    IndexSpaceExhausted {
        type_name: String,
    },

    /// Value could not be stored
    #[error(transparent)]
    Attribute(#[from] AttributeError),

    /// Wire bytes could not be decoded or encoded
    #[error("Component data codec failed: {0}")]
    Codec(#[from] SerdeErr),
}
