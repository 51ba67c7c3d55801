use thiserror::Error;
use tundra_serde::SerdeErr;

use super::type_id::AttributeTypeId;

/// Errors that can occur when assigning or decoding attribute values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// Value of another kind assigned to a typed attribute
    #[error("Attribute '{attribute}' holds {expected} values, refused a {actual} value")]
    TypeMismatch {
        attribute: String,
        expected: AttributeTypeId,
        actual: AttributeTypeId,
    },

    /// Text that does not parse as the attribute's type
    #[error("Cannot parse '{text}' as {type_id} for attribute '{attribute}'")]
    InvalidText {
        attribute: String,
        type_id: AttributeTypeId,
        text: String,
    },

    /// Type id outside the attribute type table
    #[error("Unknown attribute type id {type_id}")]
    UnknownType {
        type_id: u8,
    },

    /// Wire bytes could not be decoded
    #[error("Attribute decode failed: {0}")]
    Decode(#[from] SerdeErr),
}
