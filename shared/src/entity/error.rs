use thiserror::Error;

use crate::component::{ComponentError, RegistryError};

/// Errors that can occur during entity operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// Component id already present on the entity
    #[error("Entity {entity} already has a component with id {id}")]
    IdInUse {
        entity: u32,
        id: u32,
    },

    /// Component id not present on the entity
    #[error("Entity {entity} has no component with id {id}")]
    ComponentNotFound {
        entity: u32,
        id: u32,
    },

    /// Id change other than unacked to replicated
    #[error("Cannot change id {old} to {new}: only unacked ids can be replaced by replicated ones")]
    InvalidIdChange {
        old: u32,
        new: u32,
    },

    /// Parent assignment that would make the entity its own ancestor
    #[error("Entity {entity} cannot take {parent} as parent: the hierarchy would form a cycle")]
    CyclicParent {
        entity: u32,
        parent: u32,
    },

    /// Component could not be instantiated
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Attribute operation failed
    #[error(transparent)]
    Component(#[from] ComponentError),
}
