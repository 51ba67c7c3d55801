use thiserror::Error;

use crate::{
    component::{ComponentError, RegistryError},
    entity::EntityError,
};

/// Errors that can occur during scene operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// Entity id already present in the scene
    #[error("Entity id {id} is already in use")]
    EntityIdInUse {
        id: u32,
    },

    /// Entity id not present in the scene
    #[error("Entity {id} not found in scene")]
    EntityNotFound {
        id: u32,
    },

    /// Id change other than unacked to replicated
    #[error("Cannot change entity id {old} to {new}: only unacked ids can be replaced by replicated ones")]
    InvalidIdChange {
        old: u32,
        new: u32,
    },

    /// Entity level failure
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Component level failure
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// Component type lookup failure
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
