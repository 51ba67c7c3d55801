use thiserror::Error;

/// Errors that can occur while configuring a locked builder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Registry is locked and cannot be modified
    #[error("Component registry is already locked and cannot be modified. ComponentRegistry::lock() has been called and no further changes are allowed")]
    AlreadyLocked,
}
