mod error;
pub mod message_id;

pub use error::ProtocolError;
pub use message_id::MessageId;

/// Protocol revision negotiated in the login reply. Later revisions add
/// fields to existing messages, so readers gate on `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ProtocolVersion {
    #[default]
    Original = 1,
    /// Custom component type registration (message 123).
    CustomComponents = 2,
    /// Entity parents in CreateEntity and message 124.
    HierarchicScene = 3,
    /// Compact rigid body updates (message 119).
    WebClientRigidBodyMessage = 4,
}

impl ProtocolVersion {
    /// Newest revision this client speaks.
    pub const LATEST: ProtocolVersion = ProtocolVersion::WebClientRigidBodyMessage;

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(ProtocolVersion::Original),
            2 => Some(ProtocolVersion::CustomComponents),
            3 => Some(ProtocolVersion::HierarchicScene),
            4 => Some(ProtocolVersion::WebClientRigidBodyMessage),
            _ => None,
        }
    }

    pub fn to_u32(self) -> u32 {
        self as u32
    }

    /// Unknown newer revisions are treated as the newest known one.
    pub fn from_u32_saturating(value: u32) -> Self {
        match Self::from_u32(value) {
            Some(version) => version,
            None if value > Self::LATEST.to_u32() => Self::LATEST,
            None => ProtocolVersion::Original,
        }
    }
}
