/// Scope of a change: whether it is announced and whether it goes over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttributeChange {
    /// Resolved at call time from the owner's locality.
    #[default]
    Default,
    /// Store only, announce nothing.
    Disconnected,
    /// Announce locally, never replicate.
    LocalOnly,
    /// Announce and replicate.
    Replicate,
}

impl AttributeChange {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(AttributeChange::Default),
            1 => Some(AttributeChange::Disconnected),
            2 => Some(AttributeChange::LocalOnly),
            3 => Some(AttributeChange::Replicate),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            AttributeChange::Default => 0,
            AttributeChange::Disconnected => 1,
            AttributeChange::LocalOnly => 2,
            AttributeChange::Replicate => 3,
        }
    }

    /// `Default` becomes `LocalOnly` for local owners and `Replicate` otherwise.
    pub fn resolve(self, local: bool) -> Self {
        match self {
            AttributeChange::Default if local => AttributeChange::LocalOnly,
            AttributeChange::Default => AttributeChange::Replicate,
            other => other,
        }
    }

    pub fn is_disconnected(self) -> bool {
        self == AttributeChange::Disconnected
    }

    pub fn replicates(self) -> bool {
        self == AttributeChange::Replicate
    }
}
