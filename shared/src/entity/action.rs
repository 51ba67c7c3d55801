use std::ops::{BitOr, BitOrAssign};

/// Where an entity action runs. Combine with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExecType(u8);

impl ExecType {
    pub const NONE: ExecType = ExecType(0);
    pub const LOCAL: ExecType = ExecType(1);
    pub const SERVER: ExecType = ExecType(2);
    pub const PEERS: ExecType = ExecType(4);

    pub fn from_bits(bits: u8) -> Self {
        ExecType(bits & 0x7)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: ExecType) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: ExecType) -> bool {
        self.0 & other.0 != 0
    }

    /// The part that has to travel over the network.
    pub fn remote(self) -> ExecType {
        ExecType(self.0 & (Self::SERVER.0 | Self::PEERS.0))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ExecType {
    type Output = ExecType;

    fn bitor(self, rhs: ExecType) -> ExecType {
        ExecType(self.0 | rhs.0)
    }
}

impl BitOrAssign for ExecType {
    fn bitor_assign(&mut self, rhs: ExecType) {
        self.0 |= rhs.0;
    }
}

/// Named command on an entity with string parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityAction {
    pub entity_id: u32,
    pub name: String,
    pub exec_type: ExecType,
    pub parameters: Vec<String>,
}

impl EntityAction {
    pub fn new(entity_id: u32, name: &str, exec_type: ExecType, parameters: Vec<String>) -> Self {
        Self {
            entity_id,
            name: name.to_string(),
            exec_type,
            parameters,
        }
    }
}
