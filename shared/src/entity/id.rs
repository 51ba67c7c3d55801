//! Id spaces shared by entities and components.
//!
//! | range                         | meaning                               |
//! |-------------------------------|---------------------------------------|
//! | `0`                           | "allocate for me"                     |
//! | `1..=0x3fff_ffff`             | replicated, assigned by the server    |
//! | `0x4000_0000..0x8000_0000`    | unacked, awaiting a server id         |
//! | `0x8000_0000..=0xffff_ffff`   | local, never replicated               |

pub const LAST_REPLICATED_ID: u32 = 0x3fff_ffff;
pub const FIRST_UNACKED_ID: u32 = 0x4000_0000;
pub const LAST_UNACKED_ID: u32 = 0x7fff_ffff;
pub const FIRST_LOCAL_ID: u32 = 0x8000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdRange {
    /// Id 0, a request to allocate.
    Unassigned,
    Replicated,
    Unacked,
    Local,
}

pub fn id_range(id: u32) -> IdRange {
    match id {
        0 => IdRange::Unassigned,
        1..=LAST_REPLICATED_ID => IdRange::Replicated,
        FIRST_UNACKED_ID..=LAST_UNACKED_ID => IdRange::Unacked,
        _ => IdRange::Local,
    }
}

pub fn is_local_id(id: u32) -> bool {
    id >= FIRST_LOCAL_ID
}

pub fn is_unacked_id(id: u32) -> bool {
    (FIRST_UNACKED_ID..FIRST_LOCAL_ID).contains(&id)
}

/// Hands out ids from the three spaces. Each space wraps back to its first
/// id once exhausted; callers skip ids that are still in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueIdGenerator {
    replicated: u32,
    unacked: u32,
    local: u32,
}

impl Default for UniqueIdGenerator {
    fn default() -> Self {
        Self {
            replicated: 0,
            unacked: FIRST_UNACKED_ID,
            local: FIRST_LOCAL_ID,
        }
    }
}

impl UniqueIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_replicated(&mut self) -> u32 {
        self.replicated = if self.replicated >= LAST_REPLICATED_ID {
            1
        } else {
            self.replicated + 1
        };
        self.replicated
    }

    pub fn allocate_unacked(&mut self) -> u32 {
        self.unacked += 1;
        if self.unacked >= FIRST_LOCAL_ID {
            self.unacked = FIRST_UNACKED_ID + 1;
        }
        self.unacked
    }

    pub fn allocate_local(&mut self) -> u32 {
        self.local = if self.local == u32::MAX {
            FIRST_LOCAL_ID + 1
        } else {
            self.local + 1
        };
        self.local
    }

    /// Moves the matching counter past `id` so that it is not handed out
    /// again before the space wraps.
    pub fn observe(&mut self, id: u32) {
        match id_range(id) {
            IdRange::Unassigned => {}
            IdRange::Replicated => self.replicated = self.replicated.max(id),
            IdRange::Unacked => self.unacked = self.unacked.max(id),
            IdRange::Local => self.local = self.local.max(id),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges() {
        assert_eq!(id_range(0), IdRange::Unassigned);
        assert_eq!(id_range(1), IdRange::Replicated);
        assert_eq!(id_range(LAST_REPLICATED_ID), IdRange::Replicated);
        assert_eq!(id_range(FIRST_UNACKED_ID), IdRange::Unacked);
        assert_eq!(id_range(FIRST_LOCAL_ID - 1), IdRange::Unacked);
        assert_eq!(id_range(FIRST_LOCAL_ID), IdRange::Local);
        assert_eq!(id_range(u32::MAX), IdRange::Local);
        assert!(is_local_id(0x8000_0005));
        assert!(is_unacked_id(0x4000_0001));
        assert!(!is_unacked_id(5));
    }

    #[test]
    fn first_allocations() {
        let mut generator = UniqueIdGenerator::new();
        assert_eq!(generator.allocate_replicated(), 1);
        assert_eq!(generator.allocate_unacked(), 0x4000_0001);
        assert_eq!(generator.allocate_local(), 0x8000_0001);
    }

    #[test]
    fn every_space_wraps_into_itself() {
        let mut generator = UniqueIdGenerator {
            replicated: LAST_REPLICATED_ID,
            unacked: FIRST_LOCAL_ID - 1,
            local: u32::MAX,
        };
        assert_eq!(generator.allocate_replicated(), 1);
        assert_eq!(generator.allocate_unacked(), FIRST_UNACKED_ID + 1);
        assert_eq!(generator.allocate_local(), FIRST_LOCAL_ID + 1);
    }

    #[test]
    fn observe_skips_seen_ids() {
        let mut generator = UniqueIdGenerator::new();
        generator.observe(41);
        generator.observe(0x8000_0010);
        generator.observe(3);
        assert_eq!(generator.allocate_replicated(), 42);
        assert_eq!(generator.allocate_local(), 0x8000_0011);
        generator.reset();
        assert_eq!(generator.allocate_replicated(), 1);
    }
}
