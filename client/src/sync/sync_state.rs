use std::collections::BTreeSet;

/// Ids created, removed and modified since the last send. Used at scene
/// level for entity ids, at entity level for component ids and at component
/// level for attribute indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState<T: Ord + Copy> {
    created: BTreeSet<T>,
    removed: BTreeSet<T>,
    modified: BTreeSet<T>,
    /// Entity level only: the parent changed.
    pub parent_changed: bool,
}

impl<T: Ord + Copy> Default for SyncState<T> {
    fn default() -> Self {
        Self {
            created: BTreeSet::new(),
            removed: BTreeSet::new(),
            modified: BTreeSet::new(),
            parent_changed: false,
        }
    }
}

impl<T: Ord + Copy> SyncState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_created(&mut self, id: T) {
        self.created.insert(id);
    }

    /// A removal cancels pending creation and modification of the same id.
    pub fn add_removed(&mut self, id: T) {
        self.created.remove(&id);
        self.modified.remove(&id);
        self.removed.insert(id);
    }

    pub fn add_modified(&mut self, id: T) {
        self.modified.insert(id);
    }

    pub fn remove_created(&mut self, id: T) {
        self.created.remove(&id);
    }

    pub fn remove_modified(&mut self, id: T) {
        self.modified.remove(&id);
    }

    pub fn is_created(&self, id: T) -> bool {
        self.created.contains(&id)
    }

    pub fn is_removed(&self, id: T) -> bool {
        self.removed.contains(&id)
    }

    pub fn is_modified(&self, id: T) -> bool {
        self.modified.contains(&id)
    }

    pub fn take_created(&mut self) -> BTreeSet<T> {
        std::mem::take(&mut self.created)
    }

    pub fn take_removed(&mut self) -> BTreeSet<T> {
        std::mem::take(&mut self.removed)
    }

    pub fn take_modified(&mut self) -> BTreeSet<T> {
        std::mem::take(&mut self.modified)
    }

    pub fn clear(&mut self) {
        self.created.clear();
        self.removed.clear();
        self.modified.clear();
        self.parent_changed = false;
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty() && self.modified.is_empty() && !self.parent_changed
    }

    /// Moves pending work recorded under `old` to `new`.
    pub fn rename(&mut self, old: T, new: T) {
        for set in [&mut self.created, &mut self.removed, &mut self.modified] {
            if set.remove(&old) {
                set.insert(new);
            }
        }
    }
}
