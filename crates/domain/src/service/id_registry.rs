//! IdRegistry - single source of truth for "is this id taken"
//!
//! One registry belongs to one mission. Each [`IdKind`] is its own
//! namespace. Ids are never handed out twice: a retired id stays burned
//! for the lifetime of the registry.

use sortie_shared::{DuplicateIdError, IdKind, MizError, Result};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
struct IdSpace {
    used: BTreeSet<u32>,
    retired: BTreeSet<u32>,
    /// Highest id ever seen in this namespace
    high_water: u32,
}

impl IdSpace {
    fn lowest_free(&self) -> Option<u32> {
        (1..=u32::MAX).find(|id| !self.used.contains(id) && !self.retired.contains(id))
    }
}

/// Per-mission identifier registry
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    spaces: BTreeMap<IdKind, IdSpace>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an existing id as taken
    pub fn register(&mut self, kind: IdKind, id: u32) -> Result<()> {
        let space = self.spaces.entry(kind).or_default();
        if space.used.contains(&id) || space.retired.contains(&id) {
            return Err(MizError::DuplicateId(DuplicateIdError { kind, id }));
        }
        space.used.insert(id);
        space.high_water = space.high_water.max(id);
        Ok(())
    }

    /// Hand out a fresh id, greater than every id seen so far.
    ///
    /// Once `u32::MAX` has been seen the lowest id never used or retired
    /// is handed out instead.
    pub fn allocate(&mut self, kind: IdKind) -> Result<u32> {
        let space = self.spaces.entry(kind).or_default();
        let id = match space.high_water.checked_add(1) {
            Some(next) => {
                space.high_water = next;
                next
            }
            None => space.lowest_free().ok_or(MizError::IdSpaceExhausted(kind))?,
        };
        space.used.insert(id);
        tracing::trace!(kind = %kind, id, "Id allocated");
        Ok(id)
    }

    /// Forget an id registered by a record that was then dropped.
    ///
    /// Unlike [`IdRegistry::retire`] the id stays free for a later register.
    pub fn release(&mut self, kind: IdKind, id: u32) -> bool {
        self.spaces
            .get_mut(&kind)
            .is_some_and(|space| space.used.remove(&id))
    }

    /// Release an id from use; it is never allocated again
    pub fn retire(&mut self, kind: IdKind, id: u32) -> bool {
        let space = self.spaces.entry(kind).or_default();
        if space.used.remove(&id) {
            space.retired.insert(id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, kind: IdKind, id: u32) -> bool {
        self.spaces
            .get(&kind)
            .is_some_and(|space| space.used.contains(&id))
    }

    /// Number of ids currently in use
    pub fn len(&self, kind: IdKind) -> usize {
        self.spaces.get(&kind).map(|s| s.used.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.values().all(|s| s.used.is_empty())
    }

    /// Ids in use, ascending
    pub fn ids(&self, kind: IdKind) -> Vec<u32> {
        self.spaces
            .get(&kind)
            .map(|s| s.used.iter().copied().collect())
            .unwrap_or_default()
    }
}
