//! # Entity Management
//!
//! Entities are plain integer ids handed out in strictly increasing order.
//! Ids are never recycled, so a reference held past an entity's removal
//! simply misses every lookup instead of aliasing a newer entity.

use std::fmt;

use keystone_shared::Category;
use serde::{Deserialize, Serialize};

/// Unique identifier for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Null/invalid entity ID. The allocator never hands it out.
    pub const NULL: Self = Self(0);

    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source.
#[derive(Debug)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Creates an allocator whose first id is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns a fresh id, strictly greater than every id returned before.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Store record for one entity: its id, its immutable category and the
/// bitmask of components it was spawned with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityMeta {
    /// The unique identifier for this entity.
    pub id: EntityId,
    /// Immutable category tag.
    pub category: Category,
    /// Bitmask of attached components, see [`crate::Component::ID`].
    component_mask: u32,
}

impl EntityMeta {
    /// Creates a record with no components.
    #[inline]
    #[must_use]
    pub const fn new(id: EntityId, category: Category) -> Self {
        Self {
            id,
            category,
            component_mask: 0,
        }
    }

    /// Checks if this entity has a specific component.
    ///
    /// # Arguments
    ///
    /// * `component_id` - The component type ID (0-31)
    #[inline]
    #[must_use]
    pub const fn has_component(&self, component_id: u8) -> bool {
        (self.component_mask & (1 << component_id)) != 0
    }

    /// Marks a component as present. Only the store calls this, at spawn.
    #[inline]
    pub(crate) fn add_component(&mut self, component_id: u8) {
        self.component_mask |= 1 << component_id;
    }
}
