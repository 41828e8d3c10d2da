//! # Component Storage
//!
//! Sparse storage for one component kind, keyed by entity id.
//!
//! - Access is O(log n) via entity id
//! - Iteration runs in ascending id order, which keeps every system pass
//!   deterministic from frame to frame

use std::collections::BTreeMap;

use super::component::Component;
use super::entity::EntityId;

/// Storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<Health> = ComponentStorage::new();
/// storage.insert(id, Health { total: 3, max: 3 });
/// ```
#[derive(Debug)]
pub struct ComponentStorage<C: Component> {
    data: BTreeMap<EntityId, C>,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    /// Number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the storage is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets a component by entity id.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&C> {
        self.data.get(&id)
    }

    /// Gets a mutable component by entity id.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut C> {
        self.data.get_mut(&id)
    }

    /// Whether `id` has this component.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.data.contains_key(&id)
    }

    /// Attaches a component. Only the world calls this, at spawn.
    pub(crate) fn insert(&mut self, id: EntityId, component: C) {
        self.data.insert(id, component);
    }

    /// Detaches a component. Only the world calls this, at despawn.
    pub(crate) fn remove(&mut self, id: EntityId) -> Option<C> {
        self.data.remove(&id)
    }

    /// Iterates over all components with their ids.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.data.iter().map(|(id, c)| (*id, c))
    }

    /// Iterates mutably over all components with their ids.
    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> {
        self.data.iter_mut().map(|(id, c)| (*id, c))
    }
}

impl<C: Component> Default for ComponentStorage<C> {
    fn default() -> Self {
        Self::new()
    }
}
