//! # Store World
//!
//! The central container for all entities and components: one record per
//! entity plus one sparse storage per component kind. Systems never own
//! component data; they hold entity ids and look components up here.

use std::collections::BTreeMap;

use keystone_shared::Category;

use super::component::{
    Animation, Coins, Component, Dash, Health, Ignore, Invincible, Loot, Movement, Spatial,
    Temporary, Toggler, Warp,
};
use super::entity::{EntityId, EntityMeta};
use super::storage::ComponentStorage;
use crate::builder::EntityBundle;

/// The store - container for all simulation state.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new();
/// let id = world.spawn(bundle);
/// if let Some(health) = world.health.get_mut(id) {
///     health.total -= 1;
/// }
/// ```
#[derive(Debug, Default)]
pub struct World {
    entities: BTreeMap<EntityId, EntityMeta>,

    // =========================================================================
    // Component Storages - Add new component types here
    // =========================================================================
    /// Rectangles and hitboxes.
    pub spatial: ComponentStorage<Spatial>,
    /// Direction, speed and move counters.
    pub movement: ComponentStorage<Movement>,
    /// Hit points.
    pub health: ComponentStorage<Health>,
    /// Coin counts.
    pub coins: ComponentStorage<Coins>,
    /// Dash charge.
    pub dash: ComponentStorage<Dash>,
    /// Door and switch state.
    pub toggler: ComponentStorage<Toggler>,
    /// Collision suppression.
    pub ignore: ComponentStorage<Ignore>,
    /// Expiration countdowns.
    pub temporary: ComponentStorage<Temporary>,
    /// Animation playback.
    pub animation: ComponentStorage<Animation>,
    /// Damage immunity.
    pub invincible: ComponentStorage<Invincible>,
    /// Teleport destinations.
    pub warp: ComponentStorage<Warp>,
    /// Death drops.
    pub loot: ComponentStorage<Loot>,
}

/// Moves an optional component out of a bundle into its storage.
macro_rules! attach {
    ($meta:ident, $storage:expr, $id:expr, $value:expr, $kind:ty) => {
        if let Some(component) = $value {
            $storage.insert($id, component);
            $meta.add_component(<$kind as Component>::ID);
        }
    };
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entities in the store.
    #[inline]
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.entities.len()
    }

    /// Inserts a built entity, attaching every component present in the
    /// bundle. Returns the entity's id.
    ///
    /// Spawning an id that is already present replaces the old entity.
    pub fn spawn(&mut self, bundle: EntityBundle) -> EntityId {
        let id = bundle.id;
        if self.entities.contains_key(&id) {
            self.despawn(id);
        }

        let mut meta = EntityMeta::new(id, bundle.category);
        attach!(meta, self.spatial, id, bundle.spatial, Spatial);
        attach!(meta, self.movement, id, bundle.movement, Movement);
        attach!(meta, self.health, id, bundle.health, Health);
        attach!(meta, self.coins, id, bundle.coins, Coins);
        attach!(meta, self.dash, id, bundle.dash, Dash);
        attach!(meta, self.toggler, id, bundle.toggler, Toggler);
        attach!(meta, self.ignore, id, bundle.ignore, Ignore);
        attach!(meta, self.temporary, id, bundle.temporary, Temporary);
        attach!(meta, self.animation, id, bundle.animation, Animation);
        attach!(meta, self.invincible, id, bundle.invincible, Invincible);
        attach!(meta, self.warp, id, bundle.warp, Warp);
        attach!(meta, self.loot, id, bundle.loot, Loot);

        self.entities.insert(id, meta);
        tracing::debug!(%id, category = ?bundle.category, "entity spawned");
        id
    }

    /// Removes an entity and every component it carries.
    ///
    /// # Returns
    ///
    /// `true` if the entity was removed, `false` if it was not present.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if self.entities.remove(&id).is_none() {
            return false;
        }

        self.spatial.remove(id);
        self.movement.remove(id);
        self.health.remove(id);
        self.coins.remove(id);
        self.dash.remove(id);
        self.toggler.remove(id);
        self.ignore.remove(id);
        self.temporary.remove(id);
        self.animation.remove(id);
        self.invincible.remove(id);
        self.warp.remove(id);
        self.loot.remove(id);

        tracing::debug!(%id, "entity despawned");
        true
    }

    /// Checks if an entity is in the store.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Gets an entity record by id.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityMeta> {
        self.entities.get(&id)
    }

    /// Category of an entity, if present.
    #[inline]
    #[must_use]
    pub fn category(&self, id: EntityId) -> Option<Category> {
        self.entities.get(&id).map(|meta| meta.category)
    }

    /// Iterates over all entity records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityMeta> {
        self.entities.values()
    }

    /// Ids of every entity of `category`, in id order.
    #[must_use]
    pub fn ids_of(&self, category: Category) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|meta| meta.category == category)
            .map(|meta| meta.id)
            .collect()
    }

    /// Current rectangle of an entity.
    #[inline]
    #[must_use]
    pub fn rect(&self, id: EntityId) -> Option<keystone_shared::Rect> {
        self.spatial.get(id).map(|spatial| spatial.rect)
    }

    /// Whether the entity has an `Ignore` component that is set.
    #[inline]
    #[must_use]
    pub fn is_ignored(&self, id: EntityId) -> bool {
        self.ignore.get(id).is_some_and(|ignore| ignore.ignored)
    }

    /// Whether the entity has an `Invincible` component that is enabled.
    #[inline]
    #[must_use]
    pub fn is_invincible(&self, id: EntityId) -> bool {
        self.invincible.get(id).is_some_and(|inv| inv.enabled)
    }
}
