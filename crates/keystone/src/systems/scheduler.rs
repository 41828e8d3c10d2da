//! # Systems Manager
//!
//! Owns the fixed update order and routes entity registration and removal
//! to every system. Holds no component data; the only state besides the
//! system list is the id allocator.

use keystone_core::{build_entity_from_config, EntityConfig, EntityId, IdAllocator, World};
use keystone_shared::Category;

use super::{Command, FrameContext, Placement, System};
use crate::error::GameResult;
use crate::events::{EventSender, GameEvent};

/// Fixed-order list of systems plus the entity id allocator.
#[derive(Default)]
pub struct SystemsManager {
    systems: Vec<Box<dyn System>>,
    ids: IdAllocator,
}

impl SystemsManager {
    /// Creates a manager with no systems.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends systems to the update order.
    pub fn add_systems(&mut self, systems: impl IntoIterator<Item = Box<dyn System>>) {
        for system in systems {
            tracing::debug!(system = system.name(), order = self.systems.len(), "system added");
            self.systems.push(system);
        }
    }

    /// Systems in update order.
    pub fn systems(&self) -> impl Iterator<Item = &dyn System> {
        self.systems.iter().map(AsRef::as_ref)
    }

    /// Looks a system up by name.
    #[must_use]
    pub fn system(&self, name: &str) -> Option<&dyn System> {
        self.systems().find(|system| system.name() == name)
    }

    /// Allocates a fresh entity id. Ids increase strictly and are never
    /// reused.
    pub fn new_entity_id(&mut self) -> EntityId {
        self.ids.next_id()
    }

    /// Offers an entity to every system. Returns how many kept it.
    pub fn add_entity(&mut self, world: &World, id: EntityId) -> usize {
        let Some(meta) = world.get(id) else {
            return 0;
        };
        let mut kept = 0;
        for system in &mut self.systems {
            if system.add(meta) {
                kept += 1;
            }
        }
        kept
    }

    /// Offers several entities to every system.
    pub fn add_entities(&mut self, world: &World, ids: &[EntityId]) {
        for &id in ids {
            self.add_entity(world, id);
        }
    }

    /// Runs every system once, in order, applying queued commands after
    /// each. Stops at the first error.
    ///
    /// # Errors
    ///
    /// Propagates the first system or command error.
    pub fn update(&mut self, ctx: &mut FrameContext<'_>) -> GameResult<()> {
        for index in 0..self.systems.len() {
            self.systems[index].update(ctx)?;
            self.apply_commands(ctx)?;
        }
        Ok(())
    }

    /// Runs the system called `name` alone, then applies its commands.
    /// Returns `false` when no system has that name.
    ///
    /// # Errors
    ///
    /// Propagates the system or command error.
    pub fn update_system(&mut self, name: &str, ctx: &mut FrameContext<'_>) -> GameResult<bool> {
        let Some(index) = self.systems.iter().position(|system| system.name() == name) else {
            return Ok(false);
        };
        self.systems[index].update(ctx)?;
        self.apply_commands(ctx)?;
        Ok(true)
    }

    /// Executes queued spawns and removals.
    ///
    /// # Errors
    ///
    /// Fails on an unknown preset or an invalid record.
    pub fn apply_commands(&mut self, ctx: &mut FrameContext<'_>) -> GameResult<()> {
        for command in ctx.commands.drain() {
            match command {
                Command::Spawn { preset, at } => {
                    let mut config = ctx.presets.instantiate(&preset, 0.0, 0.0)?;
                    let (x, y) = match at {
                        Placement::TopLeft(x, y) => (x, y),
                        Placement::Center(x, y) => (x - config.w / 2.0, y - config.h / 2.0),
                    };
                    config.x = x;
                    config.y = y;
                    self.spawn(ctx.world, &config, ctx.config.frame_rate, ctx.events)?;
                }
                Command::SpawnConfig(config) => {
                    self.spawn(ctx.world, &config, ctx.config.frame_rate, ctx.events)?;
                }
                Command::Despawn(id) => {
                    if self.despawn(ctx.world, id) {
                        ctx.events.send(GameEvent::EntityDespawned { entity_id: id });
                    }
                }
            }
        }
        Ok(())
    }

    /// Builds an entity from a record, stores it and registers it with
    /// every system.
    ///
    /// # Errors
    ///
    /// Returns an error if the record fails validation.
    pub fn spawn(
        &mut self,
        world: &mut World,
        config: &EntityConfig,
        frame_rate: u32,
        events: &EventSender,
    ) -> GameResult<EntityId> {
        config.validate()?;
        let id = self.new_entity_id();
        world.spawn(build_entity_from_config(config, id, frame_rate));
        self.add_entity(world, id);
        events.send(GameEvent::EntitySpawned {
            entity_id: id,
            category: config.category,
        });
        Ok(id)
    }

    /// Removes an entity from every system and from the store.
    pub fn despawn(&mut self, world: &mut World, id: EntityId) -> bool {
        let category = world.category(id);
        if let Some(category) = category {
            self.remove(category, id);
        }
        world.despawn(id)
    }

    /// Stops every system from tracking `id`.
    pub fn remove(&mut self, category: Category, id: EntityId) {
        let mut holders = 0;
        for system in &mut self.systems {
            if system.remove(id) {
                holders += 1;
            }
        }
        tracing::debug!(%id, ?category, holders, "entity removed from systems");
    }

    /// Stops every system from tracking an enemy.
    pub fn remove_enemy(&mut self, id: EntityId) {
        self.remove(Category::Enemy, id);
    }

    /// Stops every system from tracking any entity of `category`. Returns the
    /// ids that were tracked by at least one system.
    pub fn remove_all(&mut self, category: Category) -> Vec<EntityId> {
        let mut removed: Vec<EntityId> = self
            .systems
            .iter_mut()
            .flat_map(|system| system.remove_all(category))
            .collect();
        removed.sort_unstable();
        removed.dedup();
        removed
    }

    /// Tells every system the current room changed.
    pub fn room_changed(&mut self) {
        for system in &mut self.systems {
            system.room_changed();
        }
    }

    /// Forgets every tracked entity in every system.
    pub fn clear(&mut self) {
        for category in Category::ALL {
            self.remove_all(category);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keystone_core::PresetRegistry;

    use crate::config::EngineConfig;
    use crate::error::GameError;
    use crate::events::EventBus;
    use crate::systems::{
        Capability, CommandQueue, FrameResources, Membership, MovementSystem, RenderSystem,
    };

    /// Queues one rock per update, or fails.
    struct Spawner {
        name: &'static str,
        members: Membership,
        fail: bool,
    }

    impl System for Spawner {
        fn name(&self) -> &'static str {
            self.name
        }
        fn capability(&self) -> Capability {
            Capability::Drawable
        }
        fn members(&self) -> &Membership {
            &self.members
        }
        fn members_mut(&mut self) -> &mut Membership {
            &mut self.members
        }
        fn update(&mut self, ctx: &mut FrameContext<'_>) -> GameResult<()> {
            if self.fail {
                return Err(GameError::InvalidConfig(self.name.to_owned()));
            }
            ctx.commands.spawn("rock", 0.0, f64::from(ctx.world.alive_count() as u32));
            Ok(())
        }
    }

    fn spawner(name: &'static str, fail: bool) -> Box<dyn System> {
        Box::new(Spawner {
            name,
            members: Membership::new(),
            fail,
        })
    }

    fn resources() -> FrameResources {
        let bus = EventBus::new(64);
        FrameResources::new(EngineConfig::default(), PresetRegistry::builtin(), bus.sender())
    }

    #[test]
    fn test_ids_strictly_increase() {
        let mut manager = SystemsManager::new();
        let a = manager.new_entity_id();
        let b = manager.new_entity_id();
        assert!(b > a);
        assert!(!a.is_null());
    }

    #[test]
    fn test_commands_applied_between_systems() {
        let mut manager = SystemsManager::new();
        manager.add_systems([spawner("first", false), spawner("second", false)]);
        let mut world = World::new();
        let mut res = resources();

        manager.update(&mut res.context(&mut world)).unwrap();

        // The second system saw the rock spawned after the first one ran.
        assert_eq!(world.alive_count(), 2);
        let rocks = world.ids_of(Category::Obstacle);
        assert_eq!(world.rect(rocks[1]).map(|r| r.y), Some(1.0));
        assert!(manager.system("second").unwrap().members().contains(rocks[0]));
    }

    #[test]
    fn test_update_is_fail_fast() {
        let mut manager = SystemsManager::new();
        manager.add_systems([spawner("ok", false), spawner("broken", true), spawner("never", false)]);
        let mut world = World::new();
        let mut res = resources();

        let result = manager.update(&mut res.context(&mut world));
        assert_eq!(result, Err(GameError::InvalidConfig("broken".to_owned())));
        // Only the first system's spawn happened.
        assert_eq!(world.alive_count(), 1);
    }

    #[test]
    fn test_update_single_system() {
        let mut manager = SystemsManager::new();
        manager.add_systems([spawner("first", false), spawner("second", false)]);
        let mut world = World::new();
        let mut res = resources();

        assert_eq!(manager.update_system("second", &mut res.context(&mut world)), Ok(true));
        assert_eq!(world.alive_count(), 1);
        assert_eq!(manager.update_system("missing", &mut res.context(&mut world)), Ok(false));
        assert_eq!(world.alive_count(), 1);
    }

    #[test]
    fn test_remove_fans_out() {
        let mut manager = SystemsManager::new();
        manager.add_systems([
            Box::new(MovementSystem::new()) as Box<dyn System>,
            Box::new(RenderSystem::new()),
        ]);
        let mut world = World::new();
        let res = resources();
        let config = res.presets.instantiate("skeleton", 32.0, 32.0).unwrap();
        let id = manager.spawn(&mut world, &config, 60, &res.events).unwrap();
        assert_eq!(manager.systems().filter(|s| s.members().contains(id)).count(), 2);

        manager.remove_enemy(id);
        assert!(manager.systems().all(|s| !s.members().contains(id)));
        assert!(world.is_alive(id));
    }

    #[test]
    fn test_unknown_preset_command_fails() {
        let mut manager = SystemsManager::new();
        let mut world = World::new();
        let mut res = resources();
        let mut queue = CommandQueue::default();
        queue.spawn("dragon", 0.0, 0.0);
        res.commands = queue;

        let result = manager.apply_commands(&mut res.context(&mut world));
        assert!(matches!(result, Err(GameError::Core(_))));
    }

    #[test]
    fn test_centered_spawn() {
        let mut manager = SystemsManager::new();
        let mut world = World::new();
        let mut res = resources();
        res.commands.spawn_centered("coin", 100.0, 100.0);

        manager.apply_commands(&mut res.context(&mut world)).unwrap();
        let coin = world.ids_of(Category::Coin)[0];
        let rect = world.rect(coin).unwrap();
        assert_eq!(rect.center(), (100.0, 100.0));
    }
}
