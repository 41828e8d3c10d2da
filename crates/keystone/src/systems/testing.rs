//! Test fixture: one system, a world and frame resources.

use keystone_core::{build_entity_from_config, EntityId, IdAllocator, PresetRegistry, World};
use keystone_shared::Rect;

use super::{FrameResources, System};
use crate::config::EngineConfig;
use crate::events::{EventBus, EventReceiver};

pub(crate) struct Fixture<S: System> {
    pub world: World,
    pub system: S,
    pub res: FrameResources,
    pub events: EventReceiver,
    ids: IdAllocator,
}

impl<S: System> Fixture<S> {
    pub fn new(system: S) -> Self {
        let bus = EventBus::new(256);
        Self {
            world: World::new(),
            system,
            res: FrameResources::new(EngineConfig::default(), PresetRegistry::builtin(), bus.sender()),
            events: bus.receiver(),
            ids: IdAllocator::new(),
        }
    }

    /// Spawns a preset and offers it to the system under test.
    pub fn spawn(&mut self, preset: &str, x: f64, y: f64) -> EntityId {
        let config = self.res.presets.instantiate(preset, x, y).unwrap();
        let id = self.ids.next_id();
        self.world.spawn(build_entity_from_config(&config, id, self.res.config.frame_rate));
        let meta = *self.world.get(id).unwrap();
        self.system.add(&meta);
        id
    }

    pub fn step(&mut self) {
        self.system.update(&mut self.res.context(&mut self.world)).unwrap();
    }

    pub fn rect(&self, id: EntityId) -> Rect {
        self.world.rect(id).unwrap()
    }
}
