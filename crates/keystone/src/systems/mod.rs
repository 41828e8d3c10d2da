//! # Systems
//!
//! ```text
//! Frame N (Game state):
//! ┌───────────────────────────────────────────────────────────────┐
//! │ input ──> movement ──> collision ──> timers ──> animation ──> │
//! │   │          │            │             │           │         │
//! │   └──────────┴── commands applied after each system ┴────────>│ render
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! A system tracks entity ids, never component data. Membership is decided
//! once, when the entity is registered, by the system's [`Capability`].
//! Removal is the same three calls on every system, so forgetting a system
//! during a purge is not possible.

mod animation;
mod collision;
mod input;
mod movement;
mod render;
mod scheduler;
#[cfg(test)]
pub(crate) mod testing;
mod timer;

use std::collections::BTreeMap;

use keystone_core::{
    Animation, Component, EntityConfig, EntityId, EntityMeta, Invincible, Movement,
    PresetRegistry, Spatial, Temporary, World,
};
use keystone_shared::{Category, Side};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::EngineConfig;
use crate::error::GameResult;
use crate::events::EventSender;
use crate::input::InputFrame;

pub use animation::AnimationSystem;
pub use collision::{CollisionReactor, CollisionSystem, Contact};
pub use input::InputSystem;
pub use movement::{enemy_moving_from_hit, move_enemy_back, move_player_back, MovementSystem};
pub use render::{DrawCommand, DrawList, RenderSystem};
pub use scheduler::SystemsManager;
pub use timer::TimerSystem;

// ============================================================================
// CAPABILITIES
// ============================================================================

/// What an entity must offer for a system to track it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Player and its weapons.
    Controllable,
    /// Anything the movement pass writes rectangles for.
    Movable,
    /// Anything collision checks consider.
    Collidable,
    /// Entities with a countdown.
    Timed,
    /// Entities with frame sequences.
    Animated,
    /// Entities that appear in the draw list.
    Drawable,
}

impl Capability {
    /// Whether an entity record qualifies.
    #[must_use]
    pub fn matches(self, meta: &EntityMeta) -> bool {
        let spatial = meta.has_component(Spatial::ID);
        match self {
            Self::Controllable => {
                matches!(meta.category, Category::Player | Category::Sword | Category::Arrow)
            }
            Self::Movable => match meta.category {
                Category::Sword => spatial,
                Category::Player
                | Category::Arrow
                | Category::MovableObstacle
                | Category::Enemy => spatial && meta.has_component(Movement::ID),
                _ => false,
            },
            Self::Collidable => {
                spatial
                    && !matches!(
                        meta.category,
                        Category::Bomb | Category::Ignore | Category::Rectangle
                    )
            }
            Self::Timed => {
                meta.has_component(Temporary::ID) || meta.has_component(Invincible::ID)
            }
            Self::Animated => meta.has_component(Animation::ID),
            Self::Drawable => spatial && meta.category != Category::Rectangle,
        }
    }
}

/// Entity ids a system tracks, with their categories.
///
/// Ordered by id, so every pass visits entities in ascending id order.
#[derive(Clone, Debug, Default)]
pub struct Membership {
    members: BTreeMap<EntityId, Category>,
}

impl Membership {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking an entity.
    pub fn insert(&mut self, id: EntityId, category: Category) {
        self.members.insert(id, category);
    }

    /// Stops tracking an entity. Returns whether it was tracked.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.members.remove(&id).is_some()
    }

    /// Stops tracking every entity of `category`. Returns the removed ids.
    pub fn remove_category(&mut self, category: Category) -> Vec<EntityId> {
        let removed = self.ids_of(category);
        for id in &removed {
            self.members.remove(id);
        }
        removed
    }

    /// Whether an entity is tracked.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains_key(&id)
    }

    /// Tracked ids of `category`, ascending.
    #[must_use]
    pub fn ids_of(&self, category: Category) -> Vec<EntityId> {
        self.members
            .iter()
            .filter(|(_, c)| **c == category)
            .map(|(id, _)| *id)
            .collect()
    }

    /// First tracked id of `category`.
    #[must_use]
    pub fn first_of(&self, category: Category) -> Option<EntityId> {
        self.members
            .iter()
            .find(|(_, c)| **c == category)
            .map(|(id, _)| *id)
    }

    /// Every tracked id, ascending.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.keys().copied()
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// ============================================================================
// SYSTEM TRAIT
// ============================================================================

/// A per-frame pass over the entities it tracks.
pub trait System {
    /// Name for logs and lookups.
    fn name(&self) -> &'static str;

    /// Which entities this system keeps.
    fn capability(&self) -> Capability;

    /// Tracked entities.
    fn members(&self) -> &Membership;

    /// Tracked entities, mutable.
    fn members_mut(&mut self) -> &mut Membership;

    /// Runs one frame.
    ///
    /// # Errors
    ///
    /// Any error aborts the frame and propagates to the driver.
    fn update(&mut self, ctx: &mut FrameContext<'_>) -> GameResult<()>;

    /// Offers an entity; the system keeps it if its capability matches.
    fn add(&mut self, meta: &EntityMeta) -> bool {
        if self.capability().matches(meta) {
            self.members_mut().insert(meta.id, meta.category);
            true
        } else {
            false
        }
    }

    /// Called after the current room changed and its entities were purged.
    fn room_changed(&mut self) {}

    /// Stops tracking an entity.
    fn remove(&mut self, id: EntityId) -> bool {
        self.members_mut().remove(id)
    }

    /// Stops tracking every entity of `category`.
    fn remove_all(&mut self, category: Category) -> Vec<EntityId> {
        self.members_mut().remove_category(category)
    }
}

// ============================================================================
// FRAME RESOURCES
// ============================================================================

/// Where a spawned preset is placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Top-left corner at the point.
    TopLeft(f64, f64),
    /// Centered on the point.
    Center(f64, f64),
}

/// Structural change requested during a system update.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Instantiate a preset.
    Spawn {
        /// Preset name.
        preset: String,
        /// Position.
        at: Placement,
    },
    /// Instantiate a full configuration record.
    SpawnConfig(EntityConfig),
    /// Remove an entity from every system and the store.
    Despawn(EntityId),
}

/// Commands waiting for the scheduler.
#[derive(Clone, Debug, Default)]
pub struct CommandQueue {
    commands: Vec<Command>,
}

impl CommandQueue {
    /// Queues a command.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Queues a preset spawn with its top-left corner at `(x, y)`.
    pub fn spawn(&mut self, preset: impl Into<String>, x: f64, y: f64) {
        self.push(Command::Spawn {
            preset: preset.into(),
            at: Placement::TopLeft(x, y),
        });
    }

    /// Queues a preset spawn centered on `(x, y)`.
    pub fn spawn_centered(&mut self, preset: impl Into<String>, x: f64, y: f64) {
        self.push(Command::Spawn {
            preset: preset.into(),
            at: Placement::Center(x, y),
        });
    }

    /// Queues a removal.
    pub fn despawn(&mut self, id: EntityId) {
        self.push(Command::Despawn(id));
    }

    /// Whether a spawn of `preset` is already queued.
    #[must_use]
    pub fn has_spawn(&self, name: &str) -> bool {
        self.commands
            .iter()
            .any(|command| matches!(command, Command::Spawn { preset, .. } if preset == name))
    }

    /// Number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Takes every queued command, oldest first.
    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

/// Outcomes the game state machine acts on after the systems ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Signals {
    /// The player crossed this edge of the active area.
    pub bounds: Option<Side>,
    /// The player stepped on a warp to this room.
    pub warp: Option<u32>,
    /// The player's health reached zero.
    pub player_died: bool,
}

impl Signals {
    /// Forgets every signal.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether any signal is set.
    #[must_use]
    pub fn any(&self) -> bool {
        self.bounds.is_some() || self.warp.is_some() || self.player_died
    }
}

/// Everything a frame needs besides the world, owned across frames.
pub struct FrameResources {
    /// Input for this frame.
    pub input: InputFrame,
    /// Preset factories.
    pub presets: PresetRegistry,
    /// Engine tunables.
    pub config: EngineConfig,
    /// Deterministic RNG.
    pub rng: ChaCha8Rng,
    /// Pending structural changes.
    pub commands: CommandQueue,
    /// Outcomes for the state machine.
    pub signals: Signals,
    /// Output of the render pass.
    pub draw: DrawList,
    /// Side-event channel.
    pub events: EventSender,
    /// Frames simulated so far.
    pub frame: u64,
}

impl FrameResources {
    /// Creates resources with an RNG seeded from the configuration.
    #[must_use]
    pub fn new(config: EngineConfig, presets: PresetRegistry, events: EventSender) -> Self {
        Self {
            input: InputFrame::default(),
            presets,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
            commands: CommandQueue::default(),
            signals: Signals::default(),
            draw: DrawList::default(),
            events,
            frame: 0,
        }
    }

    /// Borrows everything for one system pass.
    pub fn context<'a>(&'a mut self, world: &'a mut World) -> FrameContext<'a> {
        FrameContext {
            world,
            input: &self.input,
            presets: &self.presets,
            config: &self.config,
            rng: &mut self.rng,
            commands: &mut self.commands,
            signals: &mut self.signals,
            draw: &mut self.draw,
            events: &self.events,
            frame: self.frame,
        }
    }
}

/// Handles for a single frame's work.
pub struct FrameContext<'a> {
    /// Entity and component store.
    pub world: &'a mut World,
    /// Input for this frame.
    pub input: &'a InputFrame,
    /// Preset factories.
    pub presets: &'a PresetRegistry,
    /// Engine tunables.
    pub config: &'a EngineConfig,
    /// Deterministic RNG.
    pub rng: &'a mut ChaCha8Rng,
    /// Pending structural changes.
    pub commands: &'a mut CommandQueue,
    /// Outcomes for the state machine.
    pub signals: &'a mut Signals,
    /// Output of the render pass.
    pub draw: &'a mut DrawList,
    /// Side-event channel.
    pub events: &'a EventSender,
    /// Current frame number.
    pub frame: u64,
}
