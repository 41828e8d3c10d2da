//! # Component System
//!
//! Components are pure data containers with no behavior beyond small
//! accessors. Each kind has a fixed bit in the entity's component mask.
//! A component is attached when the entity is spawned and stays attached
//! until the entity is removed; only its values change in between.

use std::collections::BTreeMap;
use std::fmt;

use keystone_shared::{Direction, Rect};
use serde::{Deserialize, Serialize};

/// Marker trait for store components.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug)]
/// struct Fuel {
///     litres: u32,
/// }
///
/// impl Component for Fuel {
///     const ID: u8 = 20;
/// }
/// ```
pub trait Component: Clone + fmt::Debug + 'static {
    /// Unique identifier for this component type (0-31).
    ///
    /// This ID is used for the component bitmask in entity records.
    const ID: u8;
}

/// Where an entity is and how big its hitbox is.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spatial {
    /// Rectangle this frame.
    pub rect: Rect,
    /// Rectangle before this frame's movement, used to undo blocked moves.
    pub prev: Rect,
    /// Circle hitbox radius. Zero means rectangle collision.
    pub radius: f64,
    /// Inward shrink applied before obstacle tests.
    pub shrink: f64,
}

impl Component for Spatial {
    const ID: u8 = 0;
}

impl Spatial {
    /// Creates a spatial record whose previous rectangle equals the current.
    #[must_use]
    pub const fn new(rect: Rect) -> Self {
        Self {
            rect,
            prev: rect,
            radius: 0.0,
            shrink: 0.0,
        }
    }

    /// Records the current rectangle as the previous one.
    #[inline]
    pub fn remember(&mut self) {
        self.prev = self.rect;
    }

    /// Undoes this frame's movement.
    #[inline]
    pub fn restore(&mut self) {
        self.rect = self.prev;
    }
}

/// AI movement pattern for enemies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Never moves on its own.
    #[default]
    Stationary,
    /// Random cardinal direction for a random number of frames.
    Random,
    /// Alternates between left and right.
    #[serde(alias = "left-right")]
    LeftRight,
}

/// Direction, speed and move counters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Movement {
    /// Direction of travel this frame.
    pub direction: Direction,
    /// Last non-`None` direction; weapons and knockback read it.
    pub facing: Direction,
    /// Current speed in pixels per frame.
    pub speed: f64,
    /// Speed used by AI travel and by projectiles.
    pub max_speed: f64,
    /// Speed while being knocked back.
    pub hit_speed: f64,
    /// Frames of travel left in the current leg.
    pub remaining_moves: u32,
    /// Upper bound for a leg, and the travel distance of projectiles/pushes.
    pub max_moves: u32,
    /// Knockback in progress.
    pub moving_from_hit: bool,
    /// AI pattern.
    pub pattern: Pattern,
}

impl Component for Movement {
    const ID: u8 = 1;
}

impl Movement {
    /// Sets direction and, when it is not `None`, facing.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        if direction != Direction::None {
            self.facing = direction;
        }
    }
}

/// Hit points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Health {
    /// Current total.
    pub total: i32,
    /// Cap for healing.
    pub max: i32,
}

impl Component for Health {
    const ID: u8 = 2;
}

impl Health {
    /// Whether the total has reached zero.
    #[inline]
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.total <= 0
    }
}

/// Coin count. On the player it is the wallet, on a coin pickup its value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Coins {
    /// Number of coins.
    pub count: u32,
}

impl Component for Coins {
    const ID: u8 = 3;
}

/// Dash charge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Dash {
    /// Frames charged so far.
    pub charge: u32,
    /// Charge at which the dash bonus applies.
    pub max_charge: u32,
    /// Speed bonus while fully charged.
    pub speed_mod: f64,
}

impl Component for Dash {
    const ID: u8 = 4;
}

impl Dash {
    /// Whether the dash bonus applies this frame.
    #[inline]
    #[must_use]
    pub fn is_charged(&self) -> bool {
        self.max_charge > 0 && self.charge == self.max_charge
    }
}

/// On/off state of a door or switch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Toggler {
    /// For doors: open. For switches: pressed.
    pub enabled: bool,
}

impl Component for Toggler {
    const ID: u8 = 5;
}

/// Collision suppression, used by weapon hitboxes while sheathed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ignore {
    /// When set, collision checks and rendering skip the entity.
    pub ignored: bool,
}

impl Component for Ignore {
    const ID: u8 = 6;
}

/// What happens when a [`Temporary`] countdown reaches zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Expiry {
    /// Remove the entity.
    #[default]
    Despawn,
    /// Remove the entity and spawn a preset at its position.
    Spawn {
        /// Preset to spawn.
        preset: String,
    },
}

/// Expiration countdown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Temporary {
    /// Frames left before expiry.
    pub remaining: u32,
    /// Completion action.
    pub expiry: Expiry,
}

impl Component for Temporary {
    const ID: u8 = 7;
}

/// One named frame sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sequence {
    /// Sprite-sheet frame indices, resolved by the presentation layer.
    pub frames: Vec<u32>,
    /// Simulation frames each sprite frame stays on screen.
    pub ticks_per_frame: u32,
    /// Whether the sequence wraps; otherwise it holds the last frame.
    pub looping: bool,
}

/// Named frame sequences plus a playback cursor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Animation {
    /// Sequences by name.
    pub sequences: BTreeMap<String, Sequence>,
    /// Name of the playing sequence.
    pub current: String,
    /// Index into the playing sequence's frames.
    pub cursor: usize,
    /// Ticks spent on the current frame.
    pub tick: u32,
}

impl Component for Animation {
    const ID: u8 = 8;
}

impl Animation {
    /// Switches to `name` and rewinds, unless it is already playing or
    /// unknown.
    pub fn play(&mut self, name: &str) {
        if self.current != name && self.sequences.contains_key(name) {
            self.current = name.to_owned();
            self.cursor = 0;
            self.tick = 0;
        }
    }

    /// Advances the cursor by one simulation frame.
    pub fn advance(&mut self) {
        let Some(sequence) = self.sequences.get(&self.current) else {
            return;
        };
        if sequence.frames.is_empty() {
            return;
        }
        self.tick += 1;
        if self.tick < sequence.ticks_per_frame.max(1) {
            return;
        }
        self.tick = 0;
        let last = sequence.frames.len() - 1;
        if self.cursor < last {
            self.cursor += 1;
        } else if sequence.looping {
            self.cursor = 0;
        }
    }

    /// Sprite frame currently shown, if the playing sequence has one.
    #[must_use]
    pub fn current_frame(&self) -> Option<u32> {
        self.sequences
            .get(&self.current)
            .and_then(|sequence| sequence.frames.get(self.cursor))
            .copied()
    }
}

/// Damage immunity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Invincible {
    /// Immune right now.
    pub enabled: bool,
    /// Frames until immunity wears off. `None` with `enabled` is permanent.
    pub frames: Option<u32>,
}

impl Component for Invincible {
    const ID: u8 = 9;
}

/// Teleport destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Warp {
    /// Destination room id.
    pub target: u32,
}

impl Component for Warp {
    const ID: u8 = 10;
}

/// Preset spawned where the entity dies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Loot {
    /// Preset name.
    pub preset: String,
}

impl Component for Loot {
    const ID: u8 = 11;
}
