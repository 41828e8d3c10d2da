//! # Entity Configuration Records
//!
//! The sole contract for spawning: a category, coordinates, dimensions and
//! a set of optional sub-records. Every absent sub-record means the built
//! entity lacks the matching component.
//!
//! Records deserialize from TOML so levels and custom presets can live in
//! data files:
//!
//! ```toml
//! category = "enemy"
//! w = 16.0
//! h = 16.0
//! health = { total = 2 }
//! hitbox = { radius = 7.0, shrink = 2.0 }
//! movement = { max_speed = 1.0, max_moves = 48, pattern = "random" }
//! ```

use std::collections::BTreeMap;

use keystone_shared::{Category, Direction};
use serde::{Deserialize, Serialize};

use crate::ecs::{Expiry, Pattern};
use crate::error::{CoreError, CoreResult};

/// Declarative description of one entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityConfig {
    /// Immutable category.
    pub category: Category,
    /// Left edge.
    #[serde(default)]
    pub x: f64,
    /// Top edge.
    #[serde(default)]
    pub y: f64,
    /// Width.
    #[serde(default)]
    pub w: f64,
    /// Height.
    #[serde(default)]
    pub h: f64,
    /// Circle hitbox and obstacle shrink.
    #[serde(default)]
    pub hitbox: Option<HitboxConfig>,
    /// Movement parameters.
    #[serde(default)]
    pub movement: Option<MovementConfig>,
    /// Hit points.
    #[serde(default)]
    pub health: Option<HealthConfig>,
    /// Coin count or value.
    #[serde(default)]
    pub coins: Option<u32>,
    /// Dash charge parameters.
    #[serde(default)]
    pub dash: Option<DashConfig>,
    /// Animation sequences.
    #[serde(default)]
    pub animation: Option<AnimationConfig>,
    /// Initial toggle state.
    #[serde(default)]
    pub toggler: Option<bool>,
    /// Expiration countdown.
    #[serde(default)]
    pub temporary: Option<TemporaryConfig>,
    /// Initial collision-suppression flag.
    #[serde(default)]
    pub ignore: Option<bool>,
    /// Initial invincibility flag.
    #[serde(default)]
    pub invincible: Option<bool>,
    /// Destination room for warps.
    #[serde(default)]
    pub warp_to: Option<u32>,
    /// Preset dropped on death.
    #[serde(default)]
    pub drop: Option<String>,
}

impl EntityConfig {
    /// Creates a bare record of `category` with the given rectangle.
    #[must_use]
    pub fn new(category: Category, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            category,
            x,
            y,
            w,
            h,
            hitbox: None,
            movement: None,
            health: None,
            coins: None,
            dash: None,
            animation: None,
            toggler: None,
            temporary: None,
            ignore: None,
            invincible: None,
            warp_to: None,
            drop: None,
        }
    }

    /// Returns a copy placed at `(x, y)`.
    #[must_use]
    pub fn at(&self, x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..self.clone()
        }
    }

    /// Checks the record for values no entity can be built from.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] for negative dimensions, negative
    /// speeds or radii, a warp without a destination, or an animation whose
    /// initial sequence is missing.
    pub fn validate(&self) -> CoreResult<()> {
        if self.w < 0.0 || self.h < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "{:?} has negative size {}x{}",
                self.category, self.w, self.h
            )));
        }
        if let Some(hitbox) = &self.hitbox {
            if hitbox.radius < 0.0 || hitbox.shrink < 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{:?} has a negative hitbox",
                    self.category
                )));
            }
        }
        if let Some(movement) = &self.movement {
            if movement.speed < 0.0 || movement.max_speed < 0.0 || movement.hit_speed < 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{:?} has a negative speed",
                    self.category
                )));
            }
        }
        if self.category == Category::Warp && self.warp_to.is_none() {
            return Err(CoreError::InvalidConfig("warp without warp_to".to_owned()));
        }
        if let Some(animation) = &self.animation {
            if let Some(initial) = &animation.initial {
                if !animation.sequences.contains_key(initial) {
                    return Err(CoreError::InvalidConfig(format!(
                        "initial sequence {initial:?} is not defined"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Circle hitbox radius and obstacle-test shrink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HitboxConfig {
    /// Circle radius; zero keeps rectangle collision.
    #[serde(default)]
    pub radius: f64,
    /// Inward shrink applied before obstacle tests.
    #[serde(default)]
    pub shrink: f64,
}

/// Movement parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MovementConfig {
    /// Initial speed.
    #[serde(default)]
    pub speed: f64,
    /// Travel speed.
    #[serde(default)]
    pub max_speed: f64,
    /// Knockback speed; zero falls back to the engine default.
    #[serde(default)]
    pub hit_speed: f64,
    /// Upper bound on a travel leg in frames.
    #[serde(default)]
    pub max_moves: u32,
    /// Initial direction.
    #[serde(default)]
    pub direction: Direction,
    /// AI pattern.
    #[serde(default)]
    pub pattern: Pattern,
}

/// Hit points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    /// Starting total.
    pub total: i32,
    /// Healing cap; defaults to `total`.
    #[serde(default)]
    pub max: Option<i32>,
}

/// Dash parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashConfig {
    /// Frames of charge needed.
    pub max_charge: u32,
    /// Speed bonus when charged.
    pub speed_mod: f64,
}

/// One frame sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SequenceConfig {
    /// Sprite-sheet frame indices.
    pub frames: Vec<u32>,
    /// Sprite frames per second.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Whether the sequence wraps.
    #[serde(default = "default_true")]
    pub looping: bool,
}

/// Named sequences.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationConfig {
    /// Sequences by name.
    pub sequences: BTreeMap<String, SequenceConfig>,
    /// Sequence playing at spawn; defaults to the first by name.
    #[serde(default)]
    pub initial: Option<String>,
}

/// Expiration countdown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemporaryConfig {
    /// Frames before expiry.
    pub frames: u32,
    /// Completion action.
    #[serde(default)]
    pub expiry: Expiry,
}

const fn default_fps() -> u32 {
    8
}

const fn default_true() -> bool {
    true
}
