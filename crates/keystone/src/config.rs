//! # Engine Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! document is a valid configuration:
//!
//! ```toml
//! frame_rate = 60
//! slide_frames = 60
//! knockback_distance = 16
//! rng_seed = 42
//! ```

use std::path::Path;

use keystone_shared::{ACTIVE_HEIGHT, ACTIVE_WIDTH, FRAME_RATE, SLIDE_FRAMES, TILE_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// Tunables for the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Simulation frames per second; animation timing derives from it.
    pub frame_rate: u32,
    /// Tile edge in pixels.
    pub tile_size: f64,
    /// Width of the playable area.
    pub active_width: f64,
    /// Height of the playable area.
    pub active_height: f64,
    /// Length of a room slide in frames.
    pub slide_frames: u32,
    /// Frames an enemy is pushed back after a hit.
    pub knockback_distance: u32,
    /// Knockback speed for enemies without their own hit speed.
    pub knockback_speed: f64,
    /// Frames the sword stays out.
    pub sword_attack_frames: u32,
    /// Post-hit invincibility of the player. Zero disables it.
    pub player_invincibility_frames: u32,
    /// Damage an enemy deals on contact.
    pub enemy_contact_damage: i32,
    /// Damage a weapon deals to an enemy.
    pub weapon_damage: i32,
    /// Seed of the simulation RNG.
    pub rng_seed: u64,
    /// Capacity of the side-event channel.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate: FRAME_RATE,
            tile_size: TILE_SIZE,
            active_width: ACTIVE_WIDTH,
            active_height: ACTIVE_HEIGHT,
            slide_frames: SLIDE_FRAMES,
            knockback_distance: 16,
            knockback_speed: 2.0,
            sword_attack_frames: 12,
            player_invincibility_frames: 60,
            enemy_contact_damage: 1,
            weapon_damage: 1,
            rng_seed: 0x5EED,
            event_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] on syntax errors, unknown keys or
    /// out-of-range values.
    pub fn from_toml_str(source: &str) -> GameResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| GameError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if the file cannot be read or
    /// does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| GameError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Rejects values the simulation cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> GameResult<()> {
        let bad = |field: &str| Err(GameError::InvalidConfig(format!("{field} must be positive")));
        if self.frame_rate == 0 {
            return bad("frame_rate");
        }
        if self.slide_frames == 0 {
            return bad("slide_frames");
        }
        if self.tile_size <= 0.0 {
            return bad("tile_size");
        }
        if self.active_width <= 0.0 || self.active_height <= 0.0 {
            return bad("active area");
        }
        if self.event_capacity == 0 {
            return bad("event_capacity");
        }
        Ok(())
    }
}
