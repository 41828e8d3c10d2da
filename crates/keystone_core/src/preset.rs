//! # Preset Registry
//!
//! Named factories that turn coordinates into ready-to-use configuration
//! records. The registry is an ordinary value handed to whoever spawns
//! entities; levels can add presets or override the built-in ones.

use std::collections::BTreeMap;

use keystone_shared::{Category, Direction, TILE_SIZE};

use crate::config::{
    AnimationConfig, DashConfig, EntityConfig, HealthConfig, HitboxConfig, MovementConfig,
    SequenceConfig, TemporaryConfig,
};
use crate::ecs::{Expiry, Pattern};
use crate::error::{CoreError, CoreResult};

/// Named configuration templates.
#[derive(Clone, Debug, Default)]
pub struct PresetRegistry {
    presets: BTreeMap<String, EntityConfig>,
}

impl PresetRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in presets:
    /// `player`, `sword`, `arrow`, `bomb`, `explosion`, `skeleton`, `bat`,
    /// `blade`, `heart`, `coin`, `rock`, `door`, `block`, `switch`, `warp`
    /// and `rectangle`.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (name, config) in builtin_presets() {
            registry.register(name, config);
        }
        registry
    }

    /// Adds or replaces a preset.
    pub fn register(&mut self, name: impl Into<String>, template: EntityConfig) {
        let name = name.into();
        tracing::debug!(preset = %name, "preset registered");
        self.presets.insert(name, template);
    }

    /// Gets a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EntityConfig> {
        self.presets.get(name)
    }

    /// Whether a preset exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    /// Preset names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Produces a fresh configuration record for `name` placed at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownPreset`] if no preset has that name.
    pub fn instantiate(&self, name: &str, x: f64, y: f64) -> CoreResult<EntityConfig> {
        self.presets
            .get(name)
            .map(|template| template.at(x, y))
            .ok_or_else(|| CoreError::UnknownPreset(name.to_owned()))
    }
}

/// Builds a looping animation with one sequence per listed name.
fn animation(sequences: &[(&str, &[u32], u32)], initial: &str) -> AnimationConfig {
    AnimationConfig {
        sequences: sequences
            .iter()
            .map(|(name, frames, fps)| {
                (
                    (*name).to_owned(),
                    SequenceConfig {
                        frames: frames.to_vec(),
                        fps: *fps,
                        looping: true,
                    },
                )
            })
            .collect(),
        initial: Some(initial.to_owned()),
    }
}

fn walker_animation(base: u32) -> AnimationConfig {
    animation(
        &[
            ("down", &[base, base + 1], 6),
            ("up", &[base + 2, base + 3], 6),
            ("left", &[base + 4, base + 5], 6),
            ("right", &[base + 6, base + 7], 6),
        ],
        "down",
    )
}

#[allow(clippy::too_many_lines)]
fn builtin_presets() -> Vec<(&'static str, EntityConfig)> {
    let tile = TILE_SIZE;
    let mut presets = Vec::new();

    let mut player = EntityConfig::new(Category::Player, 0.0, 0.0, tile, tile);
    player.hitbox = Some(HitboxConfig {
        radius: 6.0,
        shrink: 2.0,
    });
    player.movement = Some(MovementConfig {
        max_speed: 1.5,
        direction: Direction::Down,
        ..MovementConfig::default()
    });
    player.health = Some(HealthConfig { total: 6, max: None });
    player.coins = Some(0);
    player.dash = Some(DashConfig {
        max_charge: 30,
        speed_mod: 1.0,
    });
    player.invincible = Some(false);
    player.animation = Some(walker_animation(0));
    presets.push(("player", player));

    let mut sword = EntityConfig::new(Category::Sword, 0.0, 0.0, tile, tile);
    sword.hitbox = Some(HitboxConfig {
        radius: 7.0,
        shrink: 0.0,
    });
    sword.ignore = Some(true);
    sword.animation = Some(animation(&[("swing", &[16, 17, 18], 20)], "swing"));
    presets.push(("sword", sword));

    let mut arrow = EntityConfig::new(Category::Arrow, 0.0, 0.0, tile / 2.0, tile / 2.0);
    arrow.hitbox = Some(HitboxConfig {
        radius: 4.0,
        shrink: 0.0,
    });
    arrow.movement = Some(MovementConfig {
        max_speed: 4.0,
        max_moves: 40,
        ..MovementConfig::default()
    });
    arrow.ignore = Some(true);
    arrow.animation = Some(animation(&[("fly", &[19], 1)], "fly"));
    presets.push(("arrow", arrow));

    let mut bomb = EntityConfig::new(Category::Bomb, 0.0, 0.0, tile, tile);
    bomb.temporary = Some(TemporaryConfig {
        frames: 90,
        expiry: Expiry::Spawn {
            preset: "explosion".to_owned(),
        },
    });
    bomb.animation = Some(animation(&[("fuse", &[20, 21], 4)], "fuse"));
    presets.push(("bomb", bomb));

    let mut explosion = EntityConfig::new(Category::Explosion, 0.0, 0.0, tile, tile);
    explosion.hitbox = Some(HitboxConfig {
        radius: tile,
        shrink: 0.0,
    });
    explosion.temporary = Some(TemporaryConfig {
        frames: 20,
        expiry: Expiry::Despawn,
    });
    explosion.animation = Some(animation(&[("burst", &[22, 23, 24], 12)], "burst"));
    presets.push(("explosion", explosion));

    let mut skeleton = EntityConfig::new(Category::Enemy, 0.0, 0.0, tile, tile);
    skeleton.hitbox = Some(HitboxConfig {
        radius: 7.0,
        shrink: 2.0,
    });
    skeleton.movement = Some(MovementConfig {
        max_speed: 0.75,
        hit_speed: 3.0,
        max_moves: 64,
        pattern: Pattern::Random,
        ..MovementConfig::default()
    });
    skeleton.health = Some(HealthConfig { total: 2, max: None });
    skeleton.invincible = Some(false);
    skeleton.drop = Some("coin".to_owned());
    skeleton.animation = Some(walker_animation(32));
    presets.push(("skeleton", skeleton));

    let mut bat = EntityConfig::new(Category::Enemy, 0.0, 0.0, tile, tile);
    bat.hitbox = Some(HitboxConfig {
        radius: 6.0,
        shrink: 2.0,
    });
    bat.movement = Some(MovementConfig {
        max_speed: 1.0,
        hit_speed: 3.0,
        max_moves: 48,
        direction: Direction::Left,
        pattern: Pattern::LeftRight,
        ..MovementConfig::default()
    });
    bat.health = Some(HealthConfig { total: 1, max: None });
    bat.drop = Some("heart".to_owned());
    bat.animation = Some(animation(&[("flap", &[40, 41], 8)], "flap"));
    presets.push(("bat", bat));

    let mut blade = EntityConfig::new(Category::Enemy, 0.0, 0.0, tile, tile);
    blade.hitbox = Some(HitboxConfig {
        radius: 7.0,
        shrink: 2.0,
    });
    blade.movement = Some(MovementConfig {
        max_speed: 2.0,
        max_moves: 40,
        direction: Direction::Right,
        pattern: Pattern::LeftRight,
        ..MovementConfig::default()
    });
    blade.health = Some(HealthConfig { total: 1, max: None });
    blade.invincible = Some(true);
    blade.animation = Some(animation(&[("spin", &[42, 43], 12)], "spin"));
    presets.push(("blade", blade));

    let mut heart = EntityConfig::new(Category::Heart, 0.0, 0.0, tile / 2.0, tile / 2.0);
    heart.animation = Some(animation(&[("idle", &[48], 1)], "idle"));
    presets.push(("heart", heart));

    let mut coin = EntityConfig::new(Category::Coin, 0.0, 0.0, tile / 2.0, tile / 2.0);
    coin.coins = Some(1);
    coin.animation = Some(animation(&[("spin", &[49, 50, 51, 50], 8)], "spin"));
    presets.push(("coin", coin));

    presets.push(("rock", EntityConfig::new(Category::Obstacle, 0.0, 0.0, tile, tile)));

    let mut door = EntityConfig::new(Category::Obstacle, 0.0, 0.0, tile, tile);
    door.toggler = Some(false);
    door.animation = Some(animation(&[("closed", &[56], 1), ("open", &[57], 1)], "closed"));
    presets.push(("door", door));

    let mut block = EntityConfig::new(Category::MovableObstacle, 0.0, 0.0, tile, tile);
    block.movement = Some(MovementConfig {
        max_speed: 1.0,
        max_moves: tile as u32,
        ..MovementConfig::default()
    });
    presets.push(("block", block));

    let mut switch = EntityConfig::new(Category::CollisionSwitch, 0.0, 0.0, tile, tile);
    switch.toggler = Some(false);
    switch.animation = Some(animation(&[("up", &[58], 1), ("down", &[59], 1)], "up"));
    presets.push(("switch", switch));

    presets.push(("warp", EntityConfig::new(Category::Warp, 0.0, 0.0, tile, tile)));

    presets.push((
        "rectangle",
        EntityConfig::new(Category::Rectangle, 0.0, 0.0, tile, tile),
    ));

    presets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contains_core_presets() {
        let registry = PresetRegistry::builtin();
        for name in ["player", "sword", "arrow", "bomb", "explosion", "skeleton", "block", "switch"] {
            assert!(registry.contains(name), "missing preset {name}");
        }
    }

    #[test]
    fn test_instantiate_places_record() {
        let registry = PresetRegistry::builtin();
        let config = registry.instantiate("skeleton", 48.0, 64.0).unwrap();
        assert_eq!(config.category, Category::Enemy);
        assert_eq!((config.x, config.y), (48.0, 64.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_preset() {
        let registry = PresetRegistry::builtin();
        assert_eq!(
            registry.instantiate("dragon", 0.0, 0.0),
            Err(CoreError::UnknownPreset("dragon".to_owned()))
        );
    }

    #[test]
    fn test_register_overrides_builtin() {
        let mut registry = PresetRegistry::builtin();
        let mut tough = registry.get("player").cloned().unwrap();
        tough.health = Some(HealthConfig { total: 3, max: None });
        registry.register("player", tough);

        let config = registry.instantiate("player", 0.0, 0.0).unwrap();
        assert_eq!(config.health.unwrap().total, 3);
    }

    #[test]
    fn test_builtin_presets_are_valid() {
        let registry = PresetRegistry::builtin();
        for name in registry.names() {
            if name == "warp" {
                continue;
            }
            let config = registry.instantiate(name, 0.0, 0.0).unwrap();
            assert!(config.validate().is_ok(), "preset {name} invalid");
        }
    }
}
