//! # Entity Factory
//!
//! Pure construction of an [`EntityBundle`] from an [`EntityConfig`]. The
//! bundle owns fresh copies of everything it holds, so entities built from
//! the same preset never share mutable state.

use std::collections::BTreeMap;

use keystone_shared::{Category, Rect};

use crate::config::{AnimationConfig, EntityConfig};
use crate::ecs::{
    Animation, Coins, Dash, EntityId, Health, Ignore, Invincible, Loot, Movement, Sequence,
    Spatial, Temporary, Toggler, Warp,
};

/// A fully built entity that has not been inserted into a world yet.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityBundle {
    /// Assigned id.
    pub id: EntityId,
    /// Immutable category.
    pub category: Category,
    /// Rectangle and hitbox.
    pub spatial: Option<Spatial>,
    /// Movement state.
    pub movement: Option<Movement>,
    /// Hit points.
    pub health: Option<Health>,
    /// Coins.
    pub coins: Option<Coins>,
    /// Dash charge.
    pub dash: Option<Dash>,
    /// Toggle state.
    pub toggler: Option<Toggler>,
    /// Collision suppression.
    pub ignore: Option<Ignore>,
    /// Expiration countdown.
    pub temporary: Option<Temporary>,
    /// Animation playback.
    pub animation: Option<Animation>,
    /// Damage immunity.
    pub invincible: Option<Invincible>,
    /// Teleport destination.
    pub warp: Option<Warp>,
    /// Death drop.
    pub loot: Option<Loot>,
}

impl EntityBundle {
    /// A bundle with no components.
    #[must_use]
    pub const fn empty(id: EntityId, category: Category) -> Self {
        Self {
            id,
            category,
            spatial: None,
            movement: None,
            health: None,
            coins: None,
            dash: None,
            toggler: None,
            ignore: None,
            temporary: None,
            animation: None,
            invincible: None,
            warp: None,
            loot: None,
        }
    }
}

/// Builds an entity from its configuration record.
///
/// Every entity gets a `Spatial` component from the record's rectangle; all
/// other components exist only when the matching sub-record is present.
/// Animation frame durations are derived from `frame_rate`.
#[must_use]
pub fn build_entity_from_config(config: &EntityConfig, id: EntityId, frame_rate: u32) -> EntityBundle {
    let mut bundle = EntityBundle::empty(id, config.category);

    let mut spatial = Spatial::new(Rect::new(config.x, config.y, config.w, config.h));
    if let Some(hitbox) = config.hitbox {
        spatial.radius = hitbox.radius;
        spatial.shrink = hitbox.shrink;
    }
    bundle.spatial = Some(spatial);

    bundle.movement = config.movement.map(|m| {
        let mut movement = Movement {
            speed: m.speed,
            max_speed: m.max_speed,
            hit_speed: m.hit_speed,
            max_moves: m.max_moves,
            pattern: m.pattern,
            ..Movement::default()
        };
        movement.set_direction(m.direction);
        movement
    });

    bundle.health = config.health.map(|h| Health {
        total: h.total,
        max: h.max.unwrap_or(h.total),
    });
    bundle.coins = config.coins.map(|count| Coins { count });
    bundle.dash = config.dash.map(|d| Dash {
        charge: 0,
        max_charge: d.max_charge,
        speed_mod: d.speed_mod,
    });
    bundle.toggler = config.toggler.map(|enabled| Toggler { enabled });
    bundle.ignore = config.ignore.map(|ignored| Ignore { ignored });
    bundle.temporary = config.temporary.as_ref().map(|t| Temporary {
        remaining: t.frames,
        expiry: t.expiry.clone(),
    });
    bundle.animation = config
        .animation
        .as_ref()
        .map(|a| build_animation(a, frame_rate));
    bundle.invincible = config.invincible.map(|enabled| Invincible {
        enabled,
        frames: None,
    });
    bundle.warp = config.warp_to.map(|target| Warp { target });
    bundle.loot = config.drop.as_ref().map(|preset| Loot {
        preset: preset.clone(),
    });

    bundle
}

/// Converts sequence configs to playback state with a rewound cursor.
fn build_animation(config: &AnimationConfig, frame_rate: u32) -> Animation {
    let sequences: BTreeMap<String, Sequence> = config
        .sequences
        .iter()
        .map(|(name, seq)| {
            let ticks_per_frame = (frame_rate / seq.fps.max(1)).max(1);
            (
                name.clone(),
                Sequence {
                    frames: seq.frames.clone(),
                    ticks_per_frame,
                    looping: seq.looping,
                },
            )
        })
        .collect();

    let current = config
        .initial
        .clone()
        .or_else(|| sequences.keys().next().cloned())
        .unwrap_or_default();

    Animation {
        sequences,
        current,
        cursor: 0,
        tick: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HealthConfig, MovementConfig, SequenceConfig};
    use crate::ecs::Pattern;
    use keystone_shared::Direction;

    fn enemy_config() -> EntityConfig {
        let mut config = EntityConfig::new(Category::Enemy, 10.0, 20.0, 16.0, 16.0);
        config.health = Some(HealthConfig { total: 3, max: None });
        config.movement = Some(MovementConfig {
            speed: 0.0,
            max_speed: 1.0,
            hit_speed: 4.0,
            max_moves: 30,
            direction: Direction::Down,
            pattern: Pattern::Random,
        });
        let mut sequences = BTreeMap::new();
        sequences.insert(
            "walk".to_owned(),
            SequenceConfig {
                frames: vec![1, 2],
                fps: 6,
                looping: true,
            },
        );
        config.animation = Some(AnimationConfig {
            sequences,
            initial: None,
        });
        config
    }

    #[test]
    fn test_absent_sub_config_means_absent_component() {
        let config = EntityConfig::new(Category::Obstacle, 0.0, 0.0, 16.0, 16.0);
        let bundle = build_entity_from_config(&config, EntityId::new(1), 60);

        assert!(bundle.spatial.is_some());
        assert!(bundle.movement.is_none());
        assert!(bundle.health.is_none());
        assert!(bundle.animation.is_none());
        assert!(bundle.toggler.is_none());
    }

    #[test]
    fn test_build_enemy() {
        let bundle = build_entity_from_config(&enemy_config(), EntityId::new(4), 60);

        let movement = bundle.movement.unwrap();
        assert_eq!(movement.facing, Direction::Down);
        assert_eq!(movement.pattern, Pattern::Random);
        assert_eq!(bundle.health.unwrap().max, 3);

        let animation = bundle.animation.unwrap();
        assert_eq!(animation.current, "walk");
        assert_eq!(animation.sequences["walk"].ticks_per_frame, 10);
        assert_eq!(bundle.spatial.unwrap().rect, Rect::new(10.0, 20.0, 16.0, 16.0));
    }

    #[test]
    fn test_same_preset_never_aliases() {
        let config = enemy_config();
        let mut first = build_entity_from_config(&config, EntityId::new(1), 60);
        let second = build_entity_from_config(&config, EntityId::new(2), 60);

        if let Some(animation) = first.animation.as_mut() {
            animation.advance();
            animation.sequences.get_mut("walk").unwrap().frames.push(99);
        }
        first.health.as_mut().unwrap().total = 0;

        let untouched = second.animation.unwrap();
        assert_eq!(untouched.cursor, 0);
        assert_eq!(untouched.tick, 0);
        assert_eq!(untouched.sequences["walk"].frames, vec![1, 2]);
        assert_eq!(second.health.unwrap().total, 3);
    }
}
