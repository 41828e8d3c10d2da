//! # Animation System
//!
//! Picks the sequence matching an entity's state (facing, door open,
//! switch pressed) and advances its playback cursor by one frame.

use keystone_core::{EntityId, World};
use keystone_shared::{Category, Direction};

use super::{Capability, FrameContext, Membership, System};
use crate::error::GameResult;

/// Advances animation cursors.
#[derive(Debug, Default)]
pub struct AnimationSystem {
    members: Membership,
}

impl AnimationSystem {
    /// Creates an empty animation system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sequence an entity should be playing, if its state selects one.
fn wanted_sequence(world: &World, id: EntityId) -> Option<&'static str> {
    let category = world.category(id)?;
    if let Some(toggler) = world.toggler.get(id) {
        return match category {
            Category::CollisionSwitch => Some(if toggler.enabled { "down" } else { "up" }),
            Category::Obstacle => Some(if toggler.enabled { "open" } else { "closed" }),
            _ => None,
        };
    }
    world
        .movement
        .get(id)
        .map(|movement| movement.facing)
        .filter(|facing| *facing != Direction::None)
        .map(Direction::name)
}

impl System for AnimationSystem {
    fn name(&self) -> &'static str {
        "animation"
    }

    fn capability(&self) -> Capability {
        Capability::Animated
    }

    fn members(&self) -> &Membership {
        &self.members
    }

    fn members_mut(&mut self) -> &mut Membership {
        &mut self.members
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> GameResult<()> {
        for id in self.members.ids() {
            let wanted = wanted_sequence(ctx.world, id);
            let Some(animation) = ctx.world.animation.get_mut(id) else {
                continue;
            };
            if let Some(name) = wanted {
                animation.play(name);
            }
            animation.advance();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::testing::Fixture;

    #[test]
    fn test_walker_follows_facing() {
        let mut fx = Fixture::new(AnimationSystem::new());
        let player = fx.spawn("player", 0.0, 0.0);
        fx.world.movement.get_mut(player).unwrap().set_direction(Direction::Left);

        fx.step();
        let animation = fx.world.animation.get(player).unwrap();
        assert_eq!(animation.current, "left");
        assert_eq!(animation.current_frame(), Some(4));
    }

    #[test]
    fn test_cursor_advances_with_frame_rate() {
        let mut fx = Fixture::new(AnimationSystem::new());
        // coin: 4 frames at 8 fps -> 7 ticks per frame at 60 fps
        let coin = fx.spawn("coin", 0.0, 0.0);
        for _ in 0..7 {
            fx.step();
        }
        assert_eq!(fx.world.animation.get(coin).unwrap().cursor, 1);
    }

    #[test]
    fn test_door_shows_open_state() {
        let mut fx = Fixture::new(AnimationSystem::new());
        let door = fx.spawn("door", 0.0, 0.0);
        fx.step();
        assert_eq!(fx.world.animation.get(door).unwrap().current_frame(), Some(56));

        fx.world.toggler.get_mut(door).unwrap().enabled = true;
        fx.step();
        assert_eq!(fx.world.animation.get(door).unwrap().current_frame(), Some(57));
    }
}
