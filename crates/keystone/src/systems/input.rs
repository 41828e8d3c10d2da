//! # Input System
//!
//! Turns the frame's button states into player intent: direction and
//! speed, sword swings, arrow shots, bombs and dash charge. Runs first, so
//! the movement pass sees this frame's intent.

use keystone_core::{EntityId, World};
use keystone_shared::{Category, Direction};

use super::{Capability, FrameContext, Membership, System};
use crate::error::GameResult;
use crate::events::GameEvent;
use crate::input::Action;

/// Applies raw input to the player and its weapons.
#[derive(Debug, Default)]
pub struct InputSystem {
    members: Membership,
    /// Frames left in the current sword swing.
    swing_left: u32,
}

impl InputSystem {
    /// Creates an empty input system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a sword swing is in progress.
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        self.swing_left > 0
    }

    fn update_sword(&mut self, ctx: &mut FrameContext<'_>, sword: EntityId) {
        if self.swing_left > 0 {
            self.swing_left -= 1;
            if self.swing_left == 0 {
                set_ignored(ctx.world, sword, true);
            }
            return;
        }
        if ctx.input.just_pressed(Action::Attack) && set_ignored(ctx.world, sword, false) {
            self.swing_left = ctx.config.sword_attack_frames.max(1);
            if let Some(animation) = ctx.world.animation.get_mut(sword) {
                animation.cursor = 0;
                animation.tick = 0;
            }
            ctx.events.send(GameEvent::SwordSwung);
        }
    }
}

/// Sets an entity's ignore flag. Returns whether it has one.
fn set_ignored(world: &mut World, id: EntityId, ignored: bool) -> bool {
    match world.ignore.get_mut(id) {
        Some(ignore) => {
            ignore.ignored = ignored;
            true
        }
        None => false,
    }
}

fn update_arrow(ctx: &mut FrameContext<'_>, arrow: EntityId, facing: Direction) {
    let Some(movement) = ctx.world.movement.get_mut(arrow) else {
        return;
    };
    if movement.remaining_moves > 0 {
        return;
    }
    if ctx.input.just_pressed(Action::Fire) {
        movement.set_direction(facing);
        movement.remaining_moves = movement.max_moves;
        set_ignored(ctx.world, arrow, false);
        ctx.events.send(GameEvent::ArrowFired);
    } else {
        set_ignored(ctx.world, arrow, true);
    }
}

impl System for InputSystem {
    fn name(&self) -> &'static str {
        "input"
    }

    fn capability(&self) -> Capability {
        Capability::Controllable
    }

    fn members(&self) -> &Membership {
        &self.members
    }

    fn members_mut(&mut self) -> &mut Membership {
        &mut self.members
    }

    /// A swing never carries over into another room or a reloaded level.
    fn room_changed(&mut self) {
        self.swing_left = 0;
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> GameResult<()> {
        let Some(player) = self.members.first_of(Category::Player) else {
            return Ok(());
        };

        if let Some(sword) = self.members.first_of(Category::Sword) {
            self.update_sword(ctx, sword);
        }

        let direction = ctx.input.current.direction();
        let attacking = self.is_attacking();
        let mut facing = Direction::Down;
        if let Some(movement) = ctx.world.movement.get_mut(player) {
            movement.set_direction(direction);
            movement.speed = if direction == Direction::None || attacking {
                0.0
            } else {
                movement.max_speed
            };
            if movement.facing != Direction::None {
                facing = movement.facing;
            }
        }

        if let Some(dash) = ctx.world.dash.get_mut(player) {
            if ctx.input.is_down(Action::Dash) && direction != Direction::None {
                dash.charge = (dash.charge + 1).min(dash.max_charge);
            } else {
                dash.charge = 0;
            }
        }

        if let Some(arrow) = self.members.first_of(Category::Arrow) {
            update_arrow(ctx, arrow, facing);
        }

        if ctx.input.just_pressed(Action::Bomb)
            && ctx.world.ids_of(Category::Bomb).is_empty()
            && !ctx.commands.has_spawn("bomb")
        {
            if let Some(rect) = ctx.world.rect(player) {
                let (x, y) = rect.center();
                ctx.commands.spawn_centered("bomb", x, y);
                ctx.events.send(GameEvent::BombPlaced);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputState;
    use crate::systems::testing::Fixture;

    fn frame(fx: &mut Fixture<InputSystem>, state: InputState) {
        fx.res.input.set(state);
        fx.step();
        fx.res.input.roll();
    }

    fn held(action: Action) -> InputState {
        InputState::default().with(action)
    }

    #[test]
    fn test_direction_sets_speed() {
        let mut fx = Fixture::new(InputSystem::new());
        let player = fx.spawn("player", 0.0, 0.0);

        frame(&mut fx, held(Action::Right));
        let movement = fx.world.movement.get(player).unwrap();
        assert_eq!(movement.direction, Direction::Right);
        assert_eq!(movement.speed, movement.max_speed);

        frame(&mut fx, InputState::default());
        let movement = fx.world.movement.get(player).unwrap();
        assert_eq!(movement.direction, Direction::None);
        assert_eq!(movement.facing, Direction::Right);
        assert_eq!(movement.speed, 0.0);
    }

    #[test]
    fn test_sword_swing_lasts_configured_frames() {
        let mut fx = Fixture::new(InputSystem::new());
        fx.spawn("player", 0.0, 0.0);
        let sword = fx.spawn("sword", 0.0, 0.0);
        let frames = fx.res.config.sword_attack_frames;

        frame(&mut fx, held(Action::Attack));
        assert!(!fx.world.is_ignored(sword));
        for _ in 1..frames {
            frame(&mut fx, held(Action::Attack));
            assert!(!fx.world.is_ignored(sword));
        }
        frame(&mut fx, held(Action::Attack));
        assert!(fx.world.is_ignored(sword));

        // Still held: no new swing without a fresh press.
        frame(&mut fx, held(Action::Attack));
        assert!(fx.world.is_ignored(sword));
        assert!(fx.events.drain().contains(&GameEvent::SwordSwung));
    }

    #[test]
    fn test_room_change_ends_swing() {
        let mut fx = Fixture::new(InputSystem::new());
        fx.spawn("player", 0.0, 0.0);
        let sword = fx.spawn("sword", 0.0, 0.0);

        frame(&mut fx, held(Action::Attack));
        assert!(fx.system.is_attacking());

        fx.system.room_changed();
        assert!(!fx.system.is_attacking());

        // A fresh press starts a full swing on the next room's sword.
        frame(&mut fx, InputState::default());
        frame(&mut fx, held(Action::Attack));
        assert!(fx.system.is_attacking());
        assert!(!fx.world.is_ignored(sword));
    }

    #[test]
    fn test_arrow_fires_in_facing_direction() {
        let mut fx = Fixture::new(InputSystem::new());
        let player = fx.spawn("player", 0.0, 0.0);
        let arrow = fx.spawn("arrow", 0.0, 0.0);
        fx.world.movement.get_mut(player).unwrap().set_direction(Direction::Left);

        frame(&mut fx, held(Action::Fire));
        let movement = fx.world.movement.get(arrow).unwrap();
        assert_eq!(movement.direction, Direction::Left);
        assert_eq!(movement.remaining_moves, movement.max_moves);
        assert!(!fx.world.is_ignored(arrow));

        fx.world.movement.get_mut(arrow).unwrap().remaining_moves = 0;
        frame(&mut fx, InputState::default());
        assert!(fx.world.is_ignored(arrow));
    }

    #[test]
    fn test_one_bomb_at_a_time() {
        let mut fx = Fixture::new(InputSystem::new());
        fx.spawn("player", 0.0, 0.0);

        frame(&mut fx, held(Action::Bomb));
        assert_eq!(fx.res.commands.len(), 1);
        frame(&mut fx, InputState::default());
        frame(&mut fx, held(Action::Bomb));
        assert_eq!(fx.res.commands.len(), 1);
    }

    #[test]
    fn test_dash_charges_while_held_and_moving() {
        let mut fx = Fixture::new(InputSystem::new());
        let player = fx.spawn("player", 0.0, 0.0);
        let moving_dash = held(Action::Dash).with(Action::Up);

        for _ in 0..100 {
            frame(&mut fx, moving_dash);
        }
        let dash = fx.world.dash.get(player).unwrap();
        assert!(dash.is_charged());

        frame(&mut fx, held(Action::Dash));
        assert_eq!(fx.world.dash.get(player).unwrap().charge, 0);
    }
}
