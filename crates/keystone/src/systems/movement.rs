//! # Movement System
//!
//! Sole writer of entity rectangles during its pass. Order within a frame:
//! player, sword, arrow, movable obstacles, enemies. Every mover's previous
//! rectangle is recorded before it moves so blocked moves can be undone.

use keystone_core::{EntityId, Movement, Pattern, World};
use keystone_shared::{Category, Direction, Rect};
use rand::Rng;

use super::{Capability, FrameContext, Membership, System};
use crate::config::EngineConfig;
use crate::error::GameResult;

/// Advances rectangles from direction, speed and AI pattern.
#[derive(Debug, Default)]
pub struct MovementSystem {
    members: Membership,
}

impl MovementSystem {
    /// Creates an empty movement system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn capability(&self) -> Capability {
        Capability::Movable
    }

    fn members(&self) -> &Membership {
        &self.members
    }

    fn members_mut(&mut self) -> &mut Membership {
        &mut self.members
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> GameResult<()> {
        let players = self.members.ids_of(Category::Player);
        for &id in &players {
            move_player(ctx.world, id);
        }

        let anchor = players.first().and_then(|&id| {
            let rect = ctx.world.rect(id)?;
            let facing = ctx.world.movement.get(id).map_or(Direction::Down, |m| m.facing);
            Some((rect, facing))
        });

        for id in self.members.ids_of(Category::Sword) {
            place_sword(ctx.world, id, anchor);
        }
        for id in self.members.ids_of(Category::Arrow) {
            move_arrow(ctx.world, id, anchor.map(|(rect, _)| rect));
        }
        for id in self.members.ids_of(Category::MovableObstacle) {
            move_block(ctx.world, id);
        }
        for id in self.members.ids_of(Category::Enemy) {
            move_enemy(ctx.world, &mut *ctx.rng, ctx.config, id);
        }
        Ok(())
    }
}

fn move_player(world: &mut World, id: EntityId) {
    let Some(movement) = world.movement.get(id).copied() else {
        return;
    };
    let bonus = world
        .dash
        .get(id)
        .filter(|dash| dash.is_charged())
        .map_or(0.0, |dash| dash.speed_mod);
    let Some(spatial) = world.spatial.get_mut(id) else {
        return;
    };
    spatial.remember();
    spatial.rect = spatial.rect.step(movement.direction, movement.speed + bonus);
}

/// Centers `rect` on `anchor`.
fn centered_on(rect: Rect, anchor: Rect) -> Rect {
    rect.with_position(
        anchor.x + (anchor.w - rect.w) / 2.0,
        anchor.y + (anchor.h - rect.h) / 2.0,
    )
}

fn place_sword(world: &mut World, id: EntityId, anchor: Option<(Rect, Direction)>) {
    let sheathed = world.is_ignored(id);
    let Some(spatial) = world.spatial.get_mut(id) else {
        return;
    };
    spatial.remember();
    let Some((player, facing)) = anchor else {
        return;
    };
    let home = centered_on(spatial.rect, player);
    spatial.rect = if sheathed {
        home
    } else {
        let reach = if facing.is_horizontal() { home.w } else { home.h };
        home.step(facing, reach)
    };
}

fn move_arrow(world: &mut World, id: EntityId, anchor: Option<Rect>) {
    let Some(movement) = world.movement.get_mut(id) else {
        return;
    };
    let travel = (movement.remaining_moves > 0).then(|| {
        movement.remaining_moves -= 1;
        (movement.direction, movement.max_speed)
    });
    let Some(spatial) = world.spatial.get_mut(id) else {
        return;
    };
    spatial.remember();
    match (travel, anchor) {
        (Some((direction, speed)), _) => spatial.rect = spatial.rect.step(direction, speed),
        (None, Some(player)) => spatial.rect = centered_on(spatial.rect, player),
        (None, None) => {}
    }
}

fn move_block(world: &mut World, id: EntityId) {
    let Some(movement) = world.movement.get_mut(id) else {
        return;
    };
    let travel = (movement.remaining_moves > 0).then(|| {
        movement.remaining_moves -= 1;
        (movement.direction, movement.max_speed)
    });
    let Some(spatial) = world.spatial.get_mut(id) else {
        return;
    };
    spatial.remember();
    if let Some((direction, speed)) = travel {
        spatial.rect = spatial.rect.step(direction, speed);
    }
}

/// Length of a new AI leg. Bounded by `max_moves`; an enemy configured
/// without one falls back to its rectangle width.
fn next_leg(rng: &mut impl Rng, movement: &Movement, rect: Rect) -> u32 {
    let bound = if movement.max_moves > 0 {
        movement.max_moves
    } else {
        rect.w as u32
    };
    rng.gen_range(1..=bound.max(1))
}

fn move_enemy(world: &mut World, rng: &mut impl Rng, config: &EngineConfig, id: EntityId) {
    let Some(rect) = world.rect(id) else {
        return;
    };
    let Some(movement) = world.movement.get_mut(id) else {
        return;
    };

    let (direction, speed) = if movement.moving_from_hit {
        let speed = if movement.hit_speed > 0.0 {
            movement.hit_speed
        } else {
            config.knockback_speed
        };
        let direction = movement.direction;
        movement.remaining_moves = movement.remaining_moves.saturating_sub(1);
        if movement.remaining_moves == 0 {
            movement.moving_from_hit = false;
        }
        (direction, speed)
    } else {
        match movement.pattern {
            Pattern::Stationary => (Direction::None, 0.0),
            Pattern::Random | Pattern::LeftRight => {
                if movement.remaining_moves == 0 {
                    let next = if movement.pattern == Pattern::Random {
                        Direction::CARDINAL[rng.gen_range(0..Direction::CARDINAL.len())]
                    } else if movement.facing == Direction::Left {
                        Direction::Right
                    } else {
                        Direction::Left
                    };
                    movement.set_direction(next);
                    movement.remaining_moves = next_leg(rng, movement, rect);
                }
                movement.remaining_moves -= 1;
                (movement.direction, movement.max_speed)
            }
        }
    };

    let Some(spatial) = world.spatial.get_mut(id) else {
        return;
    };
    spatial.remember();
    let next = spatial.rect.step(direction, speed);
    if next.is_within(config.active_width, config.active_height) {
        spatial.rect = next;
    } else if let Some(movement) = world.movement.get_mut(id) {
        // Turn around at the edge of the room instead of leaving it.
        movement.remaining_moves = 0;
        movement.moving_from_hit = false;
    }
}

/// Starts knocking an enemy back toward `direction` for `distance` frames.
///
/// Does nothing while a knockback is already running, so a second hit in
/// the same window cannot extend it. Returns whether a knockback started.
pub fn move_enemy_back(world: &mut World, id: EntityId, direction: Direction, distance: u32) -> bool {
    let Some(movement) = world.movement.get_mut(id) else {
        return false;
    };
    if movement.moving_from_hit {
        return false;
    }
    movement.moving_from_hit = true;
    movement.remaining_moves = distance;
    movement.direction = direction;
    true
}

/// Whether an enemy is being knocked back.
#[must_use]
pub fn enemy_moving_from_hit(world: &World, id: EntityId) -> bool {
    world.movement.get(id).is_some_and(|movement| movement.moving_from_hit)
}

/// Puts the player back where they were before this frame's move, one
/// tile further away from where they are facing. Stays inside the active
/// area.
pub fn move_player_back(world: &mut World, id: EntityId, config: &EngineConfig) -> bool {
    let Some(facing) = world.movement.get(id).map(|movement| movement.facing) else {
        return false;
    };
    let Some(spatial) = world.spatial.get_mut(id) else {
        return false;
    };
    spatial.rect = spatial
        .prev
        .step(facing.opposite(), config.tile_size)
        .clamped_within(config.active_width, config.active_height);
    true
}
