//! # Gameplay Reactions
//!
//! The default [`CollisionReactor`]: damage and knockback, pickups,
//! blocking, block pushing, switches and doors, and the signals the game
//! state machine acts on (bounds, warp, death).
//!
//! Every lookup is tolerant: an entity removed earlier in the frame simply
//! makes its contact a no-op.

use std::collections::BTreeMap;

use keystone_core::{EntityId, World};
use keystone_shared::{Category, Direction, Rect};

use crate::error::GameResult;
use crate::events::GameEvent;
use crate::systems::{
    enemy_moving_from_hit, move_enemy_back, move_player_back, CollisionReactor, Contact,
    FrameContext,
};

/// Default collision reactions.
#[derive(Debug, Default)]
pub struct GameplayReactor {
    /// Switch -> movable obstacle currently holding it down.
    held_by: BTreeMap<EntityId, EntityId>,
}

impl GameplayReactor {
    /// Creates a reactor with no held switches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn block_switch(
        &mut self,
        ctx: &mut FrameContext<'_>,
        block: EntityId,
        switch: EntityId,
        touching: bool,
    ) {
        if touching {
            self.held_by.insert(switch, block);
            set_switch(ctx, switch, true);
        } else if self.held_by.get(&switch) == Some(&block) {
            self.held_by.remove(&switch);
            set_switch(ctx, switch, false);
        }
    }
}

impl CollisionReactor for GameplayReactor {
    fn react(&mut self, ctx: &mut FrameContext<'_>, contact: Contact) -> GameResult<()> {
        match contact {
            Contact::Bounds { side, .. } => {
                ctx.signals.bounds.get_or_insert(side);
            }
            Contact::PlayerEnemy { player, .. } => player_hit(ctx, player),
            Contact::WeaponEnemy { weapon, enemy } => enemy_hit(ctx, weapon, enemy),
            Contact::Pickup { player, item } => collect(ctx, player, item),
            Contact::Blocked { mover, obstacle } => {
                if !is_open_door(ctx.world, obstacle)
                    && still_blocked(ctx.world, mover, obstacle)
                {
                    stop(ctx.world, mover);
                }
            }
            Contact::ArrowObstacle { arrow, .. } => halt(ctx.world, arrow),
            Contact::BlockContact { block, other } => block_contact(ctx, block, other),
            Contact::BlockSwitch {
                block,
                switch,
                touching,
            } => self.block_switch(ctx, block, switch, touching),
            Contact::PlayerSwitch { switch, .. } => set_switch(ctx, switch, true),
            Contact::PlayerWarp { warp, .. } => {
                if let Some(target) = ctx.world.warp.get(warp).map(|w| w.target) {
                    ctx.signals.warp.get_or_insert(target);
                }
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.held_by.clear();
    }
}

/// Dominant-axis direction from `from` toward `to`.
fn direction_between(from: &Rect, to: &Rect) -> Direction {
    let (fx, fy) = from.center();
    let (tx, ty) = to.center();
    let (dx, dy) = (tx - fx, ty - fy);
    if dx.abs() >= dy.abs() {
        if dx >= 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy >= 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

fn is_open_door(world: &World, id: EntityId) -> bool {
    world.category(id) == Some(Category::Obstacle)
        && world.toggler.get(id).is_some_and(|toggler| toggler.enabled)
}

/// Whether `mover` still overlaps `obstacle`. A knockback handled earlier
/// in the frame may already have carried it clear, and then wins.
fn still_blocked(world: &World, mover: EntityId, obstacle: EntityId) -> bool {
    match (world.spatial.get(mover), world.rect(obstacle)) {
        (Some(spatial), Some(rect)) => spatial.rect.shrink(spatial.shrink).overlaps(&rect),
        _ => false,
    }
}

/// Undoes this frame's move and ends the current travel leg.
fn stop(world: &mut World, id: EntityId) {
    if let Some(spatial) = world.spatial.get_mut(id) {
        spatial.restore();
    }
    if world.category(id) != Some(Category::Player) {
        halt(world, id);
    }
}

/// Ends travel without moving the entity.
fn halt(world: &mut World, id: EntityId) {
    if let Some(movement) = world.movement.get_mut(id) {
        movement.remaining_moves = 0;
        movement.moving_from_hit = false;
    }
}

fn player_hit(ctx: &mut FrameContext<'_>, player: EntityId) {
    if ctx.world.is_invincible(player) {
        return;
    }
    let Some(health) = ctx.world.health.get_mut(player) else {
        return;
    };
    if health.is_depleted() {
        return;
    }
    health.total -= ctx.config.enemy_contact_damage;
    let remaining = health.total;
    let died = health.is_depleted();

    move_player_back(ctx.world, player, ctx.config);
    if ctx.config.player_invincibility_frames > 0 {
        if let Some(invincible) = ctx.world.invincible.get_mut(player) {
            invincible.enabled = true;
            invincible.frames = Some(ctx.config.player_invincibility_frames);
        }
    }

    ctx.events.send(GameEvent::EntityDamaged {
        entity_id: player,
        health_remaining: remaining,
    });
    if died {
        ctx.signals.player_died = true;
        ctx.events.send(GameEvent::EntityDied {
            entity_id: player,
            category: Category::Player,
        });
        tracing::info!(%player, "player died");
    }
}

fn enemy_hit(ctx: &mut FrameContext<'_>, weapon: EntityId, enemy: EntityId) {
    if ctx.world.category(weapon) == Some(Category::Arrow) {
        halt(ctx.world, weapon);
    }
    if enemy_moving_from_hit(ctx.world, enemy) {
        return;
    }
    let (Some(from), Some(to)) = (ctx.world.rect(weapon), ctx.world.rect(enemy)) else {
        return;
    };
    let Some(health) = ctx.world.health.get_mut(enemy) else {
        return;
    };
    if health.is_depleted() {
        return;
    }
    health.total -= ctx.config.weapon_damage;
    let remaining = health.total;
    ctx.events.send(GameEvent::EntityDamaged {
        entity_id: enemy,
        health_remaining: remaining,
    });

    if remaining > 0 {
        move_enemy_back(
            ctx.world,
            enemy,
            direction_between(&from, &to),
            ctx.config.knockback_distance,
        );
        return;
    }

    if let Some(loot) = ctx.world.loot.get(enemy) {
        let (x, y) = to.center();
        ctx.commands.spawn_centered(loot.preset.clone(), x, y);
    }
    ctx.commands.despawn(enemy);
    ctx.events.send(GameEvent::EntityDied {
        entity_id: enemy,
        category: Category::Enemy,
    });
}

fn collect(ctx: &mut FrameContext<'_>, player: EntityId, item: EntityId) {
    let amount = match ctx.world.category(item) {
        Some(Category::Coin) => {
            let value = ctx.world.coins.get(item).map_or(1, |coins| coins.count);
            if let Some(wallet) = ctx.world.coins.get_mut(player) {
                wallet.count += value;
            }
            value
        }
        Some(Category::Heart) => {
            if let Some(health) = ctx.world.health.get_mut(player) {
                health.total = (health.total + 1).min(health.max);
            }
            1
        }
        _ => return,
    };
    ctx.commands.despawn(item);
    if let Some(category) = ctx.world.category(item) {
        ctx.events.send(GameEvent::ItemCollected { category, amount });
    }
}

fn block_contact(ctx: &mut FrameContext<'_>, block: EntityId, other: EntityId) {
    match ctx.world.category(other) {
        Some(Category::Player) => {
            let push = ctx
                .world
                .movement
                .get(other)
                .map_or(Direction::None, |movement| movement.direction);
            stop(ctx.world, other);
            if push == Direction::None {
                return;
            }
            if let Some(movement) = ctx.world.movement.get_mut(block) {
                if movement.remaining_moves == 0 {
                    movement.set_direction(push);
                    movement.remaining_moves = movement.max_moves;
                }
            }
        }
        Some(Category::Enemy) => {
            stop(ctx.world, other);
            stop(ctx.world, block);
        }
        Some(Category::Obstacle) => {
            if !is_open_door(ctx.world, other) {
                stop(ctx.world, block);
            }
        }
        Some(Category::Arrow) => halt(ctx.world, other),
        _ => {}
    }
}

fn set_switch(ctx: &mut FrameContext<'_>, switch: EntityId, pressed: bool) {
    let Some(toggler) = ctx.world.toggler.get_mut(switch) else {
        return;
    };
    if toggler.enabled == pressed {
        return;
    }
    toggler.enabled = pressed;
    ctx.events.send(GameEvent::SwitchToggled {
        entity_id: switch,
        pressed,
    });
    sync_doors(ctx);
}

/// Opens every door when every switch in the room is pressed, closes them
/// otherwise.
fn sync_doors(ctx: &mut FrameContext<'_>) {
    let switches = ctx.world.ids_of(Category::CollisionSwitch);
    if switches.is_empty() {
        return;
    }
    let open = switches
        .iter()
        .all(|&id| ctx.world.toggler.get(id).is_some_and(|toggler| toggler.enabled));

    let mut changed = false;
    for door in ctx.world.ids_of(Category::Obstacle) {
        if let Some(toggler) = ctx.world.toggler.get_mut(door) {
            if toggler.enabled != open {
                toggler.enabled = open;
                changed = true;
            }
        }
    }
    if changed {
        tracing::debug!(open, "doors changed");
        ctx.events.send(GameEvent::DoorsChanged { open });
    }
}
