//! # Collision System
//!
//! Detects overlaps and hands each one to an injected [`CollisionReactor`].
//! Detection only reads the world; every state change happens in the
//! reactor, after detection has finished for the frame.
//!
//! Checks run in a fixed order, which is also the tie-break when one frame
//! produces several contacts:
//!
//! | # | Check                                        | Test                 |
//! |---|----------------------------------------------|----------------------|
//! | 1 | player vs map bounds                         | edges, T/R/B/L       |
//! | 2 | player vs enemy                              | circle or rectangle  |
//! | 3 | sword, then arrow, vs enemy                  | circle or rectangle  |
//! | 4 | explosion vs enemy                           | circle or rectangle  |
//! | 5 | player vs coin, then heart                   | rectangle            |
//! | 6 | player, then enemy, vs obstacle              | shrunk rectangle     |
//! | 7 | arrow vs obstacle                            | rectangle            |
//! | 8 | movable obstacle vs player/switch/enemy/...  | rectangle            |
//! | 9 | player vs switch                             | circle or rectangle  |
//! |10 | player vs warp                               | rectangle            |
//!
//! Within a check, candidates are visited in ascending entity id.

use keystone_core::{EntityId, Spatial, World};
use keystone_shared::{circle_overlap, rect_overlap, Category, Side};

use super::{Capability, FrameContext, Membership, System};
use crate::config::EngineConfig;
use crate::error::GameResult;

/// One detected overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    /// The player crossed an edge of the active area.
    Bounds {
        /// Player.
        player: EntityId,
        /// First crossed edge in Top, Right, Bottom, Left order.
        side: Side,
    },
    /// The player touched an enemy.
    PlayerEnemy {
        /// Player.
        player: EntityId,
        /// Enemy.
        enemy: EntityId,
    },
    /// A sword, arrow or explosion touched a vulnerable enemy.
    WeaponEnemy {
        /// Weapon.
        weapon: EntityId,
        /// Enemy.
        enemy: EntityId,
    },
    /// The player touched a coin or heart.
    Pickup {
        /// Player.
        player: EntityId,
        /// Pickup.
        item: EntityId,
    },
    /// The player or an enemy ran into an obstacle.
    Blocked {
        /// Player or enemy.
        mover: EntityId,
        /// Obstacle.
        obstacle: EntityId,
    },
    /// An arrow hit an obstacle.
    ArrowObstacle {
        /// Arrow.
        arrow: EntityId,
        /// Obstacle.
        obstacle: EntityId,
    },
    /// A movable obstacle touched a player, enemy, obstacle or arrow.
    BlockContact {
        /// Movable obstacle.
        block: EntityId,
        /// The other entity.
        other: EntityId,
    },
    /// State of one movable obstacle / switch pair. Emitted every frame,
    /// touching or not.
    BlockSwitch {
        /// Movable obstacle.
        block: EntityId,
        /// Switch.
        switch: EntityId,
        /// Whether they overlap.
        touching: bool,
    },
    /// The player stepped on a switch.
    PlayerSwitch {
        /// Player.
        player: EntityId,
        /// Switch.
        switch: EntityId,
    },
    /// The player stepped on a warp.
    PlayerWarp {
        /// Player.
        player: EntityId,
        /// Warp.
        warp: EntityId,
    },
}

/// Reacts to detected contacts. Owns every side effect of a collision.
pub trait CollisionReactor {
    /// Handles one contact.
    ///
    /// # Errors
    ///
    /// Any error aborts the frame.
    fn react(&mut self, ctx: &mut FrameContext<'_>, contact: Contact) -> GameResult<()>;

    /// Forgets per-room state. Called when the current room changes.
    fn reset(&mut self) {}
}

/// Detects overlaps between tracked entities.
pub struct CollisionSystem {
    members: Membership,
    reactor: Box<dyn CollisionReactor>,
}

impl CollisionSystem {
    /// Creates a collision system dispatching to `reactor`.
    #[must_use]
    pub fn new(reactor: Box<dyn CollisionReactor>) -> Self {
        Self {
            members: Membership::new(),
            reactor,
        }
    }

    /// Tracked, non-ignored entities of `category` with their spatial data,
    /// ascending by id.
    fn gather(&self, world: &World, category: Category) -> Vec<(EntityId, Spatial)> {
        self.members
            .ids_of(category)
            .into_iter()
            .filter(|&id| !world.is_ignored(id))
            .filter_map(|id| world.spatial.get(id).map(|spatial| (id, *spatial)))
            .collect()
    }

    /// Runs every check against the current rectangles.
    #[must_use]
    pub fn detect(&self, world: &World, config: &EngineConfig) -> Vec<Contact> {
        let players = self.gather(world, Category::Player);
        let enemies = self.gather(world, Category::Enemy);
        let vulnerable: Vec<_> = enemies
            .iter()
            .copied()
            .filter(|(id, _)| !world.is_invincible(*id))
            .collect();
        let obstacles = self.gather(world, Category::Obstacle);
        let arrows = self.gather(world, Category::Arrow);
        let blocks = self.gather(world, Category::MovableObstacle);
        let switches = self.gather(world, Category::CollisionSwitch);

        let mut contacts = Vec::new();

        for (player, spatial) in &players {
            if let Some(side) = crossed_side(spatial, config) {
                contacts.push(Contact::Bounds { player: *player, side });
            }
        }

        for (player, p) in &players {
            for (enemy, e) in &enemies {
                if touching(p, e) {
                    contacts.push(Contact::PlayerEnemy {
                        player: *player,
                        enemy: *enemy,
                    });
                }
            }
        }

        for category in [Category::Sword, Category::Arrow, Category::Explosion] {
            for (weapon, w) in &self.gather(world, category) {
                for (enemy, e) in &vulnerable {
                    if touching(w, e) {
                        contacts.push(Contact::WeaponEnemy {
                            weapon: *weapon,
                            enemy: *enemy,
                        });
                    }
                }
            }
        }

        for category in [Category::Coin, Category::Heart] {
            let items = self.gather(world, category);
            for (player, p) in &players {
                for (item, i) in &items {
                    if rect_overlap(&p.rect, &i.rect) {
                        contacts.push(Contact::Pickup {
                            player: *player,
                            item: *item,
                        });
                    }
                }
            }
        }

        for movers in [&players, &enemies] {
            for (mover, m) in movers {
                let shrunk = m.rect.shrink(m.shrink);
                for (obstacle, o) in &obstacles {
                    if rect_overlap(&shrunk, &o.rect) {
                        contacts.push(Contact::Blocked {
                            mover: *mover,
                            obstacle: *obstacle,
                        });
                    }
                }
            }
        }

        for (arrow, a) in &arrows {
            for (obstacle, o) in &obstacles {
                if rect_overlap(&a.rect, &o.rect) {
                    contacts.push(Contact::ArrowObstacle {
                        arrow: *arrow,
                        obstacle: *obstacle,
                    });
                }
            }
        }

        for (block, b) in &blocks {
            let overlapping = |others: &[(EntityId, Spatial)]| -> Vec<EntityId> {
                others
                    .iter()
                    .filter(|(_, o)| rect_overlap(&b.rect, &o.rect))
                    .map(|(id, _)| *id)
                    .collect()
            };
            for other in overlapping(players.as_slice()) {
                contacts.push(Contact::BlockContact { block: *block, other });
            }
            for (switch, s) in &switches {
                contacts.push(Contact::BlockSwitch {
                    block: *block,
                    switch: *switch,
                    touching: rect_overlap(&b.rect, &s.rect),
                });
            }
            for others in [&enemies, &obstacles, &arrows] {
                for other in overlapping(others.as_slice()) {
                    contacts.push(Contact::BlockContact { block: *block, other });
                }
            }
        }

        for (player, p) in &players {
            for (switch, s) in &switches {
                let hit = if s.radius > 0.0 {
                    circle_overlap(&p.rect, p.radius, &s.rect, s.radius)
                } else {
                    rect_overlap(&p.rect, &s.rect)
                };
                if hit {
                    contacts.push(Contact::PlayerSwitch {
                        player: *player,
                        switch: *switch,
                    });
                }
            }
        }

        let warps = self.gather(world, Category::Warp);
        for (player, p) in &players {
            for (warp, w) in &warps {
                if rect_overlap(&p.rect, &w.rect) {
                    contacts.push(Contact::PlayerWarp {
                        player: *player,
                        warp: *warp,
                    });
                }
            }
        }

        contacts
    }
}

/// Circle test when either hitbox declares a radius, rectangle test otherwise.
fn touching(a: &Spatial, b: &Spatial) -> bool {
    if a.radius > 0.0 || b.radius > 0.0 {
        circle_overlap(&a.rect, a.radius, &b.rect, b.radius)
    } else {
        rect_overlap(&a.rect, &b.rect)
    }
}

/// First edge of the active area the rectangle crosses.
fn crossed_side(spatial: &Spatial, config: &EngineConfig) -> Option<Side> {
    let rect = &spatial.rect;
    Side::ALL.into_iter().find(|side| match side {
        Side::Top => rect.min_y() < 0.0,
        Side::Right => rect.max_x() > config.active_width,
        Side::Bottom => rect.max_y() > config.active_height,
        Side::Left => rect.min_x() < 0.0,
    })
}

impl System for CollisionSystem {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn capability(&self) -> Capability {
        Capability::Collidable
    }

    fn members(&self) -> &Membership {
        &self.members
    }

    fn members_mut(&mut self) -> &mut Membership {
        &mut self.members
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> GameResult<()> {
        let contacts = self.detect(ctx.world, ctx.config);
        for contact in contacts {
            self.reactor.react(ctx, contact)?;
        }
        Ok(())
    }

    fn room_changed(&mut self) {
        self.reactor.reset();
    }
}
