//! # Entity Categories
//!
//! Every entity carries exactly one [`Category`], fixed at creation. The
//! category decides which systems track the entity and which collision
//! reaction fires when it touches something.

use serde::{Deserialize, Serialize};

/// Immutable entity tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// The controllable hero.
    Player,
    /// Melee weapon hitbox following the player.
    Sword,
    /// Projectile fired by the player.
    Arrow,
    /// Placed explosive; expires into an explosion.
    Bomb,
    /// Hostile mover.
    Enemy,
    /// Short-lived damage area left by a bomb.
    Explosion,
    /// Health pickup.
    Heart,
    /// Currency pickup.
    Coin,
    /// Static blocker.
    Obstacle,
    /// Blocker the player can push.
    MovableObstacle,
    /// Floor switch pressed by blocks or the player.
    CollisionSwitch,
    /// Teleporter to another room.
    Warp,
    /// Decoration that never collides.
    Ignore,
    /// Generic rectangle, e.g. an invisible trigger.
    Rectangle,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 14] = [
        Self::Player,
        Self::Sword,
        Self::Arrow,
        Self::Bomb,
        Self::Enemy,
        Self::Explosion,
        Self::Heart,
        Self::Coin,
        Self::Obstacle,
        Self::MovableObstacle,
        Self::CollisionSwitch,
        Self::Warp,
        Self::Ignore,
        Self::Rectangle,
    ];

    /// Categories that survive a room change. Everything else is purged when
    /// the current room is left.
    #[inline]
    #[must_use]
    pub const fn is_persistent(self) -> bool {
        matches!(self, Self::Player | Self::Sword | Self::Arrow)
    }

    /// Whether the player collects this category on contact.
    #[inline]
    #[must_use]
    pub const fn is_pickup(self) -> bool {
        matches!(self, Self::Coin | Self::Heart)
    }

    /// Draw layer; lower layers are drawn first.
    #[must_use]
    pub const fn draw_layer(self) -> u8 {
        match self {
            Self::CollisionSwitch | Self::Warp | Self::Rectangle | Self::Ignore => 0,
            Self::Obstacle | Self::MovableObstacle => 1,
            Self::Coin | Self::Heart | Self::Bomb => 2,
            Self::Enemy => 3,
            Self::Arrow | Self::Sword => 4,
            Self::Player => 5,
            Self::Explosion => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistent_categories() {
        assert!(Category::Player.is_persistent());
        assert!(Category::Sword.is_persistent());
        assert!(!Category::Enemy.is_persistent());
        assert!(!Category::MovableObstacle.is_persistent());
    }

    #[test]
    fn test_player_drawn_above_enemies() {
        assert!(Category::Player.draw_layer() > Category::Enemy.draw_layer());
        assert!(Category::Enemy.draw_layer() > Category::Obstacle.draw_layer());
    }
}
