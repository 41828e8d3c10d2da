//! # Directions and Sides
//!
//! [`Direction`] is what movers travel along; [`Side`] names the four edges of
//! a room and is shared by room adjacency and map-edge collision events.

use serde::{Deserialize, Serialize};

/// Direction of travel. `None` means standing still.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Not moving.
    #[default]
    None,
    /// Toward smaller y.
    Up,
    /// Toward larger x.
    Right,
    /// Toward larger y.
    Down,
    /// Toward smaller x.
    Left,
}

impl Direction {
    /// The four cardinal directions, in clockwise order starting at `Up`.
    pub const CARDINAL: [Direction; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Unit step for this direction in screen space.
    #[inline]
    #[must_use]
    pub const fn delta(self) -> (f64, f64) {
        match self {
            Self::None => (0.0, 0.0),
            Self::Up => (0.0, -1.0),
            Self::Right => (1.0, 0.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
        }
    }

    /// The reverse direction. `None` stays `None`.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// Whether the direction moves along the x axis.
    #[inline]
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Lower-case name, used to look up per-direction animation sequences.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
        }
    }
}

impl From<Side> for Direction {
    fn from(side: Side) -> Self {
        match side {
            Side::Top => Self::Up,
            Side::Right => Self::Right,
            Side::Bottom => Self::Down,
            Side::Left => Self::Left,
        }
    }
}

/// One of the four edges of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Upper edge.
    Top,
    /// Right edge.
    Right,
    /// Lower edge.
    Bottom,
    /// Left edge.
    Left,
}

impl Side {
    /// All sides, in the order bounds checks report them.
    pub const ALL: [Side; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// The facing edge of the neighbouring room.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    /// Stable index into per-side arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Right => 1,
            Self::Bottom => 2,
            Self::Left => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites_are_involutions() {
        for side in Side::ALL {
            assert_eq!(side.opposite().opposite(), side);
        }
        for dir in Direction::CARDINAL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dx, dy) = dir.delta();
            let (ox, oy) = dir.opposite().delta();
            assert!((dx + ox).abs() < f64::EPSILON && (dy + oy).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_side_indices_unique() {
        let mut seen = [false; 4];
        for side in Side::ALL {
            assert!(!seen[side.index()]);
            seen[side.index()] = true;
        }
    }

    #[test]
    fn test_side_to_direction() {
        assert_eq!(Direction::from(Side::Top), Direction::Up);
        assert_eq!(Direction::from(Side::Left), Direction::Left);
    }
}
