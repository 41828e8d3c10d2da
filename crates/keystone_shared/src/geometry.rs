//! # Geometry
//!
//! Axis-aligned rectangles in screen space (y grows downward) and the two
//! overlap primitives the collision system is built on.
//!
//! Both primitives are *strict*: rectangles that share an edge and circles
//! that touch at a single point are not colliding. All coordinates are `f64`
//! so tile-aligned positions stay exact.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// Axis-aligned rectangle given by its top-left corner and its size.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Smallest x coordinate.
    #[inline]
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.x
    }

    /// Smallest y coordinate.
    #[inline]
    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.y
    }

    /// Largest x coordinate.
    #[inline]
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.x + self.w
    }

    /// Largest y coordinate.
    #[inline]
    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.y + self.h
    }

    /// Center point.
    #[inline]
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Returns a copy moved by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Returns a copy moved `distance` pixels toward `direction`.
    #[inline]
    #[must_use]
    pub fn step(&self, direction: Direction, distance: f64) -> Self {
        let (dx, dy) = direction.delta();
        self.translate(dx * distance, dy * distance)
    }

    /// Returns a copy with the same size placed at `(x, y)`.
    #[inline]
    #[must_use]
    pub fn with_position(&self, x: f64, y: f64) -> Self {
        Self::new(x, y, self.w, self.h)
    }

    /// Returns a copy shrunk inward by `amount` on every side.
    ///
    /// The size never goes negative; an over-shrunk rectangle collapses to
    /// its center.
    #[must_use]
    pub fn shrink(&self, amount: f64) -> Self {
        if amount <= 0.0 {
            return *self;
        }
        let dx = amount.min(self.w / 2.0);
        let dy = amount.min(self.h / 2.0);
        Self::new(self.x + dx, self.y + dy, self.w - 2.0 * dx, self.h - 2.0 * dy)
    }

    /// Whether the rectangle lies entirely inside `[0, width] x [0, height]`.
    #[must_use]
    pub fn is_within(&self, width: f64, height: f64) -> bool {
        self.min_x() >= 0.0 && self.min_y() >= 0.0 && self.max_x() <= width && self.max_y() <= height
    }

    /// Returns a copy moved the least distance needed to lie inside
    /// `[0, width] x [0, height]`.
    #[must_use]
    pub fn clamped_within(&self, width: f64, height: f64) -> Self {
        let x = self.x.min(width - self.w).max(0.0);
        let y = self.y.min(height - self.h).max(0.0);
        self.with_position(x, y)
    }

    /// Strict overlap test, see [`rect_overlap`].
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        rect_overlap(self, other)
    }
}

/// Strict rectangle overlap.
///
/// Shared edges do not count: `a.max_x() == b.min_x()` is not a collision.
/// The test is symmetric in its arguments.
#[inline]
#[must_use]
pub fn rect_overlap(a: &Rect, b: &Rect) -> bool {
    a.min_x() < b.max_x() && a.max_x() > b.min_x() && a.min_y() < b.max_y() && a.max_y() > b.min_y()
}

/// Strict circle overlap between two rectangles' centers.
///
/// The circles collide when the Euclidean distance between the centers is
/// strictly less than the sum of the radii. Coincident centers always
/// collide, which makes two zero-radius hitboxes collide only when their
/// centers are exactly equal.
#[must_use]
pub fn circle_overlap(a: &Rect, radius_a: f64, b: &Rect, radius_b: f64) -> bool {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    let dx = ax - bx;
    let dy = ay - by;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance == 0.0 {
        return true;
    }
    distance < radius_a + radius_b
}
