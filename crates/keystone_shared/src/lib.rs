//! # KEYSTONE Shared
//!
//! Value types shared by the entity store and the game crate:
//!
//! - [`Rect`] and the strict overlap primitives used by collision detection
//! - [`Direction`] and [`Side`], the movement and adjacency vocabulary
//! - [`Category`], the immutable tag attached to every entity
//!
//! Nothing in this crate holds simulation state.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod category;
pub mod constants;
pub mod direction;
pub mod geometry;

pub use category::Category;
pub use constants::{ACTIVE_HEIGHT, ACTIVE_WIDTH, FRAME_RATE, SLIDE_FRAMES, TILE_SIZE};
pub use direction::{Direction, Side};
pub use geometry::{circle_overlap, rect_overlap, Rect};
