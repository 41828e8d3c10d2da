//! # Rooms
//!
//! The static room graph and the transient slide/warp transition record.

mod graph;
mod transition;

pub use graph::{Room, RoomGraph};
pub use transition::{RoomTransition, TransitionStyle, TransitionView};
