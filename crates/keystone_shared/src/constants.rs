//! # Engine Constants
//!
//! Defaults for the playfield geometry and frame timing. Every value here can
//! be overridden through the engine configuration; these are only the values
//! used when a configuration file leaves a field out.

// =============================================================================
// PLAYFIELD
// =============================================================================

/// Edge length of one map tile in pixels.
pub const TILE_SIZE: f64 = 16.0;

/// Width of the active play space (the area rooms scroll across).
pub const ACTIVE_WIDTH: f64 = 256.0;

/// Height of the active play space, excluding the HUD strip.
pub const ACTIVE_HEIGHT: f64 = 176.0;

// =============================================================================
// TIMING
// =============================================================================

/// Simulation frames per second.
pub const FRAME_RATE: u32 = 60;

/// Number of frames a slide transition between two rooms lasts.
pub const SLIDE_FRAMES: u32 = 60;
