//! # Game Errors
//!
//! Fatal, propagated errors. Tolerant lookups (an entity purged earlier in
//! the frame, a missing component) never produce one of these; they return
//! `None` and the caller moves on.

use keystone_core::CoreError;
use thiserror::Error;

use crate::state::GameState;

/// Errors that halt the game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A state was requested by a name the state machine does not know.
    #[error("unknown game state: {0:?}")]
    UnknownState(String),

    /// The transition table does not allow this move.
    #[error("illegal state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// State being left.
        from: GameState,
        /// Requested state.
        to: GameState,
    },

    /// A room id is absent from the level's room map.
    #[error("unknown room: {0}")]
    UnknownRoom(u32),

    /// Entity store failure (unknown preset, bad entity record).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Engine or level configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
