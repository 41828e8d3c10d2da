//! # Game State Machine
//!
//! ```text
//!            confirm              pause
//!   Start ───────────> Game <──────────> Pause ──quit──> Start
//!     ^                 │ │ ^
//!     │          death  │ │ └──────── Transition
//!     │                 v │                 ^
//!     └── confirm ── GameOver               │
//!                         └─ bounds ─> PrepareTransition
//! ```
//!
//! Every move goes through [`StateMachine::transition_to`], which checks
//! the table in [`GameState::can_transition_to`]. Anything else is fatal.

use std::fmt;

use crate::error::{GameError, GameResult};

/// Top-level game state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Title screen, waiting for confirm.
    #[default]
    Start,
    /// Simulation running.
    Game,
    /// Simulation frozen.
    Pause,
    /// Player died, waiting for confirm.
    GameOver,
    /// A slide was armed; next room is being resolved.
    PrepareTransition,
    /// Slide animation in progress.
    Transition,
}

impl GameState {
    /// Every state.
    pub const ALL: [GameState; 6] = [
        Self::Start,
        Self::Game,
        Self::Pause,
        Self::GameOver,
        Self::PrepareTransition,
        Self::Transition,
    ];

    /// Stable lower-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Game => "game",
            Self::Pause => "pause",
            Self::GameOver => "game_over",
            Self::PrepareTransition => "prepare_transition",
            Self::Transition => "transition",
        }
    }

    /// Looks a state up by name.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownState`] for names not in [`GameState::ALL`].
    pub fn from_name(name: &str) -> GameResult<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.name() == name)
            .ok_or_else(|| GameError::UnknownState(name.to_owned()))
    }

    /// The transition table.
    #[must_use]
    pub const fn can_transition_to(self, next: GameState) -> bool {
        matches!(
            (self, next),
            (Self::Start, Self::Game)
                | (Self::Game, Self::Pause | Self::GameOver | Self::PrepareTransition)
                | (Self::PrepareTransition, Self::Transition)
                | (Self::Transition, Self::Game)
                | (Self::Pause, Self::Game | Self::Start)
                | (Self::GameOver, Self::Start)
        )
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Holds the current state and enforces the transition table.
#[derive(Clone, Debug, Default)]
pub struct StateMachine {
    current: GameState,
}

impl StateMachine {
    /// Starts in [`GameState::Start`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> GameState {
        self.current
    }

    /// Moves to `next`. Returns the state that was left.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidStateTransition`] if the table forbids it.
    pub fn transition_to(&mut self, next: GameState) -> GameResult<GameState> {
        let from = self.current;
        if !from.can_transition_to(next) {
            return Err(GameError::InvalidStateTransition { from, to: next });
        }
        self.current = next;
        tracing::info!(%from, to = %next, "state changed");
        Ok(from)
    }

    /// Moves to the state called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownState`] for an unknown name and
    /// [`GameError::InvalidStateTransition`] for a forbidden move.
    pub fn request(&mut self, name: &str) -> GameResult<GameState> {
        let next = GameState::from_name(name)?;
        self.transition_to(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use GameState::{Game, GameOver, Pause, PrepareTransition, Start, Transition};

        let allowed = [
            (Start, Game),
            (Game, Pause),
            (Game, GameOver),
            (Game, PrepareTransition),
            (PrepareTransition, Transition),
            (Transition, Game),
            (Pause, Game),
            (Pause, Start),
            (GameOver, Start),
        ];
        for from in GameState::ALL {
            for to in GameState::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_illegal_transition_is_fatal() {
        let mut machine = StateMachine::new();
        assert_eq!(
            machine.transition_to(GameState::Transition),
            Err(GameError::InvalidStateTransition {
                from: GameState::Start,
                to: GameState::Transition,
            })
        );
        assert_eq!(machine.current(), GameState::Start);
    }

    #[test]
    fn test_request_by_name() {
        let mut machine = StateMachine::new();
        assert_eq!(machine.request("game"), Ok(GameState::Start));
        assert_eq!(machine.current(), GameState::Game);
        assert_eq!(
            machine.request("credits"),
            Err(GameError::UnknownState("credits".to_owned()))
        );
    }
}
