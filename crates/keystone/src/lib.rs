//! # KEYSTONE
//!
//! Frame-stepped simulation of a tile-based action game.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            Game                                  │
//! │   state machine: Start, Game, Pause, GameOver,                   │
//! │                  PrepareTransition, Transition                   │
//! │                                                                  │
//! │  ┌───────────────────────┐        ┌───────────────────────────┐  │
//! │  │   SystemsManager      │        │   Rooms                   │  │
//! │  │  input ─> movement ─> │        │  RoomGraph (layout table) │  │
//! │  │  collision ─> timers  │ bounds │  RoomTransition           │  │
//! │  │  ─> animation ─>      │───────>│  (slide / warp)           │  │
//! │  │  render               │  warp  │                           │  │
//! │  └──────────┬────────────┘        └───────────────────────────┘  │
//! │             │                                                    │
//! │  ┌──────────v────────────┐        ┌───────────────────────────┐  │
//! │  │ keystone_core::World  │        │ EventBus -> audio / HUD   │  │
//! │  └───────────────────────┘        └───────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `systems`: per-frame passes, the scheduler and the frame context
//! - `reactions`: default collision reactions
//! - `room`: room graph and transitions
//! - `game`: the top-level state machine
//! - `config`, `level`: TOML configuration
//! - `events`: side events for presentation collaborators

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod events;
pub mod game;
pub mod input;
pub mod level;
pub mod reactions;
pub mod room;
pub mod state;
pub mod systems;

pub use keystone_core as core;
pub use keystone_shared as shared;

pub use config::EngineConfig;
pub use error::{GameError, GameResult};
pub use events::{EventBus, EventReceiver, EventSender, GameEvent};
pub use game::Game;
pub use input::{Action, InputFrame, InputState};
pub use level::{Level, LevelConfig, RoomConfig, SpawnConfig};
pub use reactions::GameplayReactor;
pub use room::{Room, RoomGraph, RoomTransition, TransitionStyle, TransitionView};
pub use state::{GameState, StateMachine};
pub use systems::{
    CollisionReactor, CollisionSystem, Command, CommandQueue, Contact, DrawCommand, DrawList,
    FrameContext, FrameResources, Signals, System, SystemsManager,
};
