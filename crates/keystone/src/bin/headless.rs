//! # KEYSTONE Headless Driver
//!
//! Plays a level with scripted input and no presentation layer, printing
//! state changes and a summary. Useful for smoke-testing level data.
//!
//! ```text
//! keystone_headless [engine.toml] [level.toml] [frames]
//! ```
//!
//! Defaults to `data/engine.toml`, `data/levels/overworld.toml` and 900
//! frames. Any error halts the run with a non-zero exit code.

use std::process::ExitCode;

use keystone::shared::Category;
use keystone::{
    Action, EngineConfig, Game, GameEvent, GameResult, GameState, InputState, LevelConfig,
};

const DEFAULT_ENGINE: &str = "data/engine.toml";
const DEFAULT_LEVEL: &str = "data/levels/overworld.toml";
const DEFAULT_FRAMES: u64 = 900;

/// Buttons held on a given frame.
///
/// Confirm on the first frame, then a walk east with a sword swing every
/// half second, a detour south, and a bomb near the end.
fn scripted_input(frame: u64) -> InputState {
    let mut state = InputState::default();
    match frame {
        0 => state = state.with(Action::Confirm),
        1..=239 => {
            state = state.with(Action::Right);
            if frame % 30 == 0 {
                state = state.with(Action::Attack);
            }
        }
        240..=419 => {
            state = state.with(Action::Down).with(Action::Dash);
            if frame % 45 == 0 {
                state = state.with(Action::Fire);
            }
        }
        420 => state = state.with(Action::Bomb),
        _ => {
            state = state.with(Action::Left);
        }
    }
    state
}

#[derive(Debug, Default)]
struct Summary {
    rooms_entered: Vec<u32>,
    enemies_killed: u32,
    items_collected: u32,
    damage_taken: u32,
}

impl Summary {
    fn record(&mut self, game: &Game, event: &GameEvent) {
        match event {
            GameEvent::RoomEntered { room } => {
                println!("[ROOM] entered room {room}");
                self.rooms_entered.push(*room);
            }
            GameEvent::EntityDied { category, .. } if *category != Category::Player => {
                self.enemies_killed += 1;
            }
            GameEvent::EntityDamaged {
                entity_id,
                health_remaining,
            } if Some(*entity_id) == game.player() => {
                println!("[HIT] player health {health_remaining}");
                self.damage_taken += 1;
            }
            GameEvent::ItemCollected { category, amount } => {
                println!("[ITEM] {category:?} x{amount}");
                self.items_collected += 1;
            }
            GameEvent::StateChanged { from, to } => println!("[STATE] {from} -> {to}"),
            GameEvent::TransitionStarted { side, next_room } => {
                println!("[SLIDE] {side:?} toward room {next_room}");
            }
            _ => {}
        }
    }
}

fn run(engine_path: &str, level_path: &str, frames: u64) -> GameResult<()> {
    let config = EngineConfig::from_file(engine_path)?;
    let level = LevelConfig::from_file(level_path)?;
    let mut game = Game::new(config, &level)?;
    let mut summary = Summary::default();

    for frame in 0..frames {
        game.set_input(scripted_input(frame));
        game.advance()?;
        for event in game.events().drain() {
            summary.record(&game, &event);
        }
        if game.state() == GameState::GameOver {
            println!("[GAME] over on frame {frame}");
            break;
        }
    }

    println!();
    println!("═══════════════════════════════════════");
    println!("  frames simulated : {}", game.frame());
    println!("  final state      : {}", game.state());
    println!("  current room     : {}", game.current_room());
    println!("  rooms entered    : {:?}", summary.rooms_entered);
    println!("  enemies killed   : {}", summary.enemies_killed);
    println!("  items collected  : {}", summary.items_collected);
    println!("  hits taken       : {}", summary.damage_taken);
    println!("  player health    : {:?}", game.player_health());
    println!("  events dropped   : {}", game.events_dropped());
    println!("═══════════════════════════════════════");
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let engine = args.get(1).map_or(DEFAULT_ENGINE, String::as_str);
    let level = args.get(2).map_or(DEFAULT_LEVEL, String::as_str);
    let frames = args
        .get(3)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    println!("[KEYSTONE] engine={engine} level={level} frames={frames}");
    match run(engine, level, frames) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("[FATAL] {error}");
            ExitCode::FAILURE
        }
    }
}
