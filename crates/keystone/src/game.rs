//! # Game
//!
//! The top-level state machine. One [`Game::advance`] call is one frame:
//!
//! ```text
//!            confirm                 bounds
//!   Start ───────────> Game ──────────────────> PrepareTransition
//!     ^                 │ ^ ^                           │
//!     │ quit     pause  │ │ │ timer ran out             v
//!     └──── Pause <─────┘ │ └──────────────────── Transition
//!            │  pause     │
//!            └────────────┘
//!   Game ── player died ──> GameOver ── confirm ──> Start
//! ```
//!
//! A warp never leaves `Game`: it arms a one-frame transition that is
//! finalized on the next frame.

use keystone_core::{EntityId, PresetRegistry, World};
use keystone_shared::{Category, Rect};

use crate::config::EngineConfig;
use crate::error::{GameError, GameResult};
use crate::events::{EventBus, EventReceiver, GameEvent};
use crate::input::{Action, InputState};
use crate::level::LevelConfig;
use crate::reactions::GameplayReactor;
use crate::room::{RoomGraph, RoomTransition, TransitionStyle, TransitionView};
use crate::state::{GameState, StateMachine};
use crate::systems::{
    AnimationSystem, CollisionReactor, CollisionSystem, DrawList, FrameResources, InputSystem,
    MovementSystem, RenderSystem, Signals, System, SystemsManager, TimerSystem,
};

/// A level being played.
pub struct Game {
    world: World,
    resources: FrameResources,
    scheduler: SystemsManager,
    machine: StateMachine,
    transition: RoomTransition,
    rooms: RoomGraph,
    start_room: u32,
    player_start: (f64, f64),
    current_room: u32,
    events: EventReceiver,
    player: Option<EntityId>,
    sword: Option<EntityId>,
    arrow: Option<EntityId>,
}

impl Game {
    /// Creates a game with the default gameplay reactions.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is out of range or the level does not
    /// build.
    pub fn new(config: EngineConfig, level: &LevelConfig) -> GameResult<Self> {
        Self::with_reactor(config, level, Box::new(GameplayReactor::new()))
    }

    /// Creates a game whose collision system dispatches to `reactor`.
    ///
    /// The update order is input, movement, collision, timers, animation,
    /// render.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is out of range or the level does not
    /// build.
    pub fn with_reactor(
        config: EngineConfig,
        level: &LevelConfig,
        reactor: Box<dyn CollisionReactor>,
    ) -> GameResult<Self> {
        config.validate()?;
        let mut presets = PresetRegistry::builtin();
        let level = level.build(&mut presets)?;

        let bus = EventBus::new(config.event_capacity);
        let mut scheduler = SystemsManager::new();
        let systems: Vec<Box<dyn System>> = vec![
            Box::new(InputSystem::new()),
            Box::new(MovementSystem::new()),
            Box::new(CollisionSystem::new(reactor)),
            Box::new(TimerSystem::new()),
            Box::new(AnimationSystem::new()),
            Box::new(RenderSystem::new()),
        ];
        scheduler.add_systems(systems);

        Ok(Self {
            world: World::new(),
            transition: RoomTransition::new(config.slide_frames),
            resources: FrameResources::new(config, presets, bus.sender()),
            scheduler,
            machine: StateMachine::new(),
            rooms: level.rooms,
            start_room: level.start_room,
            player_start: level.player_start,
            current_room: level.start_room,
            events: bus.receiver(),
            player: None,
            sword: None,
            arrow: None,
        })
    }

    // =========================================================================
    // Frame advance
    // =========================================================================

    /// Runs one frame of the current state.
    ///
    /// # Errors
    ///
    /// Any error is fatal: unknown rooms, illegal state changes, unknown
    /// presets and invalid records all end the run.
    pub fn advance(&mut self) -> GameResult<()> {
        match self.machine.current() {
            GameState::Start => self.update_start()?,
            GameState::Game => self.update_game()?,
            GameState::Pause => self.update_pause()?,
            GameState::GameOver => self.update_game_over()?,
            GameState::PrepareTransition => self.update_prepare_transition()?,
            GameState::Transition => self.update_transition()?,
        }
        self.resources.input.roll();
        self.resources.frame += 1;
        Ok(())
    }

    /// Sets the buttons held during the next frame.
    pub fn set_input(&mut self, state: InputState) {
        self.resources.input.set(state);
    }

    /// Loads the level and enters [`GameState::Game`], as a confirm press
    /// on the start screen does.
    ///
    /// # Errors
    ///
    /// Fails if the game is not on the start screen or the level's start
    /// room cannot be populated.
    pub fn start(&mut self) -> GameResult<()> {
        let from = self.machine.current();
        if from != GameState::Start {
            return Err(GameError::InvalidStateTransition {
                from,
                to: GameState::Game,
            });
        }
        self.load_level()?;
        self.change_state(GameState::Game)
    }

    /// Moves the state machine to the state called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownState`] for an unknown name and
    /// [`GameError::InvalidStateTransition`] for a move the table forbids.
    pub fn request_state(&mut self, name: &str) -> GameResult<()> {
        let next = GameState::from_name(name)?;
        self.change_state(next)
    }

    fn change_state(&mut self, next: GameState) -> GameResult<()> {
        let from = self.machine.transition_to(next)?;
        self.resources
            .events
            .send(GameEvent::StateChanged { from, to: next });
        Ok(())
    }

    fn update_start(&mut self) -> GameResult<()> {
        if self.resources.input.just_pressed(Action::Confirm) {
            self.start()?;
        }
        Ok(())
    }

    fn update_game(&mut self) -> GameResult<()> {
        if self.resources.input.just_pressed(Action::Pause) {
            return self.change_state(GameState::Pause);
        }

        if self.transition.is_active() && self.transition.style() == TransitionStyle::Warp {
            if self.transition.tick() == 0 {
                self.finish_transition()?;
            }
            return Ok(());
        }

        {
            let mut ctx = self.resources.context(&mut self.world);
            self.scheduler.update(&mut ctx)?;
        }

        let signals = std::mem::take(&mut self.resources.signals);
        self.handle_signals(signals)
    }

    /// Death wins over a warp, a warp over a crossed edge.
    fn handle_signals(&mut self, signals: Signals) -> GameResult<()> {
        if signals.player_died {
            return self.change_state(GameState::GameOver);
        }

        let player_rect = self.player_rect();
        if let Some(target) = signals.warp {
            if !self.rooms.contains(target) {
                return Err(GameError::UnknownRoom(target));
            }
            tracing::info!(from = self.current_room, to = target, "warp armed");
            self.transition.begin_warp(target, player_rect);
            return Ok(());
        }

        if let Some(side) = signals.bounds {
            let next_room = self.rooms.neighbor(self.current_room, side);
            self.transition.begin_slide(side, next_room, player_rect);
            self.resources
                .events
                .send(GameEvent::TransitionStarted { side, next_room });
            tracing::info!(?side, from = self.current_room, next_room, "slide started");
            return self.change_state(GameState::PrepareTransition);
        }
        Ok(())
    }

    fn update_prepare_transition(&mut self) -> GameResult<()> {
        let next = self.transition.next_room();
        if next != 0 && !self.rooms.contains(next) {
            return Err(GameError::UnknownRoom(next));
        }
        self.sheathe_weapons();
        self.redraw()?;
        self.change_state(GameState::Transition)
    }

    fn update_transition(&mut self) -> GameResult<()> {
        if self.transition.timer() == 0 {
            self.finish_transition()?;
            self.redraw()?;
            return self.change_state(GameState::Game);
        }

        self.transition.tick();
        let config = &self.resources.config;
        let rect = self
            .transition
            .player_rect(config.active_width, config.active_height);
        if let Some(spatial) = self.player.and_then(|id| self.world.spatial.get_mut(id)) {
            spatial.rect = rect;
            spatial.prev = rect;
        }
        self.redraw()
    }

    /// Rebuilds the draw list outside the full system pass.
    fn redraw(&mut self) -> GameResult<()> {
        let mut ctx = self.resources.context(&mut self.world);
        self.scheduler.update_system("render", &mut ctx)?;
        Ok(())
    }

    fn update_pause(&mut self) -> GameResult<()> {
        if self.resources.input.just_pressed(Action::Pause) {
            self.change_state(GameState::Game)
        } else if self.resources.input.just_pressed(Action::Quit) {
            self.change_state(GameState::Start)
        } else {
            Ok(())
        }
    }

    fn update_game_over(&mut self) -> GameResult<()> {
        if self.resources.input.just_pressed(Action::Confirm) {
            self.change_state(GameState::Start)
        } else {
            Ok(())
        }
    }

    // =========================================================================
    // Rooms
    // =========================================================================

    /// Forgets everything and spawns the player into the start room.
    fn load_level(&mut self) -> GameResult<()> {
        self.scheduler.clear();
        self.world = World::new();
        self.resources.commands.drain();
        self.resources.signals.clear();
        self.resources.draw.clear();
        self.transition = RoomTransition::new(self.resources.config.slide_frames);
        self.current_room = self.start_room;

        let (x, y) = self.player_start;
        self.player = Some(self.spawn_preset("player", x, y)?);
        self.sword = Some(self.spawn_preset("sword", x, y)?);
        self.arrow = Some(self.spawn_preset("arrow", x, y)?);

        self.scheduler.room_changed();
        self.populate_room()
    }

    fn spawn_preset(&mut self, name: &str, x: f64, y: f64) -> GameResult<EntityId> {
        let config = self.resources.presets.instantiate(name, x, y)?;
        self.scheduler.spawn(
            &mut self.world,
            &config,
            self.resources.config.frame_rate,
            &self.resources.events,
        )
    }

    fn populate_room(&mut self) -> GameResult<()> {
        let room = self
            .rooms
            .get(self.current_room)
            .ok_or(GameError::UnknownRoom(self.current_room))?;
        for config in &room.entities {
            self.scheduler.spawn(
                &mut self.world,
                config,
                self.resources.config.frame_rate,
                &self.resources.events,
            )?;
        }
        tracing::info!(room = room.id, entities = room.entities.len(), "room entered");
        self.resources
            .events
            .send(GameEvent::RoomEntered { room: room.id });
        Ok(())
    }

    /// Removes every entity that does not survive a room change from every
    /// system and from the store.
    fn purge_room(&mut self) -> usize {
        let transient: Vec<EntityId> = self
            .world
            .iter()
            .filter(|meta| !meta.category.is_persistent())
            .map(|meta| meta.id)
            .collect();
        for &id in &transient {
            self.scheduler.despawn(&mut self.world, id);
        }
        self.resources.commands.drain();
        tracing::debug!(purged = transient.len(), "room purged");
        transient.len()
    }

    /// Hands the player over to the destination room.
    fn finish_transition(&mut self) -> GameResult<()> {
        let style = self.transition.style();
        let next = self.transition.finish();
        if next != 0 && !self.rooms.contains(next) {
            return Err(GameError::UnknownRoom(next));
        }

        self.purge_room();
        if next != 0 {
            self.current_room = next;
        }

        let config = &self.resources.config;
        let warp_start = self
            .rooms
            .get(self.current_room)
            .map(|room| room.player_start);
        if let Some(spatial) = self.player.and_then(|id| self.world.spatial.get_mut(id)) {
            let rect = match (style, warp_start) {
                (TransitionStyle::Warp, Some((x, y))) => spatial.rect.with_position(x, y),
                _ => spatial
                    .rect
                    .clamped_within(config.active_width, config.active_height),
            };
            spatial.rect = rect;
            spatial.prev = rect;
        }

        self.sheathe_weapons();
        self.scheduler.room_changed();
        self.populate_room()
    }

    fn sheathe_weapons(&mut self) {
        for weapon in [self.sword, self.arrow].into_iter().flatten() {
            if let Some(ignore) = self.world.ignore.get_mut(weapon) {
                ignore.ignored = true;
            }
        }
        if let Some(movement) = self.arrow.and_then(|id| self.world.movement.get_mut(id)) {
            movement.remaining_moves = 0;
        }
    }

    fn player_rect(&self) -> Rect {
        self.player
            .and_then(|id| self.world.rect(id))
            .unwrap_or_default()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GameState {
        self.machine.current()
    }

    /// Id of the room being played.
    #[must_use]
    pub fn current_room(&self) -> u32 {
        self.current_room
    }

    /// Rooms of the level.
    #[must_use]
    pub fn rooms(&self) -> &RoomGraph {
        &self.rooms
    }

    /// Entity and component store.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Entity and component store, mutable. For hosts and tests that need
    /// to adjust state between frames.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The player entity, once the level is loaded.
    #[must_use]
    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    /// Health of the player, once the level is loaded.
    #[must_use]
    pub fn player_health(&self) -> Option<i32> {
        self.player
            .and_then(|id| self.world.health.get(id))
            .map(|health| health.total)
    }

    /// Entities of `category` currently in the store.
    #[must_use]
    pub fn entities_of(&self, category: Category) -> Vec<EntityId> {
        self.world.ids_of(category)
    }

    /// Transition record.
    #[must_use]
    pub fn transition(&self) -> &RoomTransition {
        &self.transition
    }

    /// Background offsets while a slide is running.
    #[must_use]
    pub fn transition_view(&self) -> Option<TransitionView> {
        let config = &self.resources.config;
        self.transition
            .view(config.active_width, config.active_height)
    }

    /// Draw list produced by the last simulated frame.
    #[must_use]
    pub fn draw_list(&self) -> &DrawList {
        &self.resources.draw
    }

    /// Side events for audio and HUD collaborators.
    #[must_use]
    pub fn events(&self) -> &EventReceiver {
        &self.events
    }

    /// Side events lost to a full channel.
    #[must_use]
    pub fn events_dropped(&self) -> u64 {
        self.resources.events.dropped_count()
    }

    /// The system scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &SystemsManager {
        &self.scheduler
    }

    /// Engine tunables.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.resources.config
    }

    /// Frames advanced so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.resources.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"
        start_room = 1
        layout = [[1, 2]]

        [[rooms]]
        id = 2
        spawns = [{ preset = "rock", x = 64.0, y = 64.0 }]
    "#;

    fn game() -> Game {
        let level = LevelConfig::from_toml_str(LEVEL).unwrap();
        Game::new(EngineConfig::default(), &level).unwrap()
    }

    fn press(game: &mut Game, action: Action) {
        game.set_input(InputState::default().with(action));
        game.advance().unwrap();
        game.set_input(InputState::default());
        game.advance().unwrap();
    }

    #[test]
    fn test_confirm_starts_the_level() {
        let mut game = game();
        game.advance().unwrap();
        assert_eq!(game.state(), GameState::Start);
        assert!(game.player().is_none());

        press(&mut game, Action::Confirm);
        assert_eq!(game.state(), GameState::Game);
        assert_eq!(game.current_room(), 1);
        assert_eq!(game.player_health(), Some(6));
        assert_eq!(game.entities_of(Category::Sword).len(), 1);
    }

    #[test]
    fn test_pause_and_quit() {
        let mut game = game();
        game.start().unwrap();

        press(&mut game, Action::Pause);
        assert_eq!(game.state(), GameState::Pause);
        press(&mut game, Action::Pause);
        assert_eq!(game.state(), GameState::Game);

        press(&mut game, Action::Pause);
        press(&mut game, Action::Quit);
        assert_eq!(game.state(), GameState::Start);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut game = game();
        game.start().unwrap();
        assert!(matches!(
            game.start(),
            Err(GameError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_state_changes_are_published() {
        let mut game = game();
        game.start().unwrap();
        let events = game.events().drain();
        assert!(events.contains(&GameEvent::StateChanged {
            from: GameState::Start,
            to: GameState::Game,
        }));
        assert!(events.contains(&GameEvent::RoomEntered { room: 1 }));
    }

    #[test]
    fn test_slide_right_enters_neighbor() {
        let mut game = game();
        game.start().unwrap();
        let player = game.player().unwrap();
        game.world_mut().spatial.get_mut(player).unwrap().rect.x = 245.0;
        game.set_input(InputState::default().with(Action::Right));

        game.advance().unwrap();
        assert_eq!(game.state(), GameState::PrepareTransition);
        assert_eq!(game.transition().next_room(), 2);
        game.advance().unwrap();
        assert_eq!(game.state(), GameState::Transition);

        let total = game.transition().total();
        for _ in 0..total {
            game.advance().unwrap();
            assert_eq!(game.state(), GameState::Transition);
        }
        assert_eq!(game.transition().timer(), 0);
        game.advance().unwrap();
        assert_eq!(game.state(), GameState::Game);
        assert_eq!(game.current_room(), 2);
        assert_eq!(game.entities_of(Category::Obstacle).len(), 1);

        let rect = game.world().rect(player).unwrap();
        assert!(rect.is_within(256.0, 176.0));
        assert!(rect.x < 16.0);
    }
}
