//! # Room Tests
//!
//! Room graph construction, slides, bounces, warps and removal fan-out.
//!
//! Run with: cargo test -p keystone --test rooms

use keystone::core::{EntityId, PresetRegistry, World};
use keystone::shared::{Category, Direction, Side};
use keystone::systems::{
    enemy_moving_from_hit, move_enemy_back, CollisionSystem, FrameResources, MovementSystem,
    RenderSystem, System, SystemsManager,
};
use keystone::{
    Action, EngineConfig, EventBus, Game, GameError, GameEvent, GameState, GameplayReactor,
    InputState, LevelConfig, RoomGraph,
};

const SLIDE_FRAMES: u32 = 10;

fn config() -> EngineConfig {
    EngineConfig {
        slide_frames: SLIDE_FRAMES,
        ..EngineConfig::default()
    }
}

fn started(source: &str) -> Game {
    let level = LevelConfig::from_toml_str(source).unwrap();
    let mut game = Game::new(config(), &level).unwrap();
    game.start().unwrap();
    game
}

fn place_player(game: &mut Game, x: f64, y: f64) {
    let player = game.player().unwrap();
    let spatial = game.world_mut().spatial.get_mut(player).unwrap();
    spatial.rect.x = x;
    spatial.rect.y = y;
    spatial.prev = spatial.rect;
}

// ============================================================================
// ROOM GRAPH
// ============================================================================

#[test]
fn test_two_by_two_layout() {
    let graph = RoomGraph::from_layout(&[vec![1, 2], vec![3, 0]]);
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.neighbor(1, Side::Right), 2);
    assert_eq!(graph.neighbor(1, Side::Bottom), 3);
    assert_eq!(graph.neighbor(2, Side::Left), 1);
    assert_eq!(graph.neighbor(3, Side::Top), 1);
    assert_eq!(graph.neighbor(2, Side::Bottom), 0);
    assert_eq!(graph.neighbor(3, Side::Right), 0);
    assert!(!graph.contains(0));
}

#[test]
fn test_every_link_points_back() {
    let layout = vec![vec![1, 2, 3], vec![4, 0, 5], vec![6, 7], vec![0, 8, 9, 10]];
    let graph = RoomGraph::from_layout(&layout);
    for room in graph.rooms() {
        for side in Side::ALL {
            let neighbor = room.neighbor(side);
            if neighbor != 0 {
                assert_eq!(graph.neighbor(neighbor, side.opposite()), room.id);
            }
        }
    }
}

// ============================================================================
// SLIDES
// ============================================================================

const STRIP: &str = r#"
    start_room = 1
    layout = [[1, 2]]

    [[rooms]]
    id = 1
    spawns = [{ preset = "rock", x = 16.0, y = 16.0 }]

    [[rooms]]
    id = 2
    spawns = [
        { preset = "rock", x = 64.0, y = 64.0 },
        { preset = "bat", x = 128.0, y = 32.0 },
    ]
"#;

#[test]
fn test_slide_timer_exits_on_the_update_after_zero() {
    let mut game = started(STRIP);
    place_player(&mut game, 245.0, 80.0);
    game.set_input(InputState::default().with(Action::Right));

    game.advance().unwrap();
    assert_eq!(game.state(), GameState::PrepareTransition);
    game.advance().unwrap();
    assert_eq!(game.state(), GameState::Transition);
    assert_eq!(game.transition().timer(), SLIDE_FRAMES);

    for step in 1..=SLIDE_FRAMES {
        game.advance().unwrap();
        assert_eq!(game.transition().timer(), SLIDE_FRAMES - step);
        assert_eq!(game.state(), GameState::Transition);
    }

    game.advance().unwrap();
    assert_eq!(game.state(), GameState::Game);
    assert!(!game.transition().is_active());
    assert_eq!(game.current_room(), 2);
}

#[test]
fn test_slide_swaps_room_contents() {
    let mut game = started(STRIP);
    let player = game.player().unwrap();
    let old_rock = game.entities_of(Category::Obstacle)[0];
    place_player(&mut game, 245.0, 80.0);
    game.set_input(InputState::default().with(Action::Right));
    game.advance().unwrap();
    game.set_input(InputState::default());

    while game.state() != GameState::Game {
        game.advance().unwrap();
    }

    assert!(!game.world().is_alive(old_rock));
    assert_eq!(game.entities_of(Category::Obstacle).len(), 1);
    assert_eq!(game.entities_of(Category::Enemy).len(), 1);
    assert!(game.world().is_alive(player));
    for name in ["movement", "collision", "render"] {
        let system = game.scheduler().system(name).unwrap();
        assert!(!system.members().contains(old_rock), "{name}");
    }

    let rect = game.world().rect(player).unwrap();
    assert!(rect.is_within(256.0, 176.0));
    assert!(rect.x < 16.0);
    assert!(game.events().drain().contains(&GameEvent::RoomEntered { room: 2 }));
}

#[test]
fn test_slide_view_moves_both_rooms_in_lock_step() {
    let mut game = started(STRIP);
    place_player(&mut game, 245.0, 80.0);
    game.set_input(InputState::default().with(Action::Right));
    game.advance().unwrap();
    game.advance().unwrap();
    for _ in 0..SLIDE_FRAMES / 2 {
        game.advance().unwrap();
    }

    let view = game.transition_view().unwrap();
    assert_eq!(view.next_room, 2);
    assert_eq!(view.outgoing, (-128.0, 0.0));
    assert_eq!(view.incoming, Some((128.0, 0.0)));
    // The slide starts from where the first frame left the player.
    let player = game.world().rect(game.player().unwrap()).unwrap();
    assert_eq!(player.x - 246.5, view.outgoing.0);
}

#[test]
fn test_draw_list_follows_player_during_slide() {
    let mut game = started(STRIP);
    let player = game.player().unwrap();
    place_player(&mut game, 245.0, 80.0);
    game.set_input(InputState::default().with(Action::Right));
    game.advance().unwrap();
    game.set_input(InputState::default());
    game.advance().unwrap();

    for _ in 0..SLIDE_FRAMES {
        game.advance().unwrap();
        let world_rect = game.world().rect(player).unwrap();
        let drawn = game
            .draw_list()
            .iter()
            .find(|command| command.entity == player)
            .map(|command| command.rect);
        assert_eq!(drawn, Some(world_rect));
    }

    // The frame that hands over the room draws the new room's contents.
    game.advance().unwrap();
    assert_eq!(game.state(), GameState::Game);
    let bat = game.entities_of(Category::Enemy)[0];
    assert!(game.draw_list().contains(bat));
}

#[test]
fn test_slide_without_neighbor_bounces() {
    let mut game = started(STRIP);
    place_player(&mut game, 80.0, 170.0);
    game.set_input(InputState::default().with(Action::Down));
    game.advance().unwrap();
    game.set_input(InputState::default());

    assert_eq!(game.state(), GameState::PrepareTransition);
    assert_eq!(game.transition().next_room(), 0);
    assert!(game.transition().is_bounce());

    game.advance().unwrap();
    let view = game.transition_view().unwrap();
    assert_eq!(view.incoming, None);

    while game.state() != GameState::Game {
        game.advance().unwrap();
    }
    assert_eq!(game.current_room(), 1);
    assert_eq!(game.entities_of(Category::Obstacle).len(), 1);
    let rect = game.world().rect(game.player().unwrap()).unwrap();
    assert_eq!(rect.y, 160.0);
}

// ============================================================================
// WARPS
// ============================================================================

#[test]
fn test_warp_lands_on_destination_start() {
    const LEVEL: &str = r#"
        start_room = 1
        layout = [[1, 2], [3, 0]]

        [[rooms]]
        id = 1
        spawns = [{ preset = "warp", x = 120.0, y = 80.0, warp_to = 3 }]

        [[rooms]]
        id = 3
        player_start = [32.0, 48.0]
    "#;
    let mut game = started(LEVEL);

    game.advance().unwrap();
    assert_eq!(game.state(), GameState::Game);
    assert_eq!(game.current_room(), 1);
    assert!(game.transition().is_active());

    game.advance().unwrap();
    assert_eq!(game.state(), GameState::Game);
    assert_eq!(game.current_room(), 3);
    assert!(!game.transition().is_active());
    assert!(game.entities_of(Category::Warp).is_empty());
    let rect = game.world().rect(game.player().unwrap()).unwrap();
    assert_eq!((rect.x, rect.y), (32.0, 48.0));
}

#[test]
fn test_warp_to_unknown_room_is_fatal() {
    const LEVEL: &str = r#"
        start_room = 1
        layout = [[1, 2]]

        [[rooms]]
        id = 1
        spawns = [{ preset = "warp", x = 120.0, y = 80.0, warp_to = 9 }]
    "#;
    let mut game = started(LEVEL);
    assert_eq!(game.advance(), Err(GameError::UnknownRoom(9)));
}

#[test]
fn test_level_with_unknown_start_room_is_rejected() {
    let level = LevelConfig::from_toml_str("start_room = 4\nlayout = [[1, 2]]").unwrap();
    assert!(matches!(
        Game::new(config(), &level),
        Err(GameError::UnknownRoom(4))
    ));
}

// ============================================================================
// REMOVAL AND KNOCKBACK
// ============================================================================

fn scheduler() -> SystemsManager {
    let mut scheduler = SystemsManager::new();
    let systems: Vec<Box<dyn System>> = vec![
        Box::new(MovementSystem::new()),
        Box::new(CollisionSystem::new(Box::new(GameplayReactor::new()))),
        Box::new(RenderSystem::new()),
    ];
    scheduler.add_systems(systems);
    scheduler
}

fn spawn(
    scheduler: &mut SystemsManager,
    world: &mut World,
    resources: &FrameResources,
    preset: &str,
) -> EntityId {
    let config = resources.presets.instantiate(preset, 64.0, 64.0).unwrap();
    scheduler
        .spawn(world, &config, resources.config.frame_rate, &resources.events)
        .unwrap()
}

#[test]
fn test_removed_enemy_is_never_visited_again() {
    let bus = EventBus::new(64);
    let mut world = World::new();
    let mut resources =
        FrameResources::new(EngineConfig::default(), PresetRegistry::builtin(), bus.sender());
    let mut scheduler = scheduler();
    let enemy = spawn(&mut scheduler, &mut world, &resources, "bat");

    scheduler.update(&mut resources.context(&mut world)).unwrap();
    assert!(resources.draw.contains(enemy));

    scheduler.remove_enemy(enemy);
    let frozen = world.rect(enemy).unwrap();
    for _ in 0..5 {
        scheduler.update(&mut resources.context(&mut world)).unwrap();
        assert!(!resources.draw.contains(enemy));
    }

    assert!(world.is_alive(enemy));
    assert_eq!(world.rect(enemy), Some(frozen));
    for system in scheduler.systems() {
        assert!(!system.members().contains(enemy), "{}", system.name());
    }
}

#[test]
fn test_remove_all_reports_each_entity_once() {
    let bus = EventBus::new(64);
    let mut world = World::new();
    let resources =
        FrameResources::new(EngineConfig::default(), PresetRegistry::builtin(), bus.sender());
    let mut scheduler = scheduler();
    let a = spawn(&mut scheduler, &mut world, &resources, "skeleton");
    let b = spawn(&mut scheduler, &mut world, &resources, "bat");
    spawn(&mut scheduler, &mut world, &resources, "rock");

    assert_eq!(scheduler.remove_all(Category::Enemy), vec![a, b]);
    assert!(scheduler.remove_all(Category::Enemy).is_empty());
}

#[test]
fn test_knockback_is_not_restarted_while_running() {
    let bus = EventBus::new(64);
    let mut world = World::new();
    let mut resources =
        FrameResources::new(EngineConfig::default(), PresetRegistry::builtin(), bus.sender());
    let mut scheduler = scheduler();
    let enemy = spawn(&mut scheduler, &mut world, &resources, "skeleton");

    assert!(move_enemy_back(&mut world, enemy, Direction::Right, 16));
    scheduler.update(&mut resources.context(&mut world)).unwrap();
    assert_eq!(world.movement.get(enemy).unwrap().remaining_moves, 15);

    assert!(enemy_moving_from_hit(&world, enemy));
    assert!(!move_enemy_back(&mut world, enemy, Direction::Left, 16));
    let movement = world.movement.get(enemy).unwrap();
    assert_eq!(movement.remaining_moves, 15);
    assert_eq!(movement.direction, Direction::Right);
}
