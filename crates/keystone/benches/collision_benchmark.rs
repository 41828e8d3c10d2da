//! # Collision Benchmark
//!
//! Measures the detection pass on a crowded room and a full simulated
//! frame through the scheduler.
//!
//! Run with: cargo bench -p keystone --bench collision_benchmark

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keystone::core::{build_entity_from_config, IdAllocator, PresetRegistry, World};
use keystone::systems::{CollisionReactor, CollisionSystem, Contact, FrameContext, System};
use keystone::{EngineConfig, Game, GameResult, LevelConfig, RoomConfig, SpawnConfig};

/// Grid of (preset, x, y) filling most of the active area.
fn crowd() -> Vec<(&'static str, f64, f64)> {
    let mut spawns = Vec::new();
    for row in 0..10 {
        for col in 0..15 {
            let preset = match (row + col) % 5 {
                0 => "rock",
                1 => "coin",
                2 => "block",
                3 => "bat",
                _ => "skeleton",
            };
            spawns.push((preset, f64::from(col) * 16.0 + 4.0, f64::from(row) * 16.0 + 4.0));
        }
    }
    spawns
}

struct Discard;

impl CollisionReactor for Discard {
    fn react(&mut self, _ctx: &mut FrameContext<'_>, _contact: Contact) -> GameResult<()> {
        Ok(())
    }
}

fn bench_detect(c: &mut Criterion) {
    let presets = PresetRegistry::builtin();
    let config = EngineConfig::default();
    let mut ids = IdAllocator::new();
    let mut world = World::new();
    let mut collision = CollisionSystem::new(Box::new(Discard));

    for (preset, x, y) in crowd().into_iter().chain([("player", 120.0, 80.0)]) {
        let Ok(entity) = presets.instantiate(preset, x, y) else {
            continue;
        };
        let id = world.spawn(build_entity_from_config(&entity, ids.next_id(), config.frame_rate));
        if let Some(meta) = world.get(id) {
            collision.add(meta);
        }
    }

    c.bench_function("collision_detect_150_entities", |b| {
        b.iter(|| black_box(collision.detect(&world, &config).len()));
    });
}

fn bench_frame(c: &mut Criterion) {
    let level = LevelConfig {
        start_room: 1,
        player_start: [120.0, 80.0],
        layout: vec![vec![1]],
        rooms: vec![RoomConfig {
            id: 1,
            tilemap: String::new(),
            player_start: None,
            spawns: crowd()
                .into_iter()
                .map(|(preset, x, y)| SpawnConfig {
                    preset: preset.to_owned(),
                    x,
                    y,
                    warp_to: None,
                })
                .collect(),
        }],
        presets: Default::default(),
    };

    let Ok(mut game) = Game::new(EngineConfig::default(), &level) else {
        return;
    };
    if game.start().is_err() {
        return;
    }

    c.bench_function("game_frame_150_entities", |b| {
        b.iter(|| {
            let _ = game.advance();
            black_box(game.frame())
        });
    });
}

criterion_group!(benches, bench_detect, bench_frame);
criterion_main!(benches);
