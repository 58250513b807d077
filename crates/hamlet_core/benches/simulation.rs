//! Simulation benchmarks for hamlet_core.
//!
//! Run with: `cargo bench -p hamlet_core`

#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use hamlet_core::map::{MapFile, MapInfo, StartingPosition};
use hamlet_core::player::{AiInfo, AiLevel, BuildingKind};
use hamlet_core::prelude::*;

fn bench_world(players: usize) -> GameWorld {
    let mut buildings = std::collections::BTreeMap::new();
    buildings.insert(BuildingKind::Farm, 2);
    buildings.insert(BuildingKind::Mint, 1);
    let map = MapFile {
        name: "bench".into(),
        width: 128,
        height: 128,
        starting_positions: vec![
            StartingPosition {
                country: 60,
                military: 30,
                gold: 200,
                buildings,
            };
            players
        ],
    };
    let info = MapInfo::new(map.name.clone(), Vec::new());
    let ais = vec![AiInfo::default_ai(AiLevel::Medium); players];
    GameWorld::new(&map, info, &ais, GlobalGameSettings::default(), 7)
}

/// Measures the cost of ticking a four-player world for 100 frames.
pub fn simulation_benchmark(c: &mut Criterion) {
    c.bench_function("run_gf_100_frames_4_players", |b| {
        b.iter(|| {
            let mut world = bench_world(4);
            for _ in 0..100 {
                world.run_gf();
            }
            black_box(world.state_hash())
        })
    });

    c.bench_function("state_hash_4_players", |b| {
        let world = bench_world(4);
        b.iter(|| black_box(world.state_hash()))
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
