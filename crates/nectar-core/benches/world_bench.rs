//! Criterion benchmarks for the world tick.
//!
//! Three benchmark groups:
//! - `default_colony`: the shipped 20-ant nest colony with a few honey blobs
//! - `large_colony`: 2000 edge-spawned ants foraging 40 blobs
//! - `snapshot`: building a render snapshot of the large colony

use criterion::{Criterion, criterion_group, criterion_main};
use nectar_core::config::SimConfig;
use nectar_core::test_utils::*;
use nectar_core::world::World;

const DT: f32 = 1.0 / 60.0;

// ===========================================================================
// World builders
// ===========================================================================

/// Place blobs on a grid that avoids the pot.
fn scatter_honey(world: &mut World, count: usize) {
    let (w, h) = world.size();
    let cols = 8;
    for i in 0..count {
        let x = w * ((i % cols) as f32 + 0.5) / cols as f32;
        let y = h * ((i / cols) as f32 + 0.5) / (count.div_ceil(cols)) as f32;
        // Points inside the pot are refused; the rest are enough.
        let _ = world.place_honey(x, y);
    }
}

fn build_default_colony() -> World {
    let (mut world, _clock, _audio) = test_world(SimConfig::default());
    scatter_honey(&mut world, 6);
    run_ticks(&mut world, 180, DT);
    world
}

fn build_large_colony() -> World {
    let mut config = quiet_config();
    config.world.initial_ants = 2000;
    config.world.width = 1920.0;
    config.world.height = 1080.0;
    let (mut world, _clock, _audio) = test_world(config);
    scatter_honey(&mut world, 40);
    run_ticks(&mut world, 60, DT);
    world
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_default_colony(c: &mut Criterion) {
    let mut group = c.benchmark_group("default_colony");
    group.sample_size(100);

    let mut world = build_default_colony();

    group.bench_function("20_ants_tick", |b| {
        b.iter(|| {
            world.tick(DT);
        });
    });

    group.finish();
}

fn bench_large_colony(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_colony");
    group.sample_size(20);

    let mut world = build_large_colony();

    group.bench_function("2000_ants_40_honey_tick", |b| {
        b.iter(|| {
            world.tick(DT);
        });
    });

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    group.sample_size(50);

    let world = build_large_colony();

    group.bench_function("2000_ants_snapshot", |b| {
        b.iter(|| world.snapshot());
    });
    group.bench_function("2000_ants_state_hash", |b| {
        b.iter(|| world.state_hash());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_default_colony,
    bench_large_colony,
    bench_snapshot
);
criterion_main!(benches);
