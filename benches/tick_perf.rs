//! Benchmark: tick cost under different grid conditions.
//!
//! Uses `iter_batched` for the active-motion cases so every iteration
//! measures a moving world rather than a settled one.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use cellula_engine::{CellWorld, MaterialRegistry, WorldConfig, WorldPos};

const MAT_SAND: u8 = 1;
const MAT_WATER: u8 = 2;

fn world_256() -> CellWorld {
    CellWorld::new(
        WorldConfig {
            chunks_x: 8,
            chunks_y: 8,
            seed: 7,
            initial_material: 0,
        },
        MaterialRegistry::builtin(),
    )
    .expect("valid bench world")
}

/// Baseline: scanning 64K air cells with nothing to do.
fn bench_tick_empty(c: &mut Criterion) {
    c.bench_function("tick_empty_256x256", |b| {
        let mut world = world_256();
        b.iter(|| {
            world.step();
            black_box(&world);
        });
    });
}

/// Sand band in free fall across chunk boundaries.
fn bench_tick_sand_falling(c: &mut Criterion) {
    c.bench_function("tick_sand_falling_256x256", |b| {
        b.iter_batched(
            || {
                let mut world = world_256();
                world
                    .paint(MAT_SAND, WorldPos::new(0, 0), (256, 50))
                    .expect("paint sand band");
                world
            },
            |mut world| {
                world.step();
                black_box(&world);
            },
            BatchSize::SmallInput,
        );
    });
}

/// Water body spreading laterally; the expensive rule path.
fn bench_tick_water_body(c: &mut Criterion) {
    c.bench_function("tick_water_body_256x256", |b| {
        b.iter_batched(
            || {
                let mut world = world_256();
                world
                    .paint(MAT_WATER, WorldPos::new(64, 100), (128, 40))
                    .expect("paint water body");
                world
            },
            |mut world| {
                world.step();
                black_box(&world);
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_tick_empty,
    bench_tick_sand_falling,
    bench_tick_water_body
);
criterion_main!(benches);
