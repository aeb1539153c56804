//! End-to-end scenarios through the public facade: world setup, ticks,
//! and the render diffs an external tile renderer would receive.

use cellula_engine::{
    CellWorld, MaterialRegistry, RenderDiffer, WorldConfig, WorldPos, CHUNK_SIZE,
};

const MAT_AIR: u8 = 0;
const MAT_SAND: u8 = 1;
const MAT_WATER: u8 = 2;

fn world(chunks_x: i32, chunks_y: i32, seed: u64) -> CellWorld {
    CellWorld::new(
        WorldConfig {
            chunks_x,
            chunks_y,
            seed,
            initial_material: MAT_AIR,
        },
        MaterialRegistry::builtin(),
    )
    .expect("valid world config")
}

#[test]
fn dropped_sand_settles_to_the_bottom_and_goes_quiet() {
    let mut world = world(1, 1, 42);
    let mut differ = RenderDiffer::new(world.grid());
    world.paint(MAT_SAND, WorldPos::new(10, 0), (1, 1)).unwrap();
    differ.compute_diff(world.grid());

    // One row per tick.
    world.step();
    assert_eq!(
        world.grid().try_get_cell(WorldPos::new(10, 1)).unwrap().material,
        MAT_SAND
    );
    let batch = differ.compute_diff(world.grid());
    assert_eq!(batch.len(), 2, "one vacated cell, one landed cell");

    // grid height - 1 ticks in total to reach the bottom row.
    for _ in 1..(CHUNK_SIZE - 1) {
        world.step();
    }
    assert_eq!(
        world
            .grid()
            .try_get_cell(WorldPos::new(10, CHUNK_SIZE - 1))
            .unwrap()
            .material,
        MAT_SAND
    );
    differ.compute_diff(world.grid());

    // Settled: further ticks produce no diff at all.
    for _ in 0..5 {
        world.step();
        assert!(differ.compute_diff(world.grid()).is_empty());
        assert_eq!(world.last_stats().swaps, 0);
    }
}

#[test]
fn adjacent_sand_cells_fall_independently() {
    let mut world = world(1, 1, 42);
    let mut differ = RenderDiffer::new(world.grid());
    world.paint(MAT_SAND, WorldPos::new(10, 5), (2, 1)).unwrap();
    differ.compute_diff(world.grid());

    world.step();

    // No horizontal interaction: both fell straight down.
    for x in [10, 11] {
        assert_eq!(
            world.grid().try_get_cell(WorldPos::new(x, 6)).unwrap().material,
            MAT_SAND
        );
        assert_eq!(
            world.grid().try_get_cell(WorldPos::new(x, 5)).unwrap().material,
            MAT_AIR
        );
    }
    // The diff covers exactly the two moves: each one vacated and one
    // landed cell, nothing else.
    let batch = differ.compute_diff(world.grid());
    let changed: std::collections::HashSet<_> =
        batch.iter().map(|d| (d.position, d.material)).collect();
    assert_eq!(batch.len(), 4);
    for x in [10, 11] {
        assert!(changed.contains(&(WorldPos::new(x, 5), MAT_AIR)));
        assert!(changed.contains(&(WorldPos::new(x, 6), MAT_SAND)));
    }
}

#[test]
fn water_blocked_by_sand_flows_to_the_open_side_reproducibly() {
    let run = |seed: u64| -> WorldPos {
        let mut world = world(1, 1, seed);
        let bottom = CHUNK_SIZE - 1;
        // Water with sand directly to its right, air elsewhere.
        world
            .paint(MAT_WATER, WorldPos::new(16, bottom), (1, 1))
            .unwrap();
        world
            .paint(MAT_SAND, WorldPos::new(17, bottom), (1, 1))
            .unwrap();
        world.step();

        let mut water_pos = None;
        for (pos, cell) in world.grid().iter_cells() {
            if cell.material == MAT_WATER {
                assert!(water_pos.is_none(), "exactly one water cell");
                water_pos = Some(pos);
            }
        }
        water_pos.expect("water is conserved")
    };

    for seed in [0u64, 1, 7, 1234, 99999] {
        let first = run(seed);
        // Equal mass blocks the sand side; the open side is the only
        // candidate, and the seeded draw decides the test order, so the
        // outcome is identical on every replay.
        assert_eq!(first, run(seed), "seed {seed}");
        let bottom = CHUNK_SIZE - 1;
        assert!(
            first == WorldPos::new(15, bottom) || first == WorldPos::new(16, bottom),
            "water stayed or moved left, got {first}"
        );
    }
}

#[test]
fn sand_block_forms_a_conserved_pile() {
    let mut world = world(2, 2, 7);
    world.paint(MAT_SAND, WorldPos::new(24, 0), (16, 8)).unwrap();

    let count_sand = |world: &CellWorld| {
        world
            .grid()
            .iter_cells()
            .filter(|(_, c)| c.material == MAT_SAND)
            .count()
    };
    let before = count_sand(&world);

    for _ in 0..200 {
        world.step();
    }

    assert_eq!(count_sand(&world), before);
    // Everything has come to rest.
    world.step();
    assert_eq!(world.last_stats().swaps, 0);
    // All sand sits in the lower half once settled.
    for (pos, cell) in world.grid().iter_cells() {
        if cell.material == MAT_SAND {
            assert!(pos.y >= 32, "unsettled sand at {pos}");
        }
    }
}

#[test]
fn camera_limited_diff_ignores_offscreen_simulation() {
    let mut world = world(2, 1, 7);
    // Camera on the left chunk only; sand falls in the right chunk.
    let mut differ =
        RenderDiffer::with_camera(world.grid(), WorldPos::new(0, 0), WorldPos::new(31, 31));
    differ.compute_diff(world.grid());

    world.paint(MAT_SAND, WorldPos::new(40, 0), (1, 1)).unwrap();
    world.step();
    assert!(differ.compute_diff(world.grid()).is_empty());
}
