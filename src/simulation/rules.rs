//! Per-cell movement decisions.
//!
//! Pure functions over a neighbor probe: the probe returns `None` for
//! anything that cannot take part in a swap this tick (outside the
//! grid, or already swapped), and the rules treat absent as blocked. A
//! missing neighbor never initiates a swap.

use crate::domain::cell::Cell;
use crate::spatial::coords::{ChunkPos, WorldPos};

/// Strict displacement test. Equal-mass cells never swap, so columns of
/// the same material cannot oscillate.
#[inline]
pub(crate) fn displaces(cell: Cell, other: Cell) -> bool {
    cell.mass > other.mass
}

/// Straight-down gravity move, resolved in the first pass of a row.
#[inline]
pub(crate) fn fall_target(
    cell: Cell,
    pos: WorldPos,
    probe: impl Fn(WorldPos) -> Option<Cell>,
) -> Option<WorldPos> {
    if !cell.behavior.obeys_gravity() {
        return None;
    }
    let below = pos.offset(0, 1);
    match probe(below) {
        Some(other) if displaces(cell, other) => Some(below),
        _ => None,
    }
}

/// Diagonal and lateral settling, resolved in the second pass for cells
/// that did not fall.
///
/// `side` is the tick's single random draw for this cell (-1 or 1); it
/// orders every candidate pair, keeping the left/right choice
/// consistent across all four directional tests. Granular cells test
/// the two diagonal-below cells; liquids additionally test the two
/// same-row laterals in the same tick.
pub(crate) fn settle_target(
    cell: Cell,
    pos: WorldPos,
    side: i32,
    probe: impl Fn(WorldPos) -> Option<Cell>,
) -> Option<WorldPos> {
    if !cell.behavior.obeys_gravity() {
        return None;
    }

    for target in [pos.offset(side, 1), pos.offset(-side, 1)] {
        if let Some(other) = probe(target) {
            if displaces(cell, other) {
                return Some(target);
            }
        }
    }

    if cell.behavior.flows_laterally() {
        for target in [pos.offset(side, 0), pos.offset(-side, 0)] {
            if let Some(other) = probe(target) {
                if displaces(cell, other) {
                    return Some(target);
                }
            }
        }
    }

    None
}

/// Deterministic per-chunk generator: xorshift32 over a seed mixed from
/// the chunk coordinate, the tick counter, and the world seed. One
/// instance per unit of parallel work; no generator state is ever
/// shared across workers, and replays with the same seed reproduce the
/// same draws.
pub(crate) struct ChunkRng {
    state: u32,
}

impl ChunkRng {
    pub(crate) fn new(chunk: ChunkPos, tick: u64, world_seed: u64) -> Self {
        let lane = ((chunk.x as u32 as u64) << 32) | (chunk.y as u32 as u64);
        let mixed = splitmix64(world_seed ^ lane ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Self {
            // xorshift never leaves a zero state; keep one bit lit.
            state: (mixed as u32) | 1,
        }
    }

    #[inline]
    fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// The per-cell draw: -1 or 1.
    #[inline]
    pub(crate) fn side(&mut self) -> i32 {
        if self.next() & 1 == 0 {
            -1
        } else {
            1
        }
    }
}

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
