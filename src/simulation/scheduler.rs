//! The 4-phase checkerboard update engine.
//!
//! Chunks are classed into four phases by coordinate parity:
//!
//! ```text
//! ┌───┬───┬───┬───┐
//! │ A │ C │ A │ C │   A = (0,0)   B = (0,1)
//! ├───┼───┼───┼───┤   C = (1,0)   D = (1,1)
//! │ B │ D │ B │ D │
//! ├───┼───┼───┼───┤
//! │ A │ C │ A │ C │
//! └───┴───┴───┴───┘
//! ```
//!
//! Chunks of one phase are never edge-adjacent, and a cell moves at
//! most one cell - so at most one chunk boundary - per swap. Workers of
//! the same phase therefore write into disjoint cells even when their
//! fringes land in the same neighbor chunk (opposite one-cell borders;
//! `CHUNK_SIZE >= 2` keeps them apart). The sequential phase loop is
//! the barrier: phase k is quiescent before phase k+1 starts, and the
//! renderer only reads after all four phases complete.
//!
//! No per-cell locks anywhere; the schedule is the sole race-prevention
//! mechanism.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::domain::cell::Cell;
use crate::simulation::rules::{self, ChunkRng};
use crate::simulation::TickStats;
use crate::spatial::chunk::{Chunk, CHUNK_SIZE};
use crate::spatial::coords::{ChunkPos, WorldPos};
use crate::spatial::world_grid::WorldGrid;

pub(crate) const PHASE_COUNT: usize = 4;

/// Proposed exchange of two cells' contents: the only mutation the
/// update engine ever performs. Queued per row, applied before the scan
/// moves to the next row, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRequest {
    pub a: WorldPos,
    pub b: WorldPos,
}

/// Raw-pointer view of the chunk array handed to phase workers.
///
/// Interior mutability with no runtime checks. Sound only under the
/// checkerboard schedule: within a phase, workers own disjoint cells
/// (their own chunk plus a one-cell fringe that never overlaps another
/// worker's), so no two threads ever touch the same memory.
pub(crate) struct WorldView<'a> {
    chunks: *mut Chunk,
    chunks_x: i32,
    chunks_y: i32,
    _marker: PhantomData<&'a mut Chunk>,
}

// SAFETY: the phase schedule guarantees workers of one phase write to
// disjoint cells and flag bytes; phases are separated by barriers.
unsafe impl Send for WorldView<'_> {}
unsafe impl Sync for WorldView<'_> {}

impl<'a> WorldView<'a> {
    pub(crate) fn new(grid: &'a mut WorldGrid) -> Self {
        let (chunks_x, chunks_y) = grid.chunk_dimensions();
        Self {
            chunks: grid.chunks_mut().as_mut_ptr(),
            chunks_x,
            chunks_y,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn in_bounds(&self, pos: WorldPos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.x < self.chunks_x * CHUNK_SIZE
            && pos.y < self.chunks_y * CHUNK_SIZE
    }

    #[inline]
    fn chunk_ref(&self, chunk: ChunkPos) -> Option<&Chunk> {
        if chunk.x < 0 || chunk.y < 0 || chunk.x >= self.chunks_x || chunk.y >= self.chunks_y {
            return None;
        }
        let index = (chunk.y * self.chunks_x + chunk.x) as usize;
        // SAFETY: index is in range; disjointness per the phase schedule.
        Some(unsafe { &*self.chunks.add(index) })
    }

    /// Mutable chunk access for the current worker.
    ///
    /// # Safety contract
    /// Only called for chunks inside the worker's own 3x3 neighborhood,
    /// which the phase schedule keeps disjoint from every concurrent
    /// worker at cell granularity.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    fn chunk_mut(&self, chunk: ChunkPos) -> Option<&mut Chunk> {
        if chunk.x < 0 || chunk.y < 0 || chunk.x >= self.chunks_x || chunk.y >= self.chunks_y {
            return None;
        }
        let index = (chunk.y * self.chunks_x + chunk.x) as usize;
        // SAFETY: see the type-level invariant; same-phase workers never
        // touch the same cells or flag bytes.
        Some(unsafe { &mut *self.chunks.add(index) })
    }

    /// Cell at `pos`, or `None` outside the grid.
    #[inline]
    fn cell(&self, pos: WorldPos) -> Option<Cell> {
        if !self.in_bounds(pos) {
            return None;
        }
        let (chunk_pos, local) = pos.to_chunk_and_local();
        self.chunk_ref(chunk_pos).map(|c| c.cell(local))
    }

    /// Cell at `pos` unless it is outside the grid or already swapped
    /// this tick; both read as blocked by the rules.
    #[inline]
    fn movable_cell(&self, pos: WorldPos) -> Option<Cell> {
        if !self.in_bounds(pos) {
            return None;
        }
        let (chunk_pos, local) = pos.to_chunk_and_local();
        let chunk = self.chunk_ref(chunk_pos)?;
        if chunk.is_moved(local.index()) {
            return None;
        }
        Some(chunk.cell(local))
    }

    #[inline]
    fn is_moved(&self, pos: WorldPos) -> bool {
        let (chunk_pos, local) = pos.to_chunk_and_local();
        self.chunk_ref(chunk_pos)
            .is_some_and(|c| c.is_moved(local.index()))
    }

    #[inline]
    fn mark_moved(&self, pos: WorldPos) {
        let (chunk_pos, local) = pos.to_chunk_and_local();
        if let Some(chunk) = self.chunk_mut(chunk_pos) {
            chunk.mark_moved(local.index());
        }
    }

    /// Exchange two cells' contents; mirrors `WorldGrid::swap_cells`
    /// for phase workers.
    fn swap(&self, request: SwapRequest) {
        if request.a == request.b {
            return;
        }
        let (chunk_a, local_a) = request.a.to_chunk_and_local();
        let (chunk_b, local_b) = request.b.to_chunk_and_local();

        if chunk_a == chunk_b {
            if let Some(chunk) = self.chunk_mut(chunk_a) {
                let cell_a = chunk.cell(local_a);
                let cell_b = chunk.cell(local_b);
                *chunk.cell_mut(local_a) = cell_b;
                *chunk.cell_mut(local_b) = cell_a;
            }
            return;
        }
        let (Some(first), Some(second)) = (self.chunk_mut(chunk_a), self.chunk_mut(chunk_b))
        else {
            return;
        };
        let cell_a = first.cell(local_a);
        *first.cell_mut(local_a) = second.cell(local_b);
        *second.cell_mut(local_b) = cell_a;
    }
}

/// Run one full tick: clear the per-tick swap marks, then the four
/// phases in order with a barrier between each.
pub(crate) fn run_tick(grid: &mut WorldGrid, tick: u64, seed: u64) -> TickStats {
    run_tick_inner(grid, tick, seed, None)
}

/// Tick variant that records every applied swap; used to assert the
/// no-double-move property in tests.
#[cfg(test)]
pub(crate) fn run_tick_traced(
    grid: &mut WorldGrid,
    tick: u64,
    seed: u64,
    log: &Mutex<Vec<SwapRequest>>,
) -> TickStats {
    run_tick_inner(grid, tick, seed, Some(log))
}

fn run_tick_inner(
    grid: &mut WorldGrid,
    tick: u64,
    seed: u64,
    log: Option<&Mutex<Vec<SwapRequest>>>,
) -> TickStats {
    grid.clear_moved_flags();
    let (chunks_x, chunks_y) = grid.chunk_dimensions();
    let swaps = AtomicU64::new(0);
    let mut chunks_processed = 0u32;
    let view = WorldView::new(grid);

    for phase in 0..PHASE_COUNT {
        let coords = phase_chunks(chunks_x, chunks_y, phase);
        chunks_processed += coords.len() as u32;
        run_phase(&view, &coords, tick, seed, &swaps, log);
        // Implicit barrier: the next phase only starts once every
        // worker of this one has returned.
    }

    TickStats {
        tick,
        swaps: swaps.load(Ordering::Relaxed),
        chunks_processed,
    }
}

/// All chunk coordinates of one phase class, row-major.
pub(crate) fn phase_chunks(chunks_x: i32, chunks_y: i32, phase: usize) -> Vec<ChunkPos> {
    let mut coords = Vec::new();
    for cy in 0..chunks_y {
        for cx in 0..chunks_x {
            let pos = ChunkPos::new(cx, cy);
            if pos.phase() == phase {
                coords.push(pos);
            }
        }
    }
    coords
}

/// Process every chunk of one phase; chunks run on worker threads under
/// the `parallel` feature, sequentially otherwise.
fn run_phase(
    view: &WorldView<'_>,
    coords: &[ChunkPos],
    tick: u64,
    seed: u64,
    swaps: &AtomicU64,
    log: Option<&Mutex<Vec<SwapRequest>>>,
) {
    #[cfg(feature = "parallel")]
    coords.par_iter().for_each(|&chunk_pos| {
        let applied = process_chunk(view, chunk_pos, tick, seed, log);
        swaps.fetch_add(applied, Ordering::Relaxed);
    });

    #[cfg(not(feature = "parallel"))]
    for &chunk_pos in coords {
        let applied = process_chunk(view, chunk_pos, tick, seed, log);
        swaps.fetch_add(applied, Ordering::Relaxed);
    }
}

/// Scan one chunk top-to-bottom, two passes per row, applying each
/// row's swaps before the next row starts so downward motion is visible
/// to the rows below within the same tick.
fn process_chunk(
    view: &WorldView<'_>,
    chunk_pos: ChunkPos,
    tick: u64,
    seed: u64,
    log: Option<&Mutex<Vec<SwapRequest>>>,
) -> u64 {
    let origin = chunk_pos.world_origin();
    let mut rng = ChunkRng::new(chunk_pos, tick, seed);
    let mut row_swaps: Vec<SwapRequest> = Vec::with_capacity(CHUNK_SIZE as usize);
    let mut applied = 0u64;

    for y in 0..CHUNK_SIZE {
        row_swaps.clear();

        // Pass one: straight-down gravity. Requests claim both
        // endpoints in the moved mask, so pass two and later rows skip
        // them and no cell address joins a second swap this tick.
        for x in 0..CHUNK_SIZE {
            let pos = origin.offset(x, y);
            if view.is_moved(pos) {
                continue;
            }
            let Some(cell) = view.cell(pos) else {
                continue;
            };
            if let Some(target) = rules::fall_target(cell, pos, |p| view.movable_cell(p)) {
                view.mark_moved(pos);
                view.mark_moved(target);
                row_swaps.push(SwapRequest { a: pos, b: target });
            }
        }

        // Pass two: diagonal and lateral settling for cells that did
        // not fall. One random draw per cell, shared by every
        // candidate-direction test.
        for x in 0..CHUNK_SIZE {
            let pos = origin.offset(x, y);
            if view.is_moved(pos) {
                continue;
            }
            let Some(cell) = view.cell(pos) else {
                continue;
            };
            if !cell.behavior.obeys_gravity() {
                continue;
            }
            let side = rng.side();
            if let Some(target) = rules::settle_target(cell, pos, side, |p| view.movable_cell(p)) {
                view.mark_moved(pos);
                view.mark_moved(target);
                row_swaps.push(SwapRequest { a: pos, b: target });
            }
        }

        for request in &row_swaps {
            view.swap(*request);
        }
        applied += row_swaps.len() as u64;

        if let Some(log) = log {
            if !row_swaps.is_empty() {
                if let Ok(mut entries) = log.lock() {
                    entries.extend_from_slice(&row_swaps);
                }
            }
        }
    }

    applied
}
