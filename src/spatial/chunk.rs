//! Chunk - the 32x32 unit of storage and parallel scheduling.

use crate::domain::cell::Cell;
use crate::domain::materials::CellTemplate;
use crate::spatial::coords::{ChunkPos, LocalPos, WorldPos};

/// Chunk edge length in cells. Must stay even: the update engine's
/// 2x2 phase blocks assume it.
pub const CHUNK_SIZE: i32 = 32;

/// Cells per chunk.
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

const _: () = assert!(CHUNK_SIZE % 2 == 0);

/// Fixed-size subgrid of cells. The chunk position is set at
/// construction and never changes; cell contents are mutated in place
/// by the update engine.
#[derive(Debug, Clone)]
pub struct Chunk {
    position: ChunkPos,
    cells: Box<[Cell; CHUNK_AREA]>,
    /// One byte per cell, set when the cell took part in a swap this
    /// tick. Byte-granular: two same-phase workers may mark fringe
    /// cells in the same neighbor chunk, and those marks must land on
    /// disjoint bytes. Cleared at the start of every tick.
    moved: Box<[u8; CHUNK_AREA]>,
}

impl Chunk {
    /// Chunk at `position` with every cell stamped from `template`.
    pub fn new(position: ChunkPos, template: &CellTemplate) -> Self {
        Self {
            position,
            cells: Box::new([template.instantiate(); CHUNK_AREA]),
            moved: Box::new([0; CHUNK_AREA]),
        }
    }

    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// World position of the first (top-left) cell.
    pub fn world_origin(&self) -> WorldPos {
        self.position.world_origin()
    }

    /// Inclusive lower bound of the cells this chunk owns.
    pub fn min(&self) -> WorldPos {
        self.world_origin()
    }

    /// Inclusive upper bound of the cells this chunk owns.
    pub fn max(&self) -> WorldPos {
        self.world_origin().offset(CHUNK_SIZE - 1, CHUNK_SIZE - 1)
    }

    #[inline]
    pub fn cell(&self, local: LocalPos) -> Cell {
        self.cells[local.index()]
    }

    #[inline]
    pub fn cell_mut(&mut self, local: LocalPos) -> &mut Cell {
        &mut self.cells[local.index()]
    }

    /// Row-major slice of all cells.
    pub fn cells(&self) -> &[Cell] {
        &self.cells[..]
    }

    /// True when this chunk owns any cell of the inclusive region.
    pub fn overlaps(&self, min: WorldPos, max: WorldPos) -> bool {
        let own_min = self.min();
        let own_max = self.max();
        min.x <= own_max.x && max.x >= own_min.x && min.y <= own_max.y && max.y >= own_min.y
    }

    /// Rewrite the cells inside the inclusive region from `template`.
    /// Chunks outside the region are untouched, which is what makes the
    /// world-level fill safe to run chunk-parallel.
    pub fn fill_region(&mut self, template: &CellTemplate, min: WorldPos, max: WorldPos) {
        if !self.overlaps(min, max) {
            return;
        }
        let origin = self.world_origin();
        let lo_x = min.x.max(origin.x) - origin.x;
        let lo_y = min.y.max(origin.y) - origin.y;
        let hi_x = max.x.min(self.max().x) - origin.x;
        let hi_y = max.y.min(self.max().y) - origin.y;

        for y in lo_y..=hi_y {
            for x in lo_x..=hi_x {
                self.cells[LocalPos::new(x, y).index()] = template.instantiate();
            }
        }
    }

    pub(crate) fn clear_moved(&mut self) {
        self.moved.fill(0);
    }

    #[inline]
    pub(crate) fn is_moved(&self, index: usize) -> bool {
        self.moved[index] != 0
    }

    #[inline]
    pub(crate) fn mark_moved(&mut self, index: usize) {
        self.moved[index] = 1;
    }
}
