//! WorldGrid - owns the chunk array and all world-space addressing.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::domain::cell::Cell;
use crate::domain::materials::CellTemplate;
use crate::error::EngineError;
use crate::spatial::chunk::{Chunk, CHUNK_SIZE};
use crate::spatial::coords::{ChunkPos, LocalPos, WorldPos};

/// Upper bound on chunks per axis; keeps cell coordinates comfortably
/// inside `i32` and allocation sizes sane.
pub const MAX_CHUNKS_PER_AXIS: i32 = 4096;

/// The world: a fixed `chunks_x x chunks_y` array of chunks, created
/// once and destroyed together. Every world position inside
/// `[0, chunks_x*32) x [0, chunks_y*32)` maps to exactly one chunk and
/// one local cell; everything outside reads as absent.
#[derive(Debug, Clone)]
pub struct WorldGrid {
    chunks: Vec<Chunk>,
    chunks_x: i32,
    chunks_y: i32,
}

impl WorldGrid {
    /// Build a `chunks_x x chunks_y` grid with every cell stamped from
    /// `initial`. Dimensions must be positive and within
    /// [`MAX_CHUNKS_PER_AXIS`].
    pub fn new(chunks_x: i32, chunks_y: i32, initial: &CellTemplate) -> Result<Self, EngineError> {
        if chunks_x <= 0 || chunks_y <= 0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "chunk grid {chunks_x}x{chunks_y} must have positive dimensions"
            )));
        }
        if chunks_x > MAX_CHUNKS_PER_AXIS || chunks_y > MAX_CHUNKS_PER_AXIS {
            return Err(EngineError::InvalidConfiguration(format!(
                "chunk grid {chunks_x}x{chunks_y} exceeds {MAX_CHUNKS_PER_AXIS} chunks per axis"
            )));
        }
        let mut chunks = Vec::with_capacity(chunks_x as usize * chunks_y as usize);
        for cy in 0..chunks_y {
            for cx in 0..chunks_x {
                chunks.push(Chunk::new(ChunkPos::new(cx, cy), initial));
            }
        }
        tracing::info!(chunks_x, chunks_y, "created world grid");
        Ok(Self {
            chunks,
            chunks_x,
            chunks_y,
        })
    }

    /// Build from cell dimensions, which must be positive multiples of
    /// [`CHUNK_SIZE`].
    pub fn from_cell_dimensions(
        width: i32,
        height: i32,
        initial: &CellTemplate,
    ) -> Result<Self, EngineError> {
        if width <= 0 || height <= 0 || width % CHUNK_SIZE != 0 || height % CHUNK_SIZE != 0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "world size {width}x{height} is not a positive multiple of {CHUNK_SIZE}"
            )));
        }
        Self::new(width / CHUNK_SIZE, height / CHUNK_SIZE, initial)
    }

    pub fn chunk_dimensions(&self) -> (i32, i32) {
        (self.chunks_x, self.chunks_y)
    }

    /// World width in cells.
    pub fn width(&self) -> i32 {
        self.chunks_x * CHUNK_SIZE
    }

    /// World height in cells.
    pub fn height(&self) -> i32 {
        self.chunks_y * CHUNK_SIZE
    }

    #[inline]
    pub fn in_bounds(&self, pos: WorldPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width() && pos.y < self.height()
    }

    #[inline]
    pub(crate) fn chunk_index(&self, chunk: ChunkPos) -> usize {
        (chunk.y * self.chunks_x + chunk.x) as usize
    }

    /// Chunk at a chunk coordinate.
    pub fn chunk(&self, chunk: ChunkPos) -> Option<&Chunk> {
        if chunk.x < 0 || chunk.y < 0 || chunk.x >= self.chunks_x || chunk.y >= self.chunks_y {
            return None;
        }
        Some(&self.chunks[self.chunk_index(chunk)])
    }

    /// All chunks in row-major order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub(crate) fn chunks_mut(&mut self) -> &mut [Chunk] {
        &mut self.chunks
    }

    /// The chunk owning `world_pos`. Callers are expected to
    /// bounds-check first; an out-of-range position is an error here,
    /// never a wrap-around.
    pub fn chunk_at(&self, world_pos: WorldPos) -> Result<&Chunk, EngineError> {
        if !self.in_bounds(world_pos) {
            return Err(EngineError::OutOfBounds {
                x: world_pos.x,
                y: world_pos.y,
            });
        }
        let (chunk, _) = world_pos.to_chunk_and_local();
        Ok(&self.chunks[self.chunk_index(chunk)])
    }

    /// Bounds-checked read; any out-of-range position reads as absent.
    #[inline]
    pub fn try_get_cell(&self, pos: WorldPos) -> Option<Cell> {
        if !self.in_bounds(pos) {
            return None;
        }
        let (chunk, local) = pos.to_chunk_and_local();
        Some(self.chunks[self.chunk_index(chunk)].cell(local))
    }

    /// Exchange the contents of two cells.
    ///
    /// The single mutation primitive of the update engine: content
    /// moves between slots, it is never created or destroyed, so any
    /// sequence of swaps conserves the world's mass multiset. No-op
    /// when the positions match or either lies outside the grid.
    pub fn swap_cells(&mut self, a: WorldPos, b: WorldPos) {
        if a == b || !self.in_bounds(a) || !self.in_bounds(b) {
            return;
        }
        let (chunk_a, local_a) = a.to_chunk_and_local();
        let (chunk_b, local_b) = b.to_chunk_and_local();
        let index_a = self.chunk_index(chunk_a);
        let index_b = self.chunk_index(chunk_b);

        let cell_a = self.chunks[index_a].cell(local_a);
        let cell_b = self.chunks[index_b].cell(local_b);
        *self.chunks[index_a].cell_mut(local_a) = cell_b;
        *self.chunks[index_b].cell_mut(local_b) = cell_a;
    }

    /// Bulk write used by initialization and editor paints; never part
    /// of the hot tick path. Every chunk independently overlap-tests
    /// the region, so the rewrite runs chunk-parallel.
    pub fn fill(&mut self, template: &CellTemplate, origin: WorldPos, size: (i32, i32)) {
        if size.0 <= 0 || size.1 <= 0 {
            return;
        }
        let min = origin;
        let max = origin.offset(size.0 - 1, size.1 - 1);
        tracing::debug!(%origin, width = size.0, height = size.1, key = %template.key, "fill region");

        #[cfg(feature = "parallel")]
        self.chunks
            .par_iter_mut()
            .for_each(|chunk| chunk.fill_region(template, min, max));

        #[cfg(not(feature = "parallel"))]
        for chunk in &mut self.chunks {
            chunk.fill_region(template, min, max);
        }
    }

    /// Rewrite the whole grid from one template.
    pub fn fill_all(&mut self, template: &CellTemplate) {
        let (w, h) = (self.width(), self.height());
        self.fill(template, WorldPos::new(0, 0), (w, h));
    }

    /// Every cell with its world position, row-major per chunk.
    pub fn iter_cells(&self) -> impl Iterator<Item = (WorldPos, Cell)> + '_ {
        self.chunks.iter().flat_map(|chunk| {
            let origin = chunk.world_origin();
            chunk.cells().iter().enumerate().map(move |(i, &cell)| {
                let local = LocalPos::from_index(i);
                (origin.offset(local.x, local.y), cell)
            })
        })
    }

    pub(crate) fn clear_moved_flags(&mut self) {
        for chunk in &mut self.chunks {
            chunk.clear_moved();
        }
    }
}
