//! Ray queries over the grid.
//!
//! Debug/inspection tooling: read-only, never part of the tick loop.
//! Steps along the dominant axis with a constant minor-axis slope,
//! sampling the minor coordinate at segment midpoints, and re-fetches
//! the current chunk only when the stepped position leaves its bounds -
//! the same chunk-boundary crossing the update engine performs.

use crate::domain::cell::Cell;
use crate::spatial::chunk::Chunk;
use crate::spatial::coords::{LocalPos, WorldPos};
use crate::spatial::world_grid::WorldGrid;

/// A non-air cell found along a ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellCastHit {
    pub cell: Cell,
    pub position: WorldPos,
}

/// Chunk lookup cache for a ray walk. Amortizes the chunk fetch to one
/// per boundary crossing instead of one per stepped cell.
struct ChunkCursor<'a> {
    grid: &'a WorldGrid,
    chunk: Option<&'a Chunk>,
}

impl<'a> ChunkCursor<'a> {
    fn new(grid: &'a WorldGrid) -> Self {
        Self { grid, chunk: None }
    }

    #[inline]
    fn cell(&mut self, pos: WorldPos) -> Option<Cell> {
        if !self.grid.in_bounds(pos) {
            return None;
        }
        let cached = self.chunk.is_some_and(|c| c.overlaps(pos, pos));
        if !cached {
            let (chunk_pos, _) = pos.to_chunk_and_local();
            self.chunk = self.grid.chunk(chunk_pos);
        }
        let chunk = self.chunk?;
        let origin = chunk.world_origin();
        Some(chunk.cell(LocalPos::new(pos.x - origin.x, pos.y - origin.y)))
    }
}

impl WorldGrid {
    /// Nearest non-air cell strictly between `from` and `to`.
    ///
    /// The start cell is skipped and the endpoint is not sampled; the
    /// walk also ends quietly when it leaves the grid.
    pub fn cast_ray(&self, from: WorldPos, to: WorldPos) -> Option<CellCastHit> {
        let mut first = None;
        self.walk_ray(from, to, &mut |hit| {
            first = Some(hit);
            false
        });
        first
    }

    /// Every non-air cell strictly between `from` and `to`, nearest
    /// first.
    pub fn ray_collect(&self, from: WorldPos, to: WorldPos) -> Vec<CellCastHit> {
        let mut hits = Vec::new();
        self.walk_ray(from, to, &mut |hit| {
            hits.push(hit);
            true
        });
        hits
    }

    fn walk_ray(&self, from: WorldPos, to: WorldPos, visit: &mut dyn FnMut(CellCastHit) -> bool) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let (abs_x, abs_y) = (dx.abs(), dy.abs());
        if abs_x == 0 && abs_y == 0 {
            return;
        }
        let mut cursor = ChunkCursor::new(self);

        if abs_x >= abs_y {
            let slope = dy as f32 / abs_x as f32;
            let step = dx.signum();
            for i in 1..abs_x {
                let pos = WorldPos::new(
                    from.x + i * step,
                    (from.y as f32 + (i as f32 + 0.5) * slope).floor() as i32,
                );
                let Some(cell) = cursor.cell(pos) else {
                    return;
                };
                if !cell.is_air() && !visit(CellCastHit { cell, position: pos }) {
                    return;
                }
            }
        } else {
            let slope = dx as f32 / abs_y as f32;
            let step = dy.signum();
            for i in 1..abs_y {
                let pos = WorldPos::new(
                    (from.x as f32 + (i as f32 + 0.5) * slope).floor() as i32,
                    from.y + i * step,
                );
                let Some(cell) = cursor.cell(pos) else {
                    return;
                };
                if !cell.is_air() && !visit(CellCastHit { cell, position: pos }) {
                    return;
                }
            }
        }
    }
}
