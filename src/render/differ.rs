//! Frame diffing.
//!
//! The differ keeps two world-sized snapshots of rendered material
//! codes. Each frame it samples the grid inside the camera rectangle
//! and emits only the cells whose code changed, so the batch handed to
//! the external renderer scales with activity, not with world size.

use crate::domain::materials::MaterialId;
use crate::spatial::coords::{LocalPos, WorldPos};
use crate::spatial::world_grid::WorldGrid;

/// Sentinel for "never rendered"; seeds the previous snapshot so the
/// first frame emits every visible cell.
const UNRENDERED: i16 = -1;

/// One changed cell for the external tile renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDiff {
    pub position: WorldPos,
    pub material: MaterialId,
}

/// Current/previous snapshot pair plus the camera rectangle.
#[derive(Debug, Clone)]
pub struct RenderDiffer {
    width: i32,
    height: i32,
    camera_min: WorldPos,
    camera_max: WorldPos,
    current: Vec<i16>,
    previous: Vec<i16>,
}

impl RenderDiffer {
    /// Differ whose camera covers the whole grid.
    pub fn new(grid: &WorldGrid) -> Self {
        Self::with_camera(
            grid,
            WorldPos::new(0, 0),
            WorldPos::new(grid.width() - 1, grid.height() - 1),
        )
    }

    /// Differ restricted to a camera rectangle (inclusive bounds,
    /// clamped to the grid).
    pub fn with_camera(grid: &WorldGrid, min: WorldPos, max: WorldPos) -> Self {
        let size = (grid.width() * grid.height()) as usize;
        let mut differ = Self {
            width: grid.width(),
            height: grid.height(),
            camera_min: WorldPos::new(0, 0),
            camera_max: WorldPos::new(0, 0),
            current: vec![UNRENDERED; size],
            previous: vec![UNRENDERED; size],
        };
        differ.set_camera(min, max);
        differ
    }

    /// Move the camera rectangle; bounds are clamped to the grid.
    pub fn set_camera(&mut self, min: WorldPos, max: WorldPos) {
        self.camera_min = WorldPos::new(min.x.max(0), min.y.max(0));
        self.camera_max = WorldPos::new(max.x.min(self.width - 1), max.y.min(self.height - 1));
    }

    pub fn camera(&self) -> (WorldPos, WorldPos) {
        (self.camera_min, self.camera_max)
    }

    /// Sample the grid and return the minimal set of visible cells
    /// whose rendered code changed since the previous call.
    ///
    /// Chunks fully outside the camera are rejected wholesale before
    /// any per-cell work - the important case, since most chunks are
    /// off-screen. Each visible position appears at most once, and a
    /// frame identical to the previous one yields an empty batch.
    pub fn compute_diff(&mut self, grid: &WorldGrid) -> Vec<CellDiff> {
        let mut batch = Vec::new();
        for chunk in grid.chunks() {
            if !chunk.overlaps(self.camera_min, self.camera_max) {
                continue;
            }
            let origin = chunk.world_origin();
            for (i, &cell) in chunk.cells().iter().enumerate() {
                let local = LocalPos::from_index(i);
                let pos = origin.offset(local.x, local.y);
                if pos.x < self.camera_min.x
                    || pos.x > self.camera_max.x
                    || pos.y < self.camera_min.y
                    || pos.y > self.camera_max.y
                {
                    continue;
                }
                let index = (pos.y * self.width + pos.x) as usize;
                self.current[index] = i16::from(cell.material);
                if self.current[index] != self.previous[index] {
                    self.previous[index] = self.current[index];
                    batch.push(CellDiff {
                        position: pos,
                        material: cell.material,
                    });
                }
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::materials::{MaterialRegistry, MAT_AIR, MAT_SAND, MAT_WATER};
    use std::collections::HashSet;

    fn air_grid(chunks_x: i32, chunks_y: i32) -> (WorldGrid, MaterialRegistry) {
        let registry = MaterialRegistry::builtin();
        let grid =
            WorldGrid::new(chunks_x, chunks_y, registry.template(MAT_AIR).unwrap()).unwrap();
        (grid, registry)
    }

    #[test]
    fn first_frame_emits_every_visible_cell_once() {
        let (grid, _) = air_grid(2, 1);
        let mut differ = RenderDiffer::new(&grid);
        let batch = differ.compute_diff(&grid);

        assert_eq!(batch.len(), (grid.width() * grid.height()) as usize);
        let positions: HashSet<_> = batch.iter().map(|d| d.position).collect();
        assert_eq!(positions.len(), batch.len());
    }

    #[test]
    fn identical_frames_yield_an_empty_batch() {
        let (grid, _) = air_grid(2, 2);
        let mut differ = RenderDiffer::new(&grid);
        differ.compute_diff(&grid);
        assert!(differ.compute_diff(&grid).is_empty());
    }

    #[test]
    fn single_change_yields_single_entry() {
        let (mut grid, registry) = air_grid(2, 2);
        let mut differ = RenderDiffer::new(&grid);
        differ.compute_diff(&grid);

        let pos = WorldPos::new(40, 12);
        grid.fill(registry.template(MAT_SAND).unwrap(), pos, (1, 1));

        let batch = differ.compute_diff(&grid);
        assert_eq!(
            batch,
            vec![CellDiff {
                position: pos,
                material: MAT_SAND
            }]
        );
    }

    #[test]
    fn camera_restricts_first_frame_and_rejects_offscreen_changes() {
        let (mut grid, registry) = air_grid(4, 4);
        // Camera covers only the top-left chunk.
        let mut differ =
            RenderDiffer::with_camera(&grid, WorldPos::new(0, 0), WorldPos::new(31, 31));

        let batch = differ.compute_diff(&grid);
        assert_eq!(batch.len(), 32 * 32);
        assert!(batch
            .iter()
            .all(|d| d.position.x <= 31 && d.position.y <= 31));

        // A change far off-screen produces nothing.
        grid.fill(
            registry.template(MAT_WATER).unwrap(),
            WorldPos::new(100, 100),
            (4, 4),
        );
        assert!(differ.compute_diff(&grid).is_empty());
    }

    #[test]
    fn camera_clamps_to_grid_bounds() {
        let (grid, _) = air_grid(1, 1);
        let mut differ =
            RenderDiffer::with_camera(&grid, WorldPos::new(-100, -100), WorldPos::new(500, 500));
        assert_eq!(
            differ.camera(),
            (WorldPos::new(0, 0), WorldPos::new(31, 31))
        );
        assert_eq!(differ.compute_diff(&grid).len(), 32 * 32);
    }

    #[test]
    fn partial_camera_overlap_checks_cells_individually() {
        let (grid, _) = air_grid(2, 2);
        // Camera straddles all four chunks.
        let mut differ =
            RenderDiffer::with_camera(&grid, WorldPos::new(16, 16), WorldPos::new(47, 47));
        let batch = differ.compute_diff(&grid);
        assert_eq!(batch.len(), 32 * 32);
        assert!(batch.iter().all(|d| {
            (16..=47).contains(&d.position.x) && (16..=47).contains(&d.position.y)
        }));
    }

    #[test]
    fn moved_cell_produces_paired_entries() {
        let (mut grid, registry) = air_grid(1, 1);
        let mut differ = RenderDiffer::new(&grid);
        let from = WorldPos::new(10, 10);
        let to = WorldPos::new(10, 11);
        grid.fill(registry.template(MAT_SAND).unwrap(), from, (1, 1));
        differ.compute_diff(&grid);

        grid.swap_cells(from, to);
        let batch = differ.compute_diff(&grid);
        let as_pairs: HashSet<_> = batch.iter().map(|d| (d.position, d.material)).collect();
        assert_eq!(batch.len(), 2);
        assert!(as_pairs.contains(&(from, MAT_AIR)));
        assert!(as_pairs.contains(&(to, MAT_SAND)));
    }
}
