//! wasm-bindgen facade for the JS host.
//!
//! Diff batches cross the boundary as flat transfer buffers instead of
//! per-cell calls: the host invokes `collect_diff`, then reads `count`
//! (x, y) pairs from `diff_positions_ptr` and `count` material codes
//! from `diff_materials_ptr` straight out of wasm memory. Mapping a
//! material code to a visual tile, and any entity bookkeeping behind
//! it, is the host's job.

use wasm_bindgen::prelude::*;

use crate::domain::materials::{MaterialId, MaterialRegistry, MAT_AIR};
use crate::render::differ::RenderDiffer;
use crate::simulation::{CellWorld, WorldConfig};
use crate::spatial::coords::WorldPos;

#[wasm_bindgen]
pub struct World {
    core: CellWorld,
    differ: RenderDiffer,
    diff_positions: Vec<i32>,
    diff_materials: Vec<u8>,
}

#[wasm_bindgen]
impl World {
    /// World of `chunks_x x chunks_y` chunks, built on the built-in
    /// material set, starting as air.
    #[wasm_bindgen(constructor)]
    pub fn new(chunks_x: i32, chunks_y: i32, seed: u64) -> Result<World, JsError> {
        let config = WorldConfig {
            chunks_x,
            chunks_y,
            seed,
            initial_material: MAT_AIR,
        };
        let core = CellWorld::new(config, MaterialRegistry::builtin())
            .map_err(|e| JsError::new(&e.to_string()))?;
        let differ = RenderDiffer::new(core.grid());
        Ok(Self {
            core,
            differ,
            diff_positions: Vec::new(),
            diff_materials: Vec::new(),
        })
    }

    /// World built from a JSON material bundle (see
    /// `content/materials.json`).
    #[wasm_bindgen(js_name = newWithBundle)]
    pub fn new_with_bundle(
        chunks_x: i32,
        chunks_y: i32,
        seed: u64,
        bundle_json: &str,
    ) -> Result<World, JsError> {
        let registry = MaterialRegistry::from_bundle_json(bundle_json)
            .map_err(|e| JsError::new(&e.to_string()))?;
        let config = WorldConfig {
            chunks_x,
            chunks_y,
            seed,
            initial_material: MAT_AIR,
        };
        let core = CellWorld::new(config, registry).map_err(|e| JsError::new(&e.to_string()))?;
        let differ = RenderDiffer::new(core.grid());
        Ok(Self {
            core,
            differ,
            diff_positions: Vec::new(),
            diff_materials: Vec::new(),
        })
    }

    /// World width in cells.
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> i32 {
        self.core.grid().width()
    }

    /// World height in cells.
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> i32 {
        self.core.grid().height()
    }

    #[wasm_bindgen(getter)]
    pub fn tick(&self) -> u64 {
        self.core.tick()
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self) {
        self.core.step();
    }

    /// Swaps applied during the most recent tick.
    pub fn last_swap_count(&self) -> u64 {
        self.core.last_stats().swaps
    }

    /// Paint a rectangle of one material. Editor-time path; returns
    /// false for an unknown material id.
    pub fn paint(&mut self, x: i32, y: i32, width: i32, height: i32, material: u8) -> bool {
        self.core
            .paint(material as MaterialId, WorldPos::new(x, y), (width, height))
            .is_ok()
    }

    /// Restrict diffing to a camera rectangle (inclusive bounds).
    pub fn set_camera(&mut self, min_x: i32, min_y: i32, max_x: i32, max_y: i32) {
        self.differ
            .set_camera(WorldPos::new(min_x, min_y), WorldPos::new(max_x, max_y));
    }

    /// Sample the grid and stage changed cells in the transfer buffers.
    /// Returns the number of staged entries.
    pub fn collect_diff(&mut self) -> usize {
        let batch = self.differ.compute_diff(self.core.grid());
        self.diff_positions.clear();
        self.diff_materials.clear();
        for diff in &batch {
            self.diff_positions.push(diff.position.x);
            self.diff_positions.push(diff.position.y);
            self.diff_materials.push(diff.material);
        }
        batch.len()
    }

    /// Pointer to `2 * count` interleaved (x, y) coordinates.
    pub fn diff_positions_ptr(&self) -> *const i32 {
        self.diff_positions.as_ptr()
    }

    /// Pointer to `count` material codes.
    pub fn diff_materials_ptr(&self) -> *const u8 {
        self.diff_materials.as_ptr()
    }

    /// Nearest non-air cell between two points, as `[x, y, material]`,
    /// or an empty array on a miss. Debug overlay helper.
    pub fn cast_ray(&self, from_x: i32, from_y: i32, to_x: i32, to_y: i32) -> Vec<i32> {
        match self
            .core
            .grid()
            .cast_ray(WorldPos::new(from_x, from_y), WorldPos::new(to_x, to_y))
        {
            Some(hit) => vec![hit.position.x, hit.position.y, i32::from(hit.cell.material)],
            None => Vec::new(),
        }
    }
}
