//! Cellula Engine - chunked falling-sand cell simulation
//!
//! Architecture:
//! - `domain/`     - cell model and material templates
//! - `spatial/`    - chunked world storage, addressing, ray queries
//! - `simulation/` - tick engine: 4-phase checkerboard scheduling
//! - `render/`     - frame diffing for the external tile renderer
//! - `api/`        - wasm boundary for the JS host

pub mod api;
pub mod domain;
pub mod render;
pub mod simulation;
pub mod spatial;

mod error;

pub use domain::cell::{Cell, CellBehavior};
pub use domain::materials::{CellTemplate, MaterialId, MaterialRegistry};
pub use error::EngineError;
pub use render::differ::{CellDiff, RenderDiffer};
pub use simulation::{CellWorld, SwapRequest, TickStats, WorldConfig};
pub use spatial::chunk::{Chunk, CHUNK_AREA, CHUNK_SIZE};
pub use spatial::coords::{ChunkPos, LocalPos, WorldPos};
pub use spatial::ray::CellCastHit;
pub use spatial::world_grid::WorldGrid;

// Re-export wasm-bindgen-rayon so the host can initialize the thread pool.
#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
pub use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// Better error messages in debug mode
#[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine on the wasm host.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    web_sys::console::log_1(&"cellula engine initialized".into());
}

/// Engine version.
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
