//! Simulation facade: world construction, the tick loop, edit requests.
//!
//! The world owns its grid explicitly; everything that needs the grid
//! receives it by reference from here, there is no ambient singleton.

mod rules;
mod scheduler;

pub use scheduler::SwapRequest;

use serde::{Deserialize, Serialize};

use crate::domain::materials::{MaterialId, MaterialRegistry};
use crate::error::EngineError;
use crate::spatial::coords::WorldPos;
use crate::spatial::world_grid::WorldGrid;

/// Construction parameters for a world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub chunks_x: i32,
    pub chunks_y: i32,
    /// Base seed mixed into every per-chunk generator; replays with the
    /// same seed reproduce the same simulation.
    #[serde(default)]
    pub seed: u64,
    /// Material every cell starts as.
    #[serde(default)]
    pub initial_material: MaterialId,
}

/// Counters from the most recent tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub tick: u64,
    /// Swaps applied across all phases.
    pub swaps: u64,
    pub chunks_processed: u32,
}

/// The simulation: owns the grid and drives it one tick at a time.
#[derive(Debug, Clone)]
pub struct CellWorld {
    grid: WorldGrid,
    registry: MaterialRegistry,
    tick: u64,
    seed: u64,
    last_stats: TickStats,
}

impl CellWorld {
    /// Validate `config` against `registry` and build the world.
    pub fn new(config: WorldConfig, registry: MaterialRegistry) -> Result<Self, EngineError> {
        let initial = registry.template(config.initial_material).ok_or_else(|| {
            EngineError::InvalidConfiguration(format!(
                "unknown initial material {}",
                config.initial_material
            ))
        })?;
        let grid = WorldGrid::new(config.chunks_x, config.chunks_y, initial)?;
        Ok(Self {
            grid,
            registry,
            tick: 0,
            seed: config.seed,
            last_stats: TickStats::default(),
        })
    }

    pub fn grid(&self) -> &WorldGrid {
        &self.grid
    }

    pub fn registry(&self) -> &MaterialRegistry {
        &self.registry
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn last_stats(&self) -> TickStats {
        self.last_stats
    }

    /// Advance the simulation by one tick.
    ///
    /// All four phases run to completion before this returns, so
    /// callers never observe a mid-tick grid; a tick either completes
    /// in full or the world is torn down with it.
    pub fn step(&mut self) {
        let stats = scheduler::run_tick(&mut self.grid, self.tick, self.seed);
        tracing::trace!(tick = stats.tick, swaps = stats.swaps, "tick complete");
        self.last_stats = stats;
        self.tick += 1;
    }

    /// Editor/paint entry point; called between ticks, never during
    /// one.
    pub fn paint(
        &mut self,
        material: MaterialId,
        origin: WorldPos,
        size: (i32, i32),
    ) -> Result<(), EngineError> {
        let template = self
            .registry
            .template(material)
            .ok_or_else(|| {
                EngineError::InvalidConfiguration(format!("unknown material {material}"))
            })?
            .clone();
        self.grid.fill(&template, origin, size);
        Ok(())
    }
}
