//! Cell model: behavior variants and per-cell state.

use serde::{Deserialize, Serialize};

use crate::domain::materials::{MaterialId, MAT_AIR};

/// Mass of air; anything heavier displaces it.
pub const AIR_MASS: i32 = 0;

/// Sentinel mass for walls. No other cell ever reaches it, so the strict
/// mass comparison can never displace a wall.
pub const WALL_MASS: i32 = i32::MAX;

/// Closed set of movement behaviors. A new material is a new variant
/// here plus a rule entry in `simulation::rules`, not a subclass.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellBehavior {
    Air = 0,
    Sand = 1,
    Water = 2,
    Wall = 3,
}

impl CellBehavior {
    /// Behaviors that respond to gravity. Air and walls never initiate
    /// a move.
    #[inline]
    pub fn obeys_gravity(self) -> bool {
        matches!(self, Self::Sand | Self::Water)
    }

    /// Liquids spread sideways when they cannot fall.
    #[inline]
    pub fn flows_laterally(self) -> bool {
        matches!(self, Self::Water)
    }
}

/// A single grid cell.
///
/// Plain value type: swapping two cells exchanges these fields wholesale,
/// which is why the update engine conserves mass by construction. The
/// fields are always sourced from a [`CellTemplate`], keeping behavior
/// and mass consistent with the material.
///
/// [`CellTemplate`]: crate::domain::materials::CellTemplate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Material id, also the code the render differ ships to the host.
    pub material: MaterialId,
    pub behavior: CellBehavior,
    pub mass: i32,
}

impl Cell {
    pub fn air() -> Self {
        Self {
            material: MAT_AIR,
            behavior: CellBehavior::Air,
            mass: AIR_MASS,
        }
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.behavior == CellBehavior::Air
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::air()
    }
}
