use thiserror::Error;

/// Failures surfaced by world construction and direct indexed access.
///
/// Bounds-checked query paths (`try_get_cell`, ray queries) never return
/// these; an out-of-range position there simply reads as absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A position outside the grid reached an indexed accessor whose
    /// callers are expected to bounds-check first.
    #[error("world position ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },

    /// Dimensions or material data that cannot form a valid world.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
