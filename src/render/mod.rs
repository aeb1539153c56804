//! Render support: incremental frame diffing for the external tile
//! renderer.

pub mod differ;
