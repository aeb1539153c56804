//! Chunked world storage: coordinate spaces, chunk-owned cell arrays,
//! world-space addressing, and ray queries.

pub mod chunk;
pub mod coords;
pub mod ray;
pub mod world_grid;
