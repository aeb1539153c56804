//! Integer coordinate spaces: world cells, chunks, chunk-local cells.

use std::fmt;

use crate::spatial::chunk::CHUNK_SIZE;

/// Absolute cell position in world space. `y` grows downward; gravity
/// pulls toward larger `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
}

impl WorldPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Split into the owning chunk and the cell slot inside it.
    ///
    /// Uses floored division so positions left/above the grid map to
    /// negative chunk coordinates instead of wrapping into chunk zero.
    #[inline]
    pub fn to_chunk_and_local(self) -> (ChunkPos, LocalPos) {
        let chunk = ChunkPos::new(self.x.div_euclid(CHUNK_SIZE), self.y.div_euclid(CHUNK_SIZE));
        let local = LocalPos::new(self.x.rem_euclid(CHUNK_SIZE), self.y.rem_euclid(CHUNK_SIZE));
        (chunk, local)
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Position of a chunk in the chunk grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World position of this chunk's first (top-left) cell.
    #[inline]
    pub fn world_origin(self) -> WorldPos {
        WorldPos::new(self.x * CHUNK_SIZE, self.y * CHUNK_SIZE)
    }

    /// Checkerboard phase class from coordinate parity. Chunks of equal
    /// phase are never edge-adjacent: they sit at least two apart on
    /// each axis.
    #[inline]
    pub fn phase(self) -> usize {
        (self.x.rem_euclid(2) * 2 + self.y.rem_euclid(2)) as usize
    }
}

/// Cell slot inside a chunk; both components in `0..CHUNK_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: i32,
    pub y: i32,
}

impl LocalPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Row-major slot index.
    #[inline]
    pub fn index(self) -> usize {
        (self.y * CHUNK_SIZE + self.x) as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Self {
        let index = index as i32;
        Self::new(index % CHUNK_SIZE, index / CHUNK_SIZE)
    }
}
