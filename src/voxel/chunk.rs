//! Chunk coordinates for the column (16x16) and cube (16x16x16) partitions of the world

use serde::{Deserialize, Serialize};

use crate::core::types::BlockPos;

/// Edge length of a chunk in blocks
pub const CHUNK_EDGE: i32 = 16;

/// log2 of [`CHUNK_EDGE`]; block to chunk conversion is an arithmetic shift
pub const CHUNK_SHIFT: u32 = 4;

/// Number of blocks in one horizontal chunk layer
pub const CHUNK_AREA: usize = (CHUNK_EDGE * CHUNK_EDGE) as usize;

/// Column coordinate of a chunk in the horizontal grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk column containing a block position
    pub fn from_block(pos: BlockPos) -> Self {
        Self {
            x: pos.x >> CHUNK_SHIFT,
            z: pos.z >> CHUNK_SHIFT,
        }
    }

    /// Minimum corner of this column at the given height
    pub fn min_block(&self, y: i32) -> BlockPos {
        BlockPos::new(self.x << CHUNK_SHIFT, y, self.z << CHUNK_SHIFT)
    }

    /// Check whether a block position lies in this column
    pub fn contains(&self, pos: BlockPos) -> bool {
        Self::from_block(pos) == *self
    }
}

/// Cube coordinate of a chunk in vertically segmented worlds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCubeCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCubeCoord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk cube containing a block position
    pub fn from_block(pos: BlockPos) -> Self {
        Self {
            x: pos.x >> CHUNK_SHIFT,
            y: pos.y >> CHUNK_SHIFT,
            z: pos.z >> CHUNK_SHIFT,
        }
    }

    /// Minimum corner of this cube
    pub fn min_block(&self) -> BlockPos {
        BlockPos::new(
            self.x << CHUNK_SHIFT,
            self.y << CHUNK_SHIFT,
            self.z << CHUNK_SHIFT,
        )
    }

    /// Column this cube belongs to
    pub fn column(&self) -> ChunkCoord {
        ChunkCoord::new(self.x, self.z)
    }
}

/// Index of a block inside its chunk layer (x fastest)
pub fn column_index(pos: BlockPos) -> usize {
    let lx = pos.x & (CHUNK_EDGE - 1);
    let lz = pos.z & (CHUNK_EDGE - 1);
    (lz * CHUNK_EDGE + lx) as usize
}
