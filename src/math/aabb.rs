//! Integer axis-aligned block box

use crate::core::types::BlockPos;
use crate::voxel::chunk::{ChunkCoord, ChunkCubeCoord, CHUNK_SHIFT};

/// Inclusive box of block positions defined by min and max corners
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockBox {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl BlockBox {
    /// Create a box from any two opposite corners
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box covering a single block
    pub fn point(pos: BlockPos) -> Self {
        Self { min: pos, max: pos }
    }

    /// Number of blocks along each axis
    pub fn size(&self) -> BlockPos {
        self.max - self.min + BlockPos::ONE
    }

    /// Number of blocks inside, saturating for boxes near the coordinate limits
    pub fn volume(&self) -> u64 {
        let extent = |min: i32, max: i32| (i64::from(max) - i64::from(min) + 1) as u64;
        extent(self.min.x, self.max.x)
            .saturating_mul(extent(self.min.y, self.max.y))
            .saturating_mul(extent(self.min.z, self.max.z))
    }

    /// Check if block is inside the box
    pub fn contains(&self, p: BlockPos) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y &&
        p.z >= self.min.z && p.z <= self.max.z
    }

    /// Check if two boxes share at least one block
    pub fn intersects(&self, other: &BlockBox) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Grow the box to include a block
    pub fn include(&mut self, p: BlockPos) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Chunk columns overlapped by the box
    pub fn chunks(&self) -> impl Iterator<Item = ChunkCoord> + use<> {
        let min = self.min >> CHUNK_SHIFT as i32;
        let max = self.max >> CHUNK_SHIFT as i32;
        (min.z..=max.z).flat_map(move |z| (min.x..=max.x).map(move |x| ChunkCoord::new(x, z)))
    }

    /// Chunk cubes overlapped by the box
    pub fn chunk_cubes(&self) -> impl Iterator<Item = ChunkCubeCoord> + use<> {
        let min = self.min >> CHUNK_SHIFT as i32;
        let max = self.max >> CHUNK_SHIFT as i32;
        (min.y..=max.y).flat_map(move |y| {
            (min.z..=max.z).flat_map(move |z| {
                (min.x..=max.x).map(move |x| ChunkCubeCoord::new(x, y, z))
            })
        })
    }

    /// Iterate every block, x fastest, then z, then y
    pub fn iter(&self) -> BoxIter {
        BoxIter {
            bounds: *self,
            next: Some(self.min),
        }
    }
}

/// Scanline iterator over a [`BlockBox`]
#[derive(Clone, Debug)]
pub struct BoxIter {
    bounds: BlockBox,
    next: Option<BlockPos>,
}

impl Iterator for BoxIter {
    type Item = BlockPos;

    fn next(&mut self) -> Option<BlockPos> {
        let current = self.next?;
        self.next = self.step(current);
        Some(current)
    }
}

impl BoxIter {
    /// Position after `n`; compares before incrementing so boxes touching
    /// `i32::MAX` end cleanly.
    fn step(&self, mut n: BlockPos) -> Option<BlockPos> {
        let BlockBox { min, max } = self.bounds;
        if n.x < max.x {
            n.x += 1;
            return Some(n);
        }
        n.x = min.x;
        if n.z < max.z {
            n.z += 1;
            return Some(n);
        }
        n.z = min.z;
        if n.y < max.y {
            n.y += 1;
            return Some(n);
        }
        None
    }
}
