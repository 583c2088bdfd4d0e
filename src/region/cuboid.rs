//! Axis-aligned cuboid region

use std::collections::BTreeSet;

use crate::core::error::Error;
use crate::core::types::{BlockPos, Result};
use crate::math::aabb::BlockBox;
use crate::voxel::chunk::{ChunkCoord, ChunkCubeCoord};
use super::{offset, Region};

/// Cuboid spanning two corners, both inclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CuboidRegion {
    bounds: BlockBox,
}

impl CuboidRegion {
    /// Create a cuboid from any two opposite corners
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        Self {
            bounds: BlockBox::new(a, b),
        }
    }

    pub fn from_box(bounds: BlockBox) -> Self {
        Self { bounds }
    }

    pub fn block_box(&self) -> BlockBox {
        self.bounds
    }

    /// Width, height and length in blocks
    pub fn size(&self) -> BlockPos {
        self.bounds.size()
    }
}

impl Region for CuboidRegion {
    fn bounds(&self) -> Option<BlockBox> {
        Some(self.bounds)
    }

    fn contains(&self, pos: BlockPos) -> bool {
        self.bounds.contains(pos)
    }

    fn shift(&mut self, delta: BlockPos) -> Result<()> {
        let min = offset(self.bounds.min, delta)?;
        let max = offset(self.bounds.max, delta)?;
        self.bounds = BlockBox { min, max };
        Ok(())
    }

    fn expand(&mut self, delta: BlockPos) -> Result<()> {
        let grow_max = delta.max(BlockPos::ZERO);
        let grow_min = delta.min(BlockPos::ZERO);
        let max = offset(self.bounds.max, grow_max)?;
        let min = offset(self.bounds.min, grow_min)?;
        self.bounds = BlockBox { min, max };
        Ok(())
    }

    fn contract(&mut self, delta: BlockPos) -> Result<()> {
        let inverted = || {
            Error::InvalidRegion(format!(
                "contracting by {delta} would invert the cuboid {:?}..{:?}",
                self.bounds.min, self.bounds.max
            ))
        };
        let (mut min, mut max) = (self.bounds.min, self.bounds.max);
        for axis in 0..3 {
            let step = i64::from(delta[axis]);
            if step > 0 {
                max[axis] = i32::try_from(i64::from(max[axis]) - step).map_err(|_| inverted())?;
            } else {
                min[axis] = i32::try_from(i64::from(min[axis]) - step).map_err(|_| inverted())?;
            }
        }
        if min.cmpgt(max).any() {
            return Err(inverted());
        }
        self.bounds = BlockBox { min, max };
        Ok(())
    }

    fn volume(&self) -> u64 {
        self.bounds.volume()
    }

    fn chunks(&self) -> BTreeSet<ChunkCoord> {
        self.bounds.chunks().collect()
    }

    fn chunk_cubes(&self) -> BTreeSet<ChunkCubeCoord> {
        self.bounds.chunk_cubes().collect()
    }
}
