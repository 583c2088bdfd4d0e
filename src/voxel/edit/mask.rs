//! Masks filter which positions an operation may touch.

use std::collections::HashSet;
use std::fmt;

use crate::core::types::BlockPos;
use crate::region::Region;
use crate::voxel::block::BlockState;
use crate::voxel::world::WorldAccess;

/// Predicate over world positions
pub trait Mask: fmt::Debug + Send + Sync {
    fn test(&self, world: &dyn WorldAccess, pos: BlockPos) -> bool;
}

/// Matches a set of block states, or whole block types regardless of data
#[derive(Clone, Debug, Default)]
pub struct BlockMask {
    states: HashSet<BlockState>,
    ids: HashSet<u16>,
}

impl BlockMask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match an exact type and data value
    pub fn with_state(mut self, state: BlockState) -> Self {
        self.states.insert(state);
        self
    }

    /// Match a type with any data value
    pub fn with_id(mut self, id: u16) -> Self {
        self.ids.insert(id);
        self
    }

    pub fn matches(&self, block: &BlockState) -> bool {
        self.ids.contains(&block.id()) || self.states.contains(block)
    }
}

impl Mask for BlockMask {
    fn test(&self, world: &dyn WorldAccess, pos: BlockPos) -> bool {
        self.matches(&world.block(pos))
    }
}

/// Matches any non-air block
#[derive(Clone, Copy, Debug, Default)]
pub struct ExistingBlockMask;

impl Mask for ExistingBlockMask {
    fn test(&self, world: &dyn WorldAccess, pos: BlockPos) -> bool {
        !world.block(pos).is_air()
    }
}

/// Matches positions inside a region
#[derive(Debug)]
pub struct RegionMask {
    region: Box<dyn Region>,
}

impl RegionMask {
    pub fn new(region: Box<dyn Region>) -> Self {
        Self { region }
    }
}

impl Mask for RegionMask {
    fn test(&self, _world: &dyn WorldAccess, pos: BlockPos) -> bool {
        self.region.contains(pos)
    }
}

/// Negates another mask
#[derive(Debug)]
pub struct InvertMask {
    inner: Box<dyn Mask>,
}

impl InvertMask {
    pub fn new(inner: Box<dyn Mask>) -> Self {
        Self { inner }
    }
}

impl Mask for InvertMask {
    fn test(&self, world: &dyn WorldAccess, pos: BlockPos) -> bool {
        !self.inner.test(world, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::CuboidRegion;
    use crate::voxel::block::ids;
    use crate::voxel::world::{MemoryWorld, MemoryWorldSettings};

    #[test]
    fn test_block_mask_states_and_ids() {
        let mask = BlockMask::new()
            .with_state(BlockState::new(ids::WOOL, 14))
            .with_id(ids::DIRT);
        assert!(mask.matches(&BlockState::new(ids::WOOL, 14)));
        assert!(!mask.matches(&BlockState::new(ids::WOOL, 1)));
        assert!(mask.matches(&BlockState::new(ids::DIRT, 2)));
        assert!(!mask.matches(&BlockState::AIR));
    }

    #[test]
    fn test_world_masks() {
        // Flat world: bedrock at 0, stone below 5, dirt, grass at 7, air above
        let world = MemoryWorld::new(MemoryWorldSettings::default());
        let ground = BlockPos::new(0, 2, 0);
        let sky = BlockPos::new(0, 30, 0);

        assert!(ExistingBlockMask.test(&world, ground));
        assert!(!ExistingBlockMask.test(&world, sky));

        let inverted = InvertMask::new(Box::new(ExistingBlockMask));
        assert!(inverted.test(&world, sky));

        let stone = BlockMask::new().with_id(ids::STONE);
        assert!(stone.test(&world, ground));
    }

    #[test]
    fn test_region_mask() {
        let world = MemoryWorld::new(MemoryWorldSettings::default());
        let mask = RegionMask::new(Box::new(CuboidRegion::new(BlockPos::ZERO, BlockPos::splat(3))));
        assert!(mask.test(&world, BlockPos::ONE));
        assert!(!mask.test(&world, BlockPos::splat(4)));
    }
}
