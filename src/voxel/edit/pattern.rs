//! Patterns choose the block placed at each position of a fill.

use std::fmt;

use crate::core::error::Error;
use crate::core::types::{BlockPos, Result};
use crate::voxel::block::BlockState;

/// Source of block states for fills
pub trait Pattern: fmt::Debug + Send + Sync {
    /// Block to place at `pos`
    fn apply(&self, pos: BlockPos) -> BlockState;

    /// Every state this pattern can produce, for validation before a fill
    fn blocks(&self) -> Vec<BlockState>;
}

/// Places the same block everywhere
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockPattern {
    block: BlockState,
}

impl BlockPattern {
    pub fn new(block: BlockState) -> Self {
        Self { block }
    }

    pub fn block(&self) -> &BlockState {
        &self.block
    }
}

impl Pattern for BlockPattern {
    fn apply(&self, _pos: BlockPos) -> BlockState {
        self.block.clone()
    }

    fn blocks(&self) -> Vec<BlockState> {
        vec![self.block.clone()]
    }
}

impl From<BlockState> for BlockPattern {
    fn from(block: BlockState) -> Self {
        Self::new(block)
    }
}

/// Weighted random choice, stable per position for a given seed
#[derive(Clone, Debug)]
pub struct RandomPattern {
    entries: Vec<(BlockState, f64)>,
    total: f64,
    seed: u32,
}

impl RandomPattern {
    pub fn new(seed: u32) -> Self {
        Self {
            entries: Vec::new(),
            total: 0.0,
            seed,
        }
    }

    /// Add a block with a relative weight. Weights must be positive.
    pub fn add(&mut self, block: BlockState, weight: f64) -> Result<&mut Self> {
        if !(weight > 0.0 && weight.is_finite()) {
            return Err(Error::Config(format!("pattern weight must be positive, got {weight}")));
        }
        self.total += weight;
        self.entries.push((block, weight));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Pattern for RandomPattern {
    fn apply(&self, pos: BlockPos) -> BlockState {
        let roll = (hash_3d(pos.x, pos.y, pos.z, self.seed) & 0xFFFF) as f64 / 65536.0 * self.total;
        let mut acc = 0.0;
        for (block, weight) in &self.entries {
            acc += weight;
            if roll < acc {
                return block.clone();
            }
        }
        self.entries.last().map(|(block, _)| block.clone()).unwrap_or(BlockState::AIR)
    }

    fn blocks(&self) -> Vec<BlockState> {
        self.entries.iter().map(|(block, _)| block.clone()).collect()
    }
}

/// Deterministic 3D hash
fn hash_3d(x: i32, y: i32, z: i32, seed: u32) -> u32 {
    let mut h = seed;
    for v in [x, y, z] {
        h ^= v as u32;
        h = h.wrapping_mul(0x45d9f3b);
        h ^= h >> 16;
    }
    h
}
