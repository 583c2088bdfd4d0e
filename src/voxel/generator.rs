//! Chunk content generators.
//!
//! The edit engine treats generation as opaque: it only asks a world to
//! regenerate a chunk and compares before/after states.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::core::types::BlockPos;
use super::block::{ids, BlockState};

/// Produces the freshly generated state of any block position
pub trait ChunkGenerator: Send + Sync {
    fn generate(&self, pos: BlockPos) -> BlockState;
}

/// Generator that produces nothing but air
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyGenerator;

impl ChunkGenerator for EmptyGenerator {
    fn generate(&self, _pos: BlockPos) -> BlockState {
        BlockState::AIR
    }
}

/// Superflat layers: bedrock, stone, dirt, grass, then air
#[derive(Clone, Copy, Debug)]
pub struct FlatGenerator {
    /// Y of the bedrock floor
    pub floor: i32,
    /// First air layer above the grass
    pub surface: i32,
}

impl Default for FlatGenerator {
    fn default() -> Self {
        Self { floor: 0, surface: 8 }
    }
}

impl ChunkGenerator for FlatGenerator {
    fn generate(&self, pos: BlockPos) -> BlockState {
        let y = pos.y;
        if y < self.floor || y >= self.surface {
            BlockState::AIR
        } else if y == self.floor {
            BlockState::of(ids::BEDROCK)
        } else if y == self.surface - 1 {
            BlockState::of(ids::GRASS)
        } else if y >= self.surface - 3 {
            BlockState::of(ids::DIRT)
        } else {
            BlockState::of(ids::STONE)
        }
    }
}

/// Parameters controlling heightmap generation
#[derive(Clone, Debug)]
pub struct NoiseParams {
    pub seed: u32,
    pub scale: f64,        // Horizontal scale (larger = smoother)
    pub base_height: i32,  // Height of the zero noise level
    pub amplitude: f64,    // Height variation either side of the base
    pub octaves: usize,    // FBM octaves
    pub sea_level: i32,    // Air below this height becomes water
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 64.0,
            base_height: 32,
            amplitude: 16.0,
            octaves: 4,
            sea_level: 30,
        }
    }
}

/// Heightmap terrain using fractal Brownian motion
pub struct NoiseGenerator {
    params: NoiseParams,
    noise: Fbm<Perlin>,
}

impl NoiseGenerator {
    pub fn new(params: NoiseParams) -> Self {
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves)
            .set_persistence(0.5)
            .set_lacunarity(2.0);

        Self { params, noise }
    }

    /// Surface height of the column at (x, z)
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        let nx = x as f64 / self.params.scale;
        let nz = z as f64 / self.params.scale;
        let value = self.noise.get([nx, nz]);
        self.params.base_height + (value * self.params.amplitude).round() as i32
    }
}

impl ChunkGenerator for NoiseGenerator {
    fn generate(&self, pos: BlockPos) -> BlockState {
        let height = self.height_at(pos.x, pos.z);
        if pos.y > height {
            if pos.y <= self.params.sea_level {
                BlockState::of(ids::WATER)
            } else {
                BlockState::AIR
            }
        } else if pos.y == height {
            if height < self.params.sea_level {
                BlockState::of(ids::SAND)
            } else {
                BlockState::of(ids::GRASS)
            }
        } else if pos.y > height - 4 {
            BlockState::of(ids::DIRT)
        } else {
            BlockState::of(ids::STONE)
        }
    }
}
