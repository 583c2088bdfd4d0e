//! Voxel world model: block states, chunks, generators and editing

pub mod block;
pub mod registry;
pub mod chunk;
pub mod generator;
pub mod world;
pub mod edit;

pub use block::BlockState;
pub use chunk::{ChunkCoord, ChunkCubeCoord, CHUNK_EDGE};
pub use registry::BlockRegistry;
pub use world::{Capabilities, MemoryWorld, MemoryWorldSettings, WorldAccess};
