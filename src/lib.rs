//! voxedit - transactional block editing and undo for sparse voxel worlds

pub mod core;
pub mod math;
pub mod voxel;
pub mod region;
pub mod config;
pub mod platform;
pub mod tool;
