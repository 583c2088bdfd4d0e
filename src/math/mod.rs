//! Integer geometry used by regions

pub mod aabb;
pub mod plane;

pub use aabb::BlockBox;
pub use plane::Plane;
