//! Regions: shapes over block coordinates supporting containment and
//! deterministic iteration.
//!
//! Every region iterates its bounding box in scanline order (x fastest, then
//! z, then y) and yields the positions it contains, so each contained block
//! is produced exactly once and the order is stable across calls.

pub mod cuboid;
pub mod cylinder;
pub mod ellipsoid;
pub mod polyhedron;

use std::collections::BTreeSet;
use std::fmt;

use crate::core::error::Error;
use crate::core::types::{BlockPos, Result};
use crate::math::aabb::{BlockBox, BoxIter};
use crate::voxel::chunk::{ChunkCoord, ChunkCubeCoord};

pub use cuboid::CuboidRegion;
pub use cylinder::CylinderRegion;
pub use ellipsoid::EllipsoidRegion;
pub use polyhedron::{ConvexPolyhedron, PolyhedronBuilder};

/// A shape over block coordinates
pub trait Region: fmt::Debug + Send + Sync {
    /// Bounding box of the shape, or `None` when it is degenerate
    fn bounds(&self) -> Option<BlockBox>;

    /// Pure membership test
    fn contains(&self, pos: BlockPos) -> bool;

    /// Move the region by `delta`
    fn shift(&mut self, delta: BlockPos) -> Result<()>;

    /// Grow the region; each signed component moves the face it points at
    fn expand(&mut self, delta: BlockPos) -> Result<()>;

    /// Shrink the region; each signed component moves the face it points at inwards
    fn contract(&mut self, delta: BlockPos) -> Result<()>;

    /// Zero-volume or malformed shapes iterate nothing
    fn is_degenerate(&self) -> bool {
        self.bounds().is_none()
    }

    fn min(&self) -> Option<BlockPos> {
        self.bounds().map(|b| b.min)
    }

    fn max(&self) -> Option<BlockPos> {
        self.bounds().map(|b| b.max)
    }

    /// Lazily iterate contained positions
    fn iter(&self) -> RegionIter<'_, Self>
    where
        Self: Sized,
    {
        RegionIter::new(self)
    }

    /// Number of contained blocks
    fn volume(&self) -> u64 {
        RegionIter::new(self).count() as u64
    }

    /// Chunk columns holding at least one contained block
    fn chunks(&self) -> BTreeSet<ChunkCoord> {
        RegionIter::new(self).map(ChunkCoord::from_block).collect()
    }

    /// Chunk cubes holding at least one contained block
    fn chunk_cubes(&self) -> BTreeSet<ChunkCubeCoord> {
        RegionIter::new(self).map(ChunkCubeCoord::from_block).collect()
    }
}

/// Iterator over the blocks of a region
pub struct RegionIter<'a, R: Region + ?Sized> {
    region: &'a R,
    scan: Option<BoxIter>,
}

impl<'a, R: Region + ?Sized> RegionIter<'a, R> {
    pub fn new(region: &'a R) -> Self {
        Self {
            region,
            scan: region.bounds().map(|b| b.iter()),
        }
    }
}

impl<R: Region + ?Sized> Iterator for RegionIter<'_, R> {
    type Item = BlockPos;

    fn next(&mut self) -> Option<BlockPos> {
        let scan = self.scan.as_mut()?;
        let region = self.region;
        scan.find(|p| region.contains(*p))
    }
}

/// `pos + delta`, or an error when the result leaves the `i32` block range
pub(crate) fn offset(pos: BlockPos, delta: BlockPos) -> Result<BlockPos> {
    match (
        pos.x.checked_add(delta.x),
        pos.y.checked_add(delta.y),
        pos.z.checked_add(delta.z),
    ) {
        (Some(x), Some(y), Some(z)) => Ok(BlockPos::new(x, y, z)),
        _ => Err(Error::InvalidRegion(format!(
            "moving {pos} by {delta} leaves the block coordinate range"
        ))),
    }
}

/// Lowest and highest block reached by a radius around `center` on one axis.
///
/// A radius of `r` reaches `floor(r + 0.5)` blocks out. Radii whose reach
/// does not fit the `i32` block range are rejected.
pub(crate) fn axis_reach(center: i32, radius: f64) -> Result<(i32, i32)> {
    let reach = (radius + 0.5).floor();
    let fits = reach.is_finite() && reach >= 0.0 && reach <= f64::from(i32::MAX);
    let span = if fits {
        let reach = reach as i32;
        center.checked_sub(reach).zip(center.checked_add(reach))
    } else {
        None
    };
    span.ok_or_else(|| {
        Error::InvalidRegion(format!(
            "radius {radius} around {center} does not fit in block coordinates"
        ))
    })
}

/// Iterate a region behind a trait object
pub fn iter<'a>(region: &'a dyn Region) -> RegionIter<'a, dyn Region + 'a> {
    RegionIter::new(region)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashSet;

    /// Check that iteration and containment agree over a padded bounding box
    pub fn assert_consistent(region: &dyn Region) {
        let points: Vec<BlockPos> = iter(region).collect();
        let unique: HashSet<BlockPos> = points.iter().copied().collect();
        assert_eq!(points.len(), unique.len(), "iteration produced duplicates");

        let Some(bounds) = region.bounds() else {
            assert!(points.is_empty());
            return;
        };
        let padded = BlockBox::new(bounds.min - BlockPos::ONE, bounds.max + BlockPos::ONE);
        for p in padded.iter() {
            assert_eq!(
                region.contains(p),
                unique.contains(&p),
                "contains and iteration disagree at {p:?}"
            );
        }

        // Restartable and stable
        let again: Vec<BlockPos> = iter(region).collect();
        assert_eq!(points, again);
    }
}
