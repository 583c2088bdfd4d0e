//! Ellipsoid region ("convex sphere")

use crate::core::error::Error;
use crate::core::types::{BlockPos, DVec3, Result};
use crate::math::aabb::BlockBox;
use super::{axis_reach, offset, Region};

/// Axis-aligned ellipsoid around the centre block.
///
/// As with cylinders, a radius of `r` reaches `r + 0.5` blocks out. Expanding
/// or contracting is symmetric: each component changes the radius on that axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EllipsoidRegion {
    center: BlockPos,
    radius: DVec3,
}

impl EllipsoidRegion {
    pub fn new(center: BlockPos, radius: DVec3) -> Result<Self> {
        if !radius.cmpge(DVec3::ZERO).all() {
            return Err(Error::InvalidRegion(format!("ellipsoid radius must be non-negative, got {radius}")));
        }
        Self::reach(center, radius)?;
        Ok(Self { center, radius })
    }

    /// Block span on each axis
    fn reach(center: BlockPos, radius: DVec3) -> Result<BlockBox> {
        let (min_x, max_x) = axis_reach(center.x, radius.x)?;
        let (min_y, max_y) = axis_reach(center.y, radius.y)?;
        let (min_z, max_z) = axis_reach(center.z, radius.z)?;
        Ok(BlockBox {
            min: BlockPos::new(min_x, min_y, min_z),
            max: BlockPos::new(max_x, max_y, max_z),
        })
    }

    pub fn sphere(center: BlockPos, radius: f64) -> Result<Self> {
        Self::new(center, DVec3::splat(radius))
    }

    pub fn center(&self) -> BlockPos {
        self.center
    }

    pub fn radius(&self) -> DVec3 {
        self.radius
    }
}

impl Region for EllipsoidRegion {
    fn bounds(&self) -> Option<BlockBox> {
        Self::reach(self.center, self.radius).ok()
    }

    fn contains(&self, pos: BlockPos) -> bool {
        let d = (pos.as_dvec3() - self.center.as_dvec3()) / (self.radius + 0.5);
        d.length_squared() <= 1.0
    }

    fn shift(&mut self, delta: BlockPos) -> Result<()> {
        let center = offset(self.center, delta)?;
        Self::reach(center, self.radius)?;
        self.center = center;
        Ok(())
    }

    fn expand(&mut self, delta: BlockPos) -> Result<()> {
        let radius = self.radius + delta.as_dvec3().abs();
        Self::reach(self.center, radius)?;
        self.radius = radius;
        Ok(())
    }

    fn contract(&mut self, delta: BlockPos) -> Result<()> {
        let radius = self.radius - delta.as_dvec3().abs();
        if !radius.cmpge(DVec3::ZERO).all() {
            return Err(Error::InvalidRegion(format!(
                "contracting by {delta} would give the ellipsoid a negative radius"
            )));
        }
        self.radius = radius;
        Ok(())
    }
}
