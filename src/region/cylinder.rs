//! Vertical elliptic cylinder region

use crate::core::error::Error;
use crate::core::types::{BlockPos, DVec2, Result};
use crate::math::aabb::BlockBox;
use super::{axis_reach, offset, Region};

/// Cylinder with a vertical axis through `center`.
///
/// Radii are measured from the centre of the middle block, so a radius of
/// `r` reaches `r + 0.5` blocks out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CylinderRegion {
    center: BlockPos,
    radius: DVec2,
    min_y: i32,
    max_y: i32,
}

impl CylinderRegion {
    pub fn new(center: BlockPos, radius: DVec2, min_y: i32, max_y: i32) -> Result<Self> {
        if !(radius.x >= 0.0 && radius.y >= 0.0) {
            return Err(Error::InvalidRegion(format!("cylinder radius must be non-negative, got {radius}")));
        }
        Self::reach(center, radius)?;
        Ok(Self {
            center,
            radius,
            min_y: min_y.min(max_y),
            max_y: min_y.max(max_y),
        })
    }

    /// Circular cylinder
    pub fn circle(center: BlockPos, radius: f64, min_y: i32, max_y: i32) -> Result<Self> {
        Self::new(center, DVec2::splat(radius), min_y, max_y)
    }

    pub fn center(&self) -> BlockPos {
        self.center
    }

    pub fn radius(&self) -> DVec2 {
        self.radius
    }

    pub fn height(&self) -> i64 {
        i64::from(self.max_y) - i64::from(self.min_y) + 1
    }

    /// Horizontal block span as (min x, max x, min z, max z)
    fn reach(center: BlockPos, radius: DVec2) -> Result<(i32, i32, i32, i32)> {
        let (min_x, max_x) = axis_reach(center.x, radius.x)?;
        let (min_z, max_z) = axis_reach(center.z, radius.y)?;
        Ok((min_x, max_x, min_z, max_z))
    }

    fn shifted_y(y: i32, delta: i64) -> Result<i32> {
        i32::try_from(i64::from(y) + delta).map_err(|_| {
            Error::InvalidRegion(format!("moving y {y} by {delta} leaves the block coordinate range"))
        })
    }

    fn reject_horizontal(delta: BlockPos, op: &str) -> Result<()> {
        if delta.x != 0 || delta.z != 0 {
            return Err(Error::RegionOperation(format!("cylinders can only {op} vertically")));
        }
        Ok(())
    }
}

impl Region for CylinderRegion {
    fn bounds(&self) -> Option<BlockBox> {
        let (min_x, max_x, min_z, max_z) = Self::reach(self.center, self.radius).ok()?;
        Some(BlockBox {
            min: BlockPos::new(min_x, self.min_y, min_z),
            max: BlockPos::new(max_x, self.max_y, max_z),
        })
    }

    fn contains(&self, pos: BlockPos) -> bool {
        if pos.y < self.min_y || pos.y > self.max_y {
            return false;
        }
        let dx = (f64::from(pos.x) - f64::from(self.center.x)) / (self.radius.x + 0.5);
        let dz = (f64::from(pos.z) - f64::from(self.center.z)) / (self.radius.y + 0.5);
        dx * dx + dz * dz <= 1.0
    }

    fn shift(&mut self, delta: BlockPos) -> Result<()> {
        let center = offset(self.center, delta)?;
        Self::reach(center, self.radius)?;
        let min_y = Self::shifted_y(self.min_y, i64::from(delta.y))?;
        let max_y = Self::shifted_y(self.max_y, i64::from(delta.y))?;
        self.center = center;
        self.min_y = min_y;
        self.max_y = max_y;
        Ok(())
    }

    fn expand(&mut self, delta: BlockPos) -> Result<()> {
        Self::reject_horizontal(delta, "expand")?;
        if delta.y > 0 {
            self.max_y = Self::shifted_y(self.max_y, i64::from(delta.y))?;
        } else {
            self.min_y = Self::shifted_y(self.min_y, i64::from(delta.y))?;
        }
        Ok(())
    }

    fn contract(&mut self, delta: BlockPos) -> Result<()> {
        Self::reject_horizontal(delta, "contract")?;
        let (mut min_y, mut max_y) = (self.min_y, self.max_y);
        if delta.y > 0 {
            max_y = Self::shifted_y(max_y, -i64::from(delta.y))?;
        } else {
            min_y = Self::shifted_y(min_y, -i64::from(delta.y))?;
        }
        if min_y > max_y {
            return Err(Error::InvalidRegion(format!(
                "contracting by {} would invert the cylinder height", delta.y
            )));
        }
        self.min_y = min_y;
        self.max_y = max_y;
        Ok(())
    }
}
