//! Convex polyhedron region built from a growable point list

use std::collections::HashSet;

use crate::core::error::Error;
use crate::core::types::{BlockPos, Result};
use crate::math::aabb::BlockBox;
use crate::math::plane::Plane;
use super::{offset, Region};

/// Collects vertices before the polyhedron is closed
#[derive(Clone, Debug, Default)]
pub struct PolyhedronBuilder {
    points: Vec<BlockPos>,
    max_points: Option<usize>,
}

impl PolyhedronBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder refusing more than `max_points` vertices (`None` = unlimited)
    pub fn with_limit(max_points: Option<usize>) -> Self {
        Self {
            points: Vec::new(),
            max_points,
        }
    }

    /// Add a vertex. Returns `Ok(false)` for a duplicate.
    pub fn add_point(&mut self, point: BlockPos) -> Result<bool> {
        if self.points.contains(&point) {
            return Ok(false);
        }
        if let Some(max) = self.max_points {
            if self.points.len() >= max {
                return Err(Error::LimitExceeded {
                    what: "polyhedron points",
                    value: self.points.len() as i64 + 1,
                    max: max as i64,
                });
            }
        }
        self.points.push(point);
        Ok(true)
    }

    pub fn points(&self) -> &[BlockPos] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Close the shape
    pub fn build(&self) -> ConvexPolyhedron {
        ConvexPolyhedron::from_points(self.points.clone())
    }
}

/// Convex hull of a set of block positions, boundary inclusive.
///
/// Fewer than four points, or points that are all coplanar, make a
/// degenerate polyhedron that contains nothing.
#[derive(Clone, Debug)]
pub struct ConvexPolyhedron {
    points: Vec<BlockPos>,
    /// Hull faces, oriented so that inside is `side <= 0`
    planes: Vec<Plane>,
    bounds: Option<BlockBox>,
}

impl ConvexPolyhedron {
    pub fn from_points(points: Vec<BlockPos>) -> Self {
        let planes = hull_planes(&points);
        let bounds = if planes.is_empty() {
            None
        } else {
            let mut bounds = BlockBox::point(points[0]);
            for p in &points[1..] {
                bounds.include(*p);
            }
            Some(bounds)
        };
        Self { points, planes, bounds }
    }

    pub fn vertices(&self) -> &[BlockPos] {
        &self.points
    }

    /// Number of distinct hull faces
    pub fn face_count(&self) -> usize {
        self.planes.len()
    }
}

/// Supporting planes through every non-collinear vertex triple.
/// Empty when the points do not span a volume.
fn hull_planes(points: &[BlockPos]) -> Vec<Plane> {
    if points.len() < 4 {
        return Vec::new();
    }

    let mut planes = HashSet::new();
    let mut spans_volume = false;
    let n = points.len();
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                let Some(plane) = Plane::through(points[i], points[j], points[k]) else {
                    continue;
                };
                let (mut above, mut below) = (false, false);
                for p in points {
                    let side = plane.side(*p);
                    above |= side > 0;
                    below |= side < 0;
                }
                spans_volume |= above || below;
                match (above, below) {
                    (false, true) => {
                        planes.insert(plane.reduced());
                    }
                    (true, false) => {
                        planes.insert(plane.flipped().reduced());
                    }
                    _ => {}
                }
            }
        }
    }

    if !spans_volume {
        return Vec::new();
    }
    planes.into_iter().collect()
}

impl Region for ConvexPolyhedron {
    fn bounds(&self) -> Option<BlockBox> {
        self.bounds
    }

    fn contains(&self, pos: BlockPos) -> bool {
        !self.planes.is_empty() && self.planes.iter().all(|plane| plane.side(pos) <= 0)
    }

    fn shift(&mut self, delta: BlockPos) -> Result<()> {
        let points = self
            .points
            .iter()
            .map(|p| offset(*p, delta))
            .collect::<Result<Vec<_>>>()?;
        *self = Self::from_points(points);
        Ok(())
    }

    fn expand(&mut self, _delta: BlockPos) -> Result<()> {
        Err(Error::RegionOperation("polyhedra cannot be expanded".to_string()))
    }

    fn contract(&mut self, _delta: BlockPos) -> Result<()> {
        Err(Error::RegionOperation("polyhedra cannot be contracted".to_string()))
    }
}
