//! Exact integer half-space planes

use crate::core::types::BlockPos;

/// Plane `normal . p = offset` with an unnormalized integer normal.
///
/// A point is on the inner side when `normal . p - offset <= 0`. Arithmetic is
/// done in 128 bits so world-scale coordinates cannot overflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Plane {
    pub normal: [i128; 3],
    pub offset: i128,
}

fn widen(p: BlockPos) -> [i128; 3] {
    [p.x as i128, p.y as i128, p.z as i128]
}

fn sub(a: [i128; 3], b: [i128; 3]) -> [i128; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [i128; 3], b: [i128; 3]) -> [i128; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [i128; 3], b: [i128; 3]) -> i128 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn gcd(a: i128, b: i128) -> i128 {
    if b == 0 { a.abs() } else { gcd(b, a % b) }
}

impl Plane {
    /// Plane through three points; `None` if they are collinear
    pub fn through(a: BlockPos, b: BlockPos, c: BlockPos) -> Option<Self> {
        let (a, b, c) = (widen(a), widen(b), widen(c));
        let normal = cross(sub(b, a), sub(c, a));
        if normal == [0, 0, 0] {
            return None;
        }
        Some(Self {
            normal,
            offset: dot(normal, a),
        })
    }

    /// Signed (scaled) distance from point to plane; positive = outside
    pub fn side(&self, p: BlockPos) -> i128 {
        dot(self.normal, widen(p)) - self.offset
    }

    /// Same plane facing the other way
    pub fn flipped(&self) -> Self {
        Self {
            normal: [-self.normal[0], -self.normal[1], -self.normal[2]],
            offset: -self.offset,
        }
    }

    /// Divide out the common factor so equal planes compare equal
    pub fn reduced(&self) -> Self {
        let g = gcd(gcd(gcd(self.normal[0], self.normal[1]), self.normal[2]), self.offset);
        if g <= 1 {
            return *self;
        }
        Self {
            normal: [self.normal[0] / g, self.normal[1] / g, self.normal[2] / g],
            offset: self.offset / g,
        }
    }
}
