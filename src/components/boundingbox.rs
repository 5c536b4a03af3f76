//! Axis-aligned bounding boxes in 3D.
//!
//! A [`BoundingBox`] is stored in a body's local space and never mutated after
//! construction. Collision checks work on the world-space box obtained with
//! [`BoundingBox::transformed`].

use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Create a box from two corners. Handles swapped corners by normalizing
    /// to proper min/max.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box centered on the origin with the given half extents.
    pub fn from_half_extents(half: Vec3) -> Self {
        Self::new(-half, half)
    }

    /// The eight corners, in no particular order.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Axis-aligned box enclosing this box after `transform` is applied to it.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        let corners = self.corners();
        let first = transform.transform_point3(corners[0]);
        let (min, max) = corners[1..]
            .iter()
            .map(|c| transform.transform_point3(*c))
            .fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Self { min, max }
    }

    /// AABB vs AABB test. Boxes that only touch count as overlapping.
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y
            || self.max.z < other.min.z
            || self.min.z > other.max.z)
    }
}
