/// Axis-aligned bounding boxes.
///
/// A mesh exposes one local-space AABB. The render loop places it in
/// world space once per instance by translating it with the instance
/// position, producing a fresh value each time (AABB is `Copy`).

use glam::Vec3;
use crate::error::{Error, Result};

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Create a box from its two corners (stored as given, not reordered).
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing all `points`.
    ///
    /// # Errors
    ///
    /// `InvalidResource` if `points` is empty.
    pub fn from_points(points: &[Vec3]) -> Result<Self> {
        let (first, rest) = points.split_first().ok_or_else(|| {
            Error::InvalidResource("cannot bound an empty point set".to_string())
        })?;

        let mut aabb = AABB { min: *first, max: *first };
        for p in rest {
            aabb.min = aabb.min.min(*p);
            aabb.max = aabb.max.max(*p);
        }
        Ok(aabb)
    }

    /// Shift both corners by `offset` in place.
    pub fn translate(&mut self, offset: Vec3) {
        self.min += offset;
        self.max += offset;
    }

    /// Undo a previous `translate(offset)`.
    ///
    /// Bit exact whenever `corner + offset` is representable in f32.
    /// Large offsets against small corners round; `translated` never
    /// needs the undo.
    pub fn untranslate(&mut self, offset: Vec3) {
        self.min -= offset;
        self.max -= offset;
    }

    /// Copy of this box shifted by `offset`.
    pub fn translated(&self, offset: Vec3) -> AABB {
        let mut placed = *self;
        placed.translate(offset);
        placed
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corners, bit i of the index selecting max on axis i.
    pub fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
        }
        corners
    }

    /// Whether `point` lies inside or on the boundary.
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// True when min > max on some axis or a component is NaN.
    ///
    /// Degenerate boxes are culled by `Frustum::intersects_aabb`.
    pub fn is_degenerate(&self) -> bool {
        self.min.is_nan() || self.max.is_nan() || self.min.cmpgt(self.max).any()
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
