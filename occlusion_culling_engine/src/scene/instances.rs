/// Instances - positioned, colored copies of the scene mesh.
///
/// Stored as parallel arrays indexed by instance number. The arrays are
/// filled once and never resized, so index `i` refers to the same
/// position, rotation and color for the lifetime of the set.

use glam::{Mat4, Vec3};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use crate::error::{Error, Result};
use super::aabb::AABB;

/// Box from which random instance positions are drawn (bounds inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnVolume {
    pub min: Vec3,
    pub max: Vec3,
}

impl SpawnVolume {
    /// # Errors
    ///
    /// `InvalidArgument` if `min > max` on any axis, a bound is not finite,
    /// or the extent `max - min` overflows.
    pub fn new(min: Vec3, max: Vec3) -> Result<Self> {
        let volume = Self { min, max };
        volume.validate()?;
        Ok(volume)
    }

    fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min.cmpgt(self.max).any() {
            return Err(Error::InvalidArgument(format!(
                "spawn volume must satisfy min <= max, got {:?}..{:?}",
                self.min, self.max
            )));
        }
        if !(self.max - self.min).is_finite() {
            return Err(Error::InvalidArgument(format!(
                "spawn volume extent overflows, got {:?}..{:?}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for SpawnVolume {
    /// A flat strip in front of the default camera
    fn default() -> Self {
        Self {
            min: Vec3::new(-4.0, 0.0, -2.0),
            max: Vec3::new(4.0, 0.0, 8.0),
        }
    }
}

/// Per-instance data in parallel arrays
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSet {
    positions: Vec<Vec3>,
    rotation_axes: Vec<Vec3>,
    rotation_angles: Vec<f32>,
    colors: Vec<Vec3>,
}

impl InstanceSet {
    /// Generate `count` instances inside `volume`.
    ///
    /// Same seed, same instances. Rotation axis components and colors are
    /// drawn from [0, 1], rotation angles from [0, 360) degrees.
    pub fn random(count: usize, volume: &SpawnVolume, seed: u64) -> Result<Self> {
        volume.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut set = Self::with_capacity(count);
        for _ in 0..count {
            set.positions.push(Vec3::new(
                rng.gen_range(volume.min.x..=volume.max.x),
                rng.gen_range(volume.min.y..=volume.max.y),
                rng.gen_range(volume.min.z..=volume.max.z),
            ));
            set.rotation_axes.push(Vec3::new(
                rng.gen_range(0.0..=1.0),
                rng.gen_range(0.0..=1.0),
                rng.gen_range(0.0..=1.0),
            ));
            set.rotation_angles.push(rng.gen_range(0.0..360.0));
            set.colors.push(Vec3::new(
                rng.gen_range(0.0..=1.0),
                rng.gen_range(0.0..=1.0),
                rng.gen_range(0.0..=1.0),
            ));
        }
        Ok(set)
    }

    /// Instances at fixed positions, white, without rotation
    pub fn from_positions(positions: &[Vec3]) -> Self {
        let count = positions.len();
        Self {
            positions: positions.to_vec(),
            rotation_axes: vec![Vec3::Y; count],
            rotation_angles: vec![0.0; count],
            colors: vec![Vec3::ONE; count],
        }
    }

    fn with_capacity(count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(count),
            rotation_axes: Vec::with_capacity(count),
            rotation_angles: Vec::with_capacity(count),
            colors: Vec::with_capacity(count),
        }
    }

    // ===== GETTERS =====

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).copied()
    }

    pub fn rotation_axis(&self, index: usize) -> Option<Vec3> {
        self.rotation_axes.get(index).copied()
    }

    /// Rotation angle in degrees
    pub fn rotation_angle(&self, index: usize) -> Option<f32> {
        self.rotation_angles.get(index).copied()
    }

    pub fn color(&self, index: usize) -> Option<Vec3> {
        self.colors.get(index).copied()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    // ===== PLACEMENT =====

    /// World matrix of instance `index`.
    ///
    /// Instances are placed by translation only; the stored rotation is
    /// carried for shading variety and does not move the bounds.
    pub fn model_matrix(&self, index: usize) -> Option<Mat4> {
        self.position(index).map(Mat4::from_translation)
    }

    /// Mesh bounds moved to instance `index`
    pub fn world_aabb(&self, index: usize, mesh_bounds: &AABB) -> Option<AABB> {
        self.position(index).map(|p| mesh_bounds.translated(p))
    }
}

#[cfg(test)]
#[path = "instances_tests.rs"]
mod tests;
