/// Mesh - what the culling core needs to know about drawable geometry.
///
/// The core never sees vertices or buffers. It asks a `Renderable` for its
/// local bounds and tells it to draw itself; uploading the triangles is
/// the device's business.

use glam::Vec3;
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, MeshId};
use super::aabb::AABB;

/// Geometry that can be bounded and drawn
pub trait Renderable: Send + Sync {
    /// Untransformed bounding box
    fn bounding_box(&self) -> AABB;

    /// Issue the draw call with whatever constants are currently bound
    fn render(&self, device: &mut dyn GraphicsDevice) -> Result<()>;
}

/// A triangle mesh already uploaded to the device
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    id: MeshId,
    bounding_box: AABB,
    vertex_count: usize,
}

impl Mesh {
    /// Describe the uploaded mesh `id` from its vertex positions.
    ///
    /// # Errors
    ///
    /// `InvalidResource` if `vertices` is empty.
    pub fn new(id: MeshId, vertices: &[Vec3]) -> Result<Self> {
        Ok(Self {
            id,
            bounding_box: AABB::from_points(vertices)?,
            vertex_count: vertices.len(),
        })
    }

    /// Unit cube centered on the origin (8 corners of `[-0.5, 0.5]^3`)
    pub fn unit_cube(id: MeshId) -> Self {
        Self {
            id,
            bounding_box: AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
            vertex_count: 8,
        }
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

impl Renderable for Mesh {
    fn bounding_box(&self) -> AABB {
        self.bounding_box
    }

    fn render(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        device.draw_mesh(self.id)
    }
}
