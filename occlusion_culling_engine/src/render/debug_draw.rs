/// Debug wireframes for bounding boxes.
///
/// Boxes are drawn with the device's unit cube (`[-0.5, 0.5]^3`) scaled to
/// the box size and moved to its center. Wireframes switch the polygon
/// mode to lines and restore fill afterwards.

use glam::{Mat4, Quat, Vec3, Vec4};
use crate::camera::Camera;
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, InstanceConstants, PolygonMode};
use crate::scene::AABB;

/// Color of the box around a drawn instance
pub const VISIBLE_AABB_COLOR: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);

/// Color of the marker left where a query rejected an instance
pub const OCCLUDED_AABB_COLOR: Vec4 = Vec4::new(0.8, 0.8, 0.0, 1.0);

/// Vertical stretch of the occluded marker (cosmetic)
pub const OCCLUDED_AABB_Y_STRETCH: f32 = 7.0;

/// Model matrix mapping the unit cube onto `aabb`, scaled by `stretch`
pub fn box_transform(aabb: &AABB, stretch: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(aabb.size() * stretch, Quat::IDENTITY, aabb.center())
}

/// Push the constants for the unit cube mapped onto `aabb`
pub(crate) fn push_box_constants(
    device: &mut dyn GraphicsDevice,
    camera: &Camera,
    aabb: &AABB,
    stretch: Vec3,
    color: Vec4,
) -> Result<()> {
    let constants = InstanceConstants::new(
        box_transform(aabb, stretch),
        camera.view_matrix(),
        camera.projection_matrix(),
        color,
    );
    device.push_constants(bytemuck::bytes_of(&constants))
}

fn draw_wireframe(
    device: &mut dyn GraphicsDevice,
    camera: &Camera,
    aabb: &AABB,
    stretch: Vec3,
    color: Vec4,
) -> Result<()> {
    device.set_polygon_mode(PolygonMode::Line)?;
    push_box_constants(device, camera, aabb, stretch, color)?;
    device.draw_unit_cube()?;
    device.set_polygon_mode(PolygonMode::Fill)
}

/// Green wireframe around a drawn instance
pub fn draw_aabb(device: &mut dyn GraphicsDevice, camera: &Camera, aabb: &AABB) -> Result<()> {
    draw_wireframe(device, camera, aabb, Vec3::ONE, VISIBLE_AABB_COLOR)
}

/// Yellow, vertically stretched wireframe where an instance was occluded
pub fn draw_occluded_aabb(device: &mut dyn GraphicsDevice, camera: &Camera, aabb: &AABB) -> Result<()> {
    let stretch = Vec3::new(1.0, OCCLUDED_AABB_Y_STRETCH, 1.0);
    draw_wireframe(device, camera, aabb, stretch, OCCLUDED_AABB_COLOR)
}
