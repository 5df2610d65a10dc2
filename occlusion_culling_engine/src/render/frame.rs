/// FrameContext - everything a technique touches while rendering one frame.
///
/// Built by `Scene::render` with the device already locked. The helpers
/// implement the per-instance steps shared by all techniques: placing the
/// mesh bounds, the frustum test, the mesh draw, the debug boxes and the
/// query proxy.

use glam::Vec3;
use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, InstanceConstants, WriteMask};
use crate::query::{Query, QueryPool};
use crate::scene::{AABB, InstanceSet, Renderable};
use super::debug_draw;
use super::settings::{FrameSettings, RenderFlags};

pub struct FrameContext<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub mesh: &'a dyn Renderable,
    pub camera: &'a Camera,
    pub instances: &'a InstanceSet,
    pub query_pool: &'a mut QueryPool,
    pub settings: &'a FrameSettings,
    mesh_bounds: AABB,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        device: &'a mut dyn GraphicsDevice,
        mesh: &'a dyn Renderable,
        camera: &'a Camera,
        instances: &'a InstanceSet,
        query_pool: &'a mut QueryPool,
        settings: &'a FrameSettings,
    ) -> Self {
        let mesh_bounds = mesh.bounding_box();
        Self {
            device,
            mesh,
            camera,
            instances,
            query_pool,
            settings,
            mesh_bounds,
        }
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn has_flag(&self, flag: RenderFlags) -> bool {
        self.settings.flags.contains(flag)
    }

    /// World bounds of instance `index`, or `None` if the frustum test
    /// (when enabled) rejects it.
    pub fn place_and_cull(&self, index: usize) -> Option<AABB> {
        let aabb = self.instances.world_aabb(index, &self.mesh_bounds)?;
        if self.settings.frustum_culling() && !self.camera.frustum().intersects_aabb(&aabb) {
            return None;
        }
        Some(aabb)
    }

    /// Bind the selected shading, push the instance constants and draw the mesh
    pub fn draw_instance(&mut self, index: usize) -> Result<()> {
        let model = self.instances.model_matrix(index).ok_or_else(|| unknown_instance(index))?;
        let color = self.instances.color(index).ok_or_else(|| unknown_instance(index))?.extend(1.0);
        let constants = InstanceConstants::new(
            model,
            self.camera.view_matrix(),
            self.camera.projection_matrix(),
            color,
        );

        self.device.bind_shading(self.settings.shading)?;
        self.device.push_constants(bytemuck::bytes_of(&constants))?;
        self.mesh.render(&mut *self.device)
    }

    pub fn draw_aabb(&mut self, aabb: &AABB) -> Result<()> {
        debug_draw::draw_aabb(&mut *self.device, self.camera, aabb)
    }

    pub fn draw_occluded_aabb(&mut self, aabb: &AABB) -> Result<()> {
        debug_draw::draw_occluded_aabb(&mut *self.device, self.camera, aabb)
    }

    /// Whether the camera sits inside `aabb`, where a proxy draw would
    /// only show back faces and report nothing
    pub fn camera_inside(&self, aabb: &AABB) -> bool {
        aabb.contains_point(self.camera.position())
    }

    /// Whether the occlusion query for `aabb` is skipped and the instance
    /// treated as visible
    pub fn skips_query(&self, aabb: &AABB) -> bool {
        self.has_flag(RenderFlags::SKIP_QUERY_INSIDE_AABB) && self.camera_inside(aabb)
    }

    /// Take the next query and run the proxy draw for `aabb` under it.
    ///
    /// The proxy is the filled box drawn with color and depth writes
    /// disabled. Once the query has begun it is always ended and the write
    /// mask always restored, and the first error is returned.
    pub fn issue_query(&mut self, aabb: &AABB) -> Result<Query> {
        let query = self.query_pool.get_query()?;

        debug_draw::push_box_constants(
            &mut *self.device,
            self.camera,
            aabb,
            Vec3::ONE,
            debug_draw::VISIBLE_AABB_COLOR,
        )?;
        self.device.set_write_mask(WriteMask::empty())?;
        let proxy = match query.begin(&mut *self.device) {
            Ok(()) => {
                let drawn = self.device.draw_unit_cube();
                let ended = query.end(&mut *self.device);
                drawn.and(ended)
            }
            Err(e) => Err(e),
        };
        // Query closed and writes back on even when the proxy draw failed
        let restored = self.device.set_write_mask(WriteMask::all());
        proxy.and(restored)?;

        Ok(query)
    }
}

fn unknown_instance(index: usize) -> Error {
    Error::InvalidArgument(format!("no instance at index {}", index))
}
