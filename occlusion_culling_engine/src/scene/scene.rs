/// Scene - a mesh, its instances, the camera and the query pool.
///
/// The scene is rendered once per frame with an explicit `FrameSettings`
/// snapshot. It locks the graphics device for the duration of the frame
/// and delegates the cull-and-draw loop to the selected technique.

use std::sync::{Arc, Mutex};
use crate::camera::{Camera, CameraConfig};
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use crate::query::QueryPool;
use crate::render::{technique_for, FrameContext, FrameSettings, FrameStats};
use crate::{engine_err, engine_info, engine_trace, engine_warn};
use super::instances::{InstanceSet, SpawnVolume};
use super::mesh::Renderable;

const SOURCE: &str = "occlusion::Scene";

/// Scene construction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    /// Number of mesh copies
    pub instance_count: usize,
    /// Where instance positions are drawn from
    pub spawn: SpawnVolume,
    /// Seed of the instance generator
    pub seed: u64,
    pub camera: CameraConfig,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            instance_count: 252,
            spawn: SpawnVolume::default(),
            seed: 0x5EED,
            camera: CameraConfig::default(),
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

pub struct Scene {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    mesh: Arc<dyn Renderable>,
    camera: Camera,
    instances: InstanceSet,
    /// One query per instance, alive as long as the scene
    query_pool: QueryPool,
    /// Meshes drawn by the last technique that counts them
    rendered_models: usize,
    last_frame_stats: FrameStats,
    frame_index: u64,
}

impl Scene {
    /// Build a scene with randomly placed instances.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad camera or spawn volume, or the device
    /// error raised while allocating the query pool.
    pub fn new(
        device: Arc<Mutex<dyn GraphicsDevice>>,
        mesh: Arc<dyn Renderable>,
        config: SceneConfig,
    ) -> Result<Self> {
        let camera = Camera::new(config.camera, config.viewport_width, config.viewport_height)?;
        let instances = InstanceSet::random(config.instance_count, &config.spawn, config.seed)?;
        Self::with_instances(device, mesh, camera, instances)
    }

    /// Build a scene from an existing camera and instance set.
    pub fn with_instances(
        device: Arc<Mutex<dyn GraphicsDevice>>,
        mesh: Arc<dyn Renderable>,
        camera: Camera,
        instances: InstanceSet,
    ) -> Result<Self> {
        let bounds = mesh.bounding_box();
        if bounds.is_degenerate() {
            engine_warn!(SOURCE, "Mesh bounds {:?}..{:?} are degenerate, every instance will be culled",
                bounds.min, bounds.max);
        }

        let query_pool = QueryPool::new(Arc::clone(&device), instances.len())?;

        engine_info!(SOURCE, "Scene created with {} instances", instances.len());

        Ok(Self {
            device,
            mesh,
            camera,
            instances,
            query_pool,
            rendered_models: 0,
            last_frame_stats: FrameStats::default(),
            frame_index: 0,
        })
    }

    /// Render one frame.
    ///
    /// # Errors
    ///
    /// `BackendError` if the device lock is poisoned, otherwise whatever
    /// the device reports. Counters are only updated for completed frames.
    pub fn render(&mut self, settings: &FrameSettings) -> Result<FrameStats> {
        let technique = technique_for(settings.technique);
        engine_trace!(SOURCE, "Frame {} uses the {} technique", self.frame_index, technique.name());

        let device = Arc::clone(&self.device);
        let mut guard = device.lock()
            .map_err(|_| engine_err!(SOURCE, "Device lock poisoned at frame {}", self.frame_index))?;

        let mut frame = FrameContext::new(
            &mut *guard,
            self.mesh.as_ref(),
            &self.camera,
            &self.instances,
            &mut self.query_pool,
            settings,
        );
        let stats = technique.render(&mut frame)?;

        if technique.resets_rendered_models() {
            self.rendered_models = stats.rendered_models;
        }
        self.last_frame_stats = stats;
        self.frame_index += 1;

        engine_trace!(SOURCE,
            "Frame done: {} drawn, {} frustum culled, {} queries, {} occluded, {} stalled reads",
            stats.rendered_models, stats.frustum_culled, stats.queries_issued,
            stats.occluded, stats.stalled_reads);

        Ok(stats)
    }

    // ===== GETTERS =====

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera for navigation; every mutation refreshes its frustum
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn instances(&self) -> &InstanceSet {
        &self.instances
    }

    pub fn mesh(&self) -> &Arc<dyn Renderable> {
        &self.mesh
    }

    pub fn query_pool(&self) -> &QueryPool {
        &self.query_pool
    }

    pub fn total_models(&self) -> usize {
        self.instances.len()
    }

    pub fn rendered_models(&self) -> usize {
        self.rendered_models
    }

    pub fn last_frame_stats(&self) -> &FrameStats {
        &self.last_frame_stats
    }

    /// Number of frames rendered so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
