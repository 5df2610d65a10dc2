/// Per-frame render settings.
///
/// The UI layer fills a `FrameSettings` once per frame and hands it to
/// `Scene::render`. Nothing in here is read from global state.

use crate::graphics_device::ShadingModel;

/// Which render loop to run this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderTechniqueKind {
    /// Draw every instance that survives the (optional) frustum test
    #[default]
    Default,
    /// Frustum test, then a hardware occlusion query per survivor
    OcclusionCulling,
    /// Draw bounding boxes only, never the mesh
    AabbOnly,
}

bitflags::bitflags! {
    /// Per-frame toggles
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[repr(transparent)]
    pub struct RenderFlags: u32 {
        /// Reject instances whose AABB is outside the camera frustum
        const FRUSTUM_CULLING = 1 << 0;
        /// Draw the AABB wireframe of every drawn instance
        const DRAW_AABBS = 1 << 1;
        /// Draw a marker wireframe for instances rejected by a query
        const DRAW_OCCLUDED_AABBS = 1 << 2;
        /// Treat instances whose AABB contains the camera as visible
        /// without issuing a query
        const SKIP_QUERY_INSIDE_AABB = 1 << 3;
    }
}

/// How the occlusion technique waits for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuerySync {
    /// Block on each query right after issuing it (one query in flight)
    #[default]
    StopAndWait,
    /// Issue every query of the frame, then resolve them in issue order
    Pipelined,
}

/// Immutable snapshot of the UI state for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameSettings {
    pub technique: RenderTechniqueKind,
    pub flags: RenderFlags,
    pub shading: ShadingModel,
    pub query_sync: QuerySync,
}

impl FrameSettings {
    pub fn new(technique: RenderTechniqueKind, flags: RenderFlags) -> Self {
        Self {
            technique,
            flags,
            ..Self::default()
        }
    }

    pub fn with_shading(mut self, shading: ShadingModel) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_query_sync(mut self, query_sync: QuerySync) -> Self {
        self.query_sync = query_sync;
        self
    }

    pub fn frustum_culling(&self) -> bool {
        self.flags.contains(RenderFlags::FRUSTUM_CULLING)
    }
}
