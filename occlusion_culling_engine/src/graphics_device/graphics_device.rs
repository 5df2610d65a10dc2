/// GraphicsDevice trait - the GPU surface the culling core draws through
///
/// The core never talks to a graphics API directly. Everything it needs
/// (state toggles, mesh and proxy draws, occlusion queries) goes through
/// this trait, so a backend or a recording mock can be plugged in.

use glam::{Mat4, Vec4};
use bytemuck::{Pod, Zeroable};
use crate::error::Result;

/// Opaque hardware occlusion query object id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryHandle(pub u32);

/// Opaque id of a mesh uploaded to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

bitflags::bitflags! {
    /// Framebuffer channels written by subsequent draws
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct WriteMask: u32 {
        /// Color attachment writes
        const COLOR = 1 << 0;
        /// Depth attachment writes
        const DEPTH = 1 << 1;
    }
}

impl Default for WriteMask {
    fn default() -> Self {
        WriteMask::all()
    }
}

/// Rasterizer polygon mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

/// Lighting model used for mesh draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadingModel {
    /// Per-fragment lighting
    #[default]
    Phong,
    /// Per-vertex lighting
    Gouraud,
}

/// Per-draw constants pushed before every mesh or wireframe draw
///
/// Layout (208 bytes): MVP at offset 0, model at 64, normal matrix at 128,
/// RGBA color at 192.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceConstants {
    pub model_view_projection: Mat4,
    pub model: Mat4,
    pub normal_matrix: Mat4,
    pub color: Vec4,
}

impl InstanceConstants {
    /// Build constants for a model matrix seen through `view` and `projection`.
    ///
    /// The normal matrix is the inverse transpose of model-view.
    pub fn new(model: Mat4, view: &Mat4, projection: &Mat4, color: Vec4) -> Self {
        let model_view = *view * model;
        Self {
            model_view_projection: *projection * model_view,
            model,
            normal_matrix: model_view.inverse().transpose(),
            color,
        }
    }
}

/// Device used by the scene and the render techniques
///
/// Calls are recorded in order. A query is opened by `begin_query`, closed
/// by `end_query`, and every draw in between contributes samples to it.
/// At most one query may be open at a time.
pub trait GraphicsDevice: Send + Sync {
    /// Enable or disable color/depth writes for subsequent draws
    fn set_write_mask(&mut self, mask: WriteMask) -> Result<()>;

    /// Switch between filled and wireframe rasterization
    fn set_polygon_mode(&mut self, mode: PolygonMode) -> Result<()>;

    /// Bind the shader program for a lighting model
    fn bind_shading(&mut self, shading: ShadingModel) -> Result<()>;

    /// Upload per-draw constants (normally a `bytemuck::bytes_of(&InstanceConstants)`)
    fn push_constants(&mut self, data: &[u8]) -> Result<()>;

    /// Draw a previously uploaded mesh with the current constants
    fn draw_mesh(&mut self, mesh: MeshId) -> Result<()>;

    /// Draw the unit cube `[-0.5, 0.5]^3` with the current constants
    fn draw_unit_cube(&mut self) -> Result<()>;

    // ===== OCCLUSION QUERIES =====

    /// Allocate `count` query objects
    ///
    /// # Errors
    ///
    /// `OutOfMemory` if the device cannot hold that many more queries.
    fn create_queries(&mut self, count: usize) -> Result<Vec<QueryHandle>>;

    /// Release query objects. Unknown handles are ignored.
    fn destroy_queries(&mut self, handles: &[QueryHandle]);

    /// Open the sample region of `handle`
    fn begin_query(&mut self, handle: QueryHandle) -> Result<()>;

    /// Close the sample region of `handle`
    fn end_query(&mut self, handle: QueryHandle) -> Result<()>;

    /// Non-blocking check whether the result of `handle` can be read
    fn query_result_available(&mut self, handle: QueryHandle) -> Result<bool>;

    /// Whether any sample passed inside the region of `handle`
    ///
    /// Blocks until the result is available.
    fn query_any_samples_passed(&mut self, handle: QueryHandle) -> Result<bool>;
}
