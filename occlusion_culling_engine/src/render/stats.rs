/// Counters gathered while rendering one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameStats {
    /// Meshes drawn
    pub rendered_models: usize,
    /// Instances rejected by the frustum test
    pub frustum_culled: usize,
    /// Occlusion queries issued
    pub queries_issued: usize,
    /// Instances rejected by an occlusion query
    pub occluded: usize,
    /// Query reads that found the result not yet available
    pub stalled_reads: usize,
}
