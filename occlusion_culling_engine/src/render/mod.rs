//! Render module
//!
//! Per-frame settings, statistics and the render techniques that run the
//! cull-and-draw loop.

mod settings;
mod stats;
mod frame;
mod technique;
pub mod debug_draw;

pub use settings::{FrameSettings, QuerySync, RenderFlags, RenderTechniqueKind};
pub use stats::FrameStats;
pub use frame::FrameContext;
pub use technique::{
    technique_for, RenderTechnique,
    AabbOnlyTechnique, DefaultTechnique, OcclusionTechnique,
};
