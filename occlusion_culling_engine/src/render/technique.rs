/// Render techniques.
///
/// A technique runs the per-instance cull-and-draw loop for one frame.
/// One implementation exists per `RenderTechniqueKind`; the scene picks it
/// with `technique_for` at the start of every frame.

use crate::error::Result;
use crate::query::Query;
use crate::scene::AABB;
use super::frame::FrameContext;
use super::settings::{QuerySync, RenderFlags, RenderTechniqueKind};
use super::stats::FrameStats;

/// Strategy for rendering one frame
pub trait RenderTechnique: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether a frame rendered with this technique replaces the scene's
    /// rendered-models counter
    fn resets_rendered_models(&self) -> bool {
        true
    }

    fn render(&self, frame: &mut FrameContext) -> Result<FrameStats>;
}

/// Technique for `kind`
pub fn technique_for(kind: RenderTechniqueKind) -> &'static dyn RenderTechnique {
    match kind {
        RenderTechniqueKind::Default => &DefaultTechnique,
        RenderTechniqueKind::OcclusionCulling => &OcclusionTechnique,
        RenderTechniqueKind::AabbOnly => &AabbOnlyTechnique,
    }
}

// ============================================================================
// Default
// ============================================================================

/// Draws every instance that passes the frustum test (or all of them when
/// frustum culling is off), optionally with its AABB.
pub struct DefaultTechnique;

impl RenderTechnique for DefaultTechnique {
    fn name(&self) -> &'static str {
        "Default"
    }

    fn render(&self, frame: &mut FrameContext) -> Result<FrameStats> {
        let mut stats = FrameStats::default();

        for index in 0..frame.instance_count() {
            let Some(aabb) = frame.place_and_cull(index) else {
                stats.frustum_culled += 1;
                continue;
            };

            if frame.has_flag(RenderFlags::DRAW_AABBS) {
                frame.draw_aabb(&aabb)?;
            }
            frame.draw_instance(index)?;
            stats.rendered_models += 1;
        }

        Ok(stats)
    }
}

// ============================================================================
// AABB only
// ============================================================================

/// Debug view: the AABB of every frustum survivor, never the mesh.
///
/// Leaves the rendered-models counter of the previous frame untouched.
pub struct AabbOnlyTechnique;

impl RenderTechnique for AabbOnlyTechnique {
    fn name(&self) -> &'static str {
        "AabbOnly"
    }

    fn resets_rendered_models(&self) -> bool {
        false
    }

    fn render(&self, frame: &mut FrameContext) -> Result<FrameStats> {
        let mut stats = FrameStats::default();

        for index in 0..frame.instance_count() {
            match frame.place_and_cull(index) {
                Some(aabb) => frame.draw_aabb(&aabb)?,
                None => stats.frustum_culled += 1,
            }
        }

        Ok(stats)
    }
}

// ============================================================================
// Occlusion culling
// ============================================================================

/// Frustum test, then an occlusion query on the AABB proxy of each
/// survivor. The mesh is drawn only if the query saw samples pass.
///
/// With `RenderFlags::SKIP_QUERY_INSIDE_AABB` an instance whose box
/// contains the camera is drawn without a query.
///
/// `QuerySync::StopAndWait` blocks on each query before moving on;
/// `QuerySync::Pipelined` issues all queries first and resolves them in
/// issue order afterwards.
pub struct OcclusionTechnique;

/// Outcome of the query pass for one frustum survivor
enum Pending {
    /// Camera inside the box with `SKIP_QUERY_INSIDE_AABB` set, no query issued
    Inside(usize, AABB),
    Queried(usize, AABB, Query),
}

impl OcclusionTechnique {
    fn render_stop_and_wait(&self, frame: &mut FrameContext, stats: &mut FrameStats) -> Result<()> {
        for index in 0..frame.instance_count() {
            let Some(aabb) = frame.place_and_cull(index) else {
                stats.frustum_culled += 1;
                continue;
            };

            let visible = if frame.skips_query(&aabb) {
                true
            } else {
                let query = frame.issue_query(&aabb)?;
                stats.queries_issued += 1;
                query.is_visible(&mut *frame.device)?
            };

            self.resolve(frame, stats, index, &aabb, visible)?;
        }
        Ok(())
    }

    fn render_pipelined(&self, frame: &mut FrameContext, stats: &mut FrameStats) -> Result<()> {
        let mut pending = Vec::new();

        for index in 0..frame.instance_count() {
            let Some(aabb) = frame.place_and_cull(index) else {
                stats.frustum_culled += 1;
                continue;
            };

            if frame.skips_query(&aabb) {
                pending.push(Pending::Inside(index, aabb));
            } else {
                let query = frame.issue_query(&aabb)?;
                stats.queries_issued += 1;
                pending.push(Pending::Queried(index, aabb, query));
            }
        }

        for entry in pending {
            let (index, aabb, visible) = match entry {
                Pending::Inside(index, aabb) => (index, aabb, true),
                Pending::Queried(index, aabb, query) => {
                    if !query.result_is_ready(&mut *frame.device)? {
                        stats.stalled_reads += 1;
                    }
                    (index, aabb, query.is_visible(&mut *frame.device)?)
                }
            };
            self.resolve(frame, stats, index, &aabb, visible)?;
        }
        Ok(())
    }

    /// Draw or skip one instance once its visibility is known
    fn resolve(
        &self,
        frame: &mut FrameContext,
        stats: &mut FrameStats,
        index: usize,
        aabb: &AABB,
        visible: bool,
    ) -> Result<()> {
        if visible {
            if frame.has_flag(RenderFlags::DRAW_AABBS) {
                frame.draw_aabb(aabb)?;
            }
            frame.draw_instance(index)?;
            stats.rendered_models += 1;
        } else {
            stats.occluded += 1;
            if frame.has_flag(RenderFlags::DRAW_OCCLUDED_AABBS) {
                frame.draw_occluded_aabb(aabb)?;
            }
        }
        Ok(())
    }
}

impl RenderTechnique for OcclusionTechnique {
    fn name(&self) -> &'static str {
        "OcclusionCulling"
    }

    fn render(&self, frame: &mut FrameContext) -> Result<FrameStats> {
        let mut stats = FrameStats::default();
        frame.query_pool.clear();

        match frame.settings.query_sync {
            QuerySync::StopAndWait => self.render_stop_and_wait(frame, &mut stats)?,
            QuerySync::Pipelined => self.render_pipelined(frame, &mut stats)?,
        }

        Ok(stats)
    }
}

#[cfg(test)]
#[path = "technique_tests.rs"]
mod tests;
