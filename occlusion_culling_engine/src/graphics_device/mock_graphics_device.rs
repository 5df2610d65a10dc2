/// Mock GraphicsDevice (no GPU required)
///
/// Records every call as a `MockCommand` and emulates occlusion queries:
/// a query passes if any draw issued while it is open lands on a visible
/// spot, as decided by a user supplied visibility oracle evaluated on the
/// translation of the last pushed model matrix. Result latency can be
/// configured to exercise the non-blocking path.

use std::fmt;
use glam::Vec3;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::engine_bail;
use crate::engine_warn;
use super::graphics_device::{
    GraphicsDevice, InstanceConstants, MeshId, PolygonMode, QueryHandle,
    ShadingModel, WriteMask,
};

const SOURCE: &str = "occlusion::MockGraphicsDevice";

/// Decides whether geometry centered at a world position would pass the depth test
pub type VisibilityOracle = Box<dyn Fn(Vec3) -> bool + Send + Sync>;

// ============================================================================
// Recorded commands
// ============================================================================

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum MockCommand {
    SetWriteMask(WriteMask),
    SetPolygonMode(PolygonMode),
    BindShading(ShadingModel),
    /// Decoded constants, or `None` for payloads of another size
    PushConstants(Option<InstanceConstants>),
    DrawMesh(MeshId),
    DrawUnitCube,
    BeginQuery(QueryHandle),
    EndQuery(QueryHandle),
    /// Blocking result read
    ReadQuery(QueryHandle),
}

// ============================================================================
// Query state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryPhase {
    /// Allocated, never begun
    Idle,
    /// Between begin and end
    Active,
    /// Ended, result pending or available
    Ended,
}

#[derive(Debug, Clone, Copy)]
struct MockQuery {
    phase: QueryPhase,
    samples_passed: bool,
    polls_until_ready: u32,
}

// ============================================================================
// MockGraphicsDevice
// ============================================================================

pub struct MockGraphicsDevice {
    commands: Vec<MockCommand>,
    queries: FxHashMap<QueryHandle, MockQuery>,
    next_handle: u32,
    active_query: Option<QueryHandle>,
    last_constants: Option<InstanceConstants>,
    oracle: VisibilityOracle,
    query_limit: Option<usize>,
    result_latency: u32,
    failing_cube_draws: u32,
    blocking_reads: usize,
    stalled_reads: usize,
}

impl MockGraphicsDevice {
    /// Device on which every proxy is visible and results are ready immediately
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            queries: FxHashMap::default(),
            next_handle: 1,
            active_query: None,
            last_constants: None,
            oracle: Box::new(|_| true),
            query_limit: None,
            result_latency: 0,
            failing_cube_draws: 0,
            blocking_reads: 0,
            stalled_reads: 0,
        }
    }

    /// Replace the visibility oracle
    pub fn with_oracle<F>(mut self, oracle: F) -> Self
    where
        F: Fn(Vec3) -> bool + Send + Sync + 'static,
    {
        self.oracle = Box::new(oracle);
        self
    }

    /// Cap the number of live query objects
    pub fn with_query_limit(mut self, limit: usize) -> Self {
        self.query_limit = Some(limit);
        self
    }

    /// Number of `query_result_available` polls answered `false` after each `end_query`
    pub fn with_result_latency(mut self, polls: u32) -> Self {
        self.result_latency = polls;
        self
    }

    /// Make the next `count` unit cube draws fail without recording a command
    pub fn with_failing_unit_cube_draws(mut self, count: u32) -> Self {
        self.failing_cube_draws = count;
        self
    }

    // ===== INSPECTION =====

    pub fn commands(&self) -> &[MockCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of query objects currently allocated
    pub fn live_queries(&self) -> usize {
        self.queries.len()
    }

    pub fn is_live(&self, handle: QueryHandle) -> bool {
        self.queries.contains_key(&handle)
    }

    /// Blocking reads performed so far
    pub fn blocking_reads(&self) -> usize {
        self.blocking_reads
    }

    /// Blocking reads that had to wait for a pending result
    pub fn stalled_reads(&self) -> usize {
        self.stalled_reads
    }

    pub fn mesh_draw_count(&self) -> usize {
        self.count(|c| matches!(c, MockCommand::DrawMesh(_)))
    }

    pub fn unit_cube_draw_count(&self) -> usize {
        self.count(|c| matches!(c, MockCommand::DrawUnitCube))
    }

    pub fn begun_query_count(&self) -> usize {
        self.count(|c| matches!(c, MockCommand::BeginQuery(_)))
    }

    fn count(&self, predicate: impl Fn(&MockCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }

    // ===== INTERNAL =====

    fn query_mut(&mut self, handle: QueryHandle) -> Result<&mut MockQuery> {
        match self.queries.get_mut(&handle) {
            Some(query) => Ok(query),
            None => Err(Error::InvalidResource(format!("unknown query handle {}", handle.0))),
        }
    }

    /// Feed a draw into the open query, if any
    fn sample(&mut self) {
        let Some(handle) = self.active_query else { return };
        let center = self.last_constants
            .map(|c| c.model.w_axis.truncate())
            .unwrap_or(Vec3::ZERO);
        let visible = (self.oracle)(center);
        if let Some(query) = self.queries.get_mut(&handle) {
            query.samples_passed |= visible;
        }
    }

    fn ended_query(&mut self, handle: QueryHandle) -> Result<&mut MockQuery> {
        let query = self.query_mut(handle)?;
        if query.phase != QueryPhase::Ended {
            engine_bail!(SOURCE, "Query {} read before end_query", handle.0);
        }
        Ok(query)
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockGraphicsDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockGraphicsDevice")
            .field("commands", &self.commands.len())
            .field("live_queries", &self.queries.len())
            .field("active_query", &self.active_query)
            .field("result_latency", &self.result_latency)
            .finish()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn set_write_mask(&mut self, mask: WriteMask) -> Result<()> {
        self.commands.push(MockCommand::SetWriteMask(mask));
        Ok(())
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) -> Result<()> {
        self.commands.push(MockCommand::SetPolygonMode(mode));
        Ok(())
    }

    fn bind_shading(&mut self, shading: ShadingModel) -> Result<()> {
        self.commands.push(MockCommand::BindShading(shading));
        Ok(())
    }

    fn push_constants(&mut self, data: &[u8]) -> Result<()> {
        let decoded = (data.len() == std::mem::size_of::<InstanceConstants>())
            .then(|| bytemuck::pod_read_unaligned::<InstanceConstants>(data));
        if decoded.is_some() {
            self.last_constants = decoded;
        }
        self.commands.push(MockCommand::PushConstants(decoded));
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: MeshId) -> Result<()> {
        self.commands.push(MockCommand::DrawMesh(mesh));
        self.sample();
        Ok(())
    }

    fn draw_unit_cube(&mut self) -> Result<()> {
        if self.failing_cube_draws > 0 {
            self.failing_cube_draws -= 1;
            engine_bail!(SOURCE, "Unit cube draw failed");
        }
        self.commands.push(MockCommand::DrawUnitCube);
        self.sample();
        Ok(())
    }

    fn create_queries(&mut self, count: usize) -> Result<Vec<QueryHandle>> {
        if let Some(limit) = self.query_limit {
            if self.queries.len() + count > limit {
                return Err(Error::OutOfMemory);
            }
        }

        let mut handles = Vec::with_capacity(count);
        for _ in 0..count {
            let handle = QueryHandle(self.next_handle);
            self.next_handle += 1;
            self.queries.insert(handle, MockQuery {
                phase: QueryPhase::Idle,
                samples_passed: false,
                polls_until_ready: 0,
            });
            handles.push(handle);
        }
        Ok(handles)
    }

    fn destroy_queries(&mut self, handles: &[QueryHandle]) {
        for handle in handles {
            if self.queries.remove(handle).is_none() {
                engine_warn!(SOURCE, "Destroying unknown query {}", handle.0);
            }
            if self.active_query == Some(*handle) {
                self.active_query = None;
            }
        }
    }

    fn begin_query(&mut self, handle: QueryHandle) -> Result<()> {
        if let Some(active) = self.active_query {
            engine_bail!(SOURCE, "Query {} begun while query {} is active", handle.0, active.0);
        }
        let query = self.query_mut(handle)?;
        query.phase = QueryPhase::Active;
        query.samples_passed = false;
        self.active_query = Some(handle);
        self.commands.push(MockCommand::BeginQuery(handle));
        Ok(())
    }

    fn end_query(&mut self, handle: QueryHandle) -> Result<()> {
        if self.active_query != Some(handle) {
            engine_bail!(SOURCE, "Query {} ended without being active", handle.0);
        }
        let latency = self.result_latency;
        let query = self.query_mut(handle)?;
        query.phase = QueryPhase::Ended;
        query.polls_until_ready = latency;
        self.active_query = None;
        self.commands.push(MockCommand::EndQuery(handle));
        Ok(())
    }

    fn query_result_available(&mut self, handle: QueryHandle) -> Result<bool> {
        let query = self.ended_query(handle)?;
        if query.polls_until_ready > 0 {
            query.polls_until_ready -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    fn query_any_samples_passed(&mut self, handle: QueryHandle) -> Result<bool> {
        let query = self.ended_query(handle)?;
        let stalled = query.polls_until_ready > 0;
        query.polls_until_ready = 0;
        let passed = query.samples_passed;

        self.blocking_reads += 1;
        if stalled {
            self.stalled_reads += 1;
        }
        self.commands.push(MockCommand::ReadQuery(handle));
        Ok(passed)
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
