/// Tests for the render techniques
///
/// Each technique runs against a recording MockGraphicsDevice, and the
/// tests check both the counters and the exact command stream.

use std::sync::{Arc, Mutex};
use glam::{Vec3, Vec4};
use crate::camera::{Camera, CameraConfig};
use crate::error::Error;
use crate::graphics_device::{
    GraphicsDevice, MeshId, MockCommand, MockGraphicsDevice, PolygonMode, ShadingModel, WriteMask,
};
use crate::query::QueryPool;
use crate::render::debug_draw::{OCCLUDED_AABB_COLOR, OCCLUDED_AABB_Y_STRETCH, VISIBLE_AABB_COLOR};
use crate::render::{FrameContext, FrameSettings, FrameStats, QuerySync, RenderFlags, RenderTechniqueKind};
use crate::scene::{InstanceSet, Mesh, Renderable, SpawnVolume};
use super::*;

// ============================================================================
// Helper Functions
// ============================================================================

struct Fixture {
    mock: Arc<Mutex<MockGraphicsDevice>>,
    pool: QueryPool,
    camera: Camera,
    instances: InstanceSet,
    mesh: Mesh,
}

impl Fixture {
    fn new(mock: MockGraphicsDevice, positions: &[Vec3]) -> Self {
        let instances = InstanceSet::from_positions(positions);
        Self::with_pool_size(mock, instances.len(), instances)
    }

    fn with_pool_size(mock: MockGraphicsDevice, capacity: usize, instances: InstanceSet) -> Self {
        let mock = Arc::new(Mutex::new(mock));
        let device: Arc<Mutex<dyn GraphicsDevice>> = mock.clone();
        let pool = QueryPool::new(device, capacity).unwrap();
        Self {
            mock,
            pool,
            camera: origin_camera(),
            instances,
            mesh: Mesh::unit_cube(MeshId(1)),
        }
    }

    fn run(&mut self, technique: &dyn RenderTechnique, settings: FrameSettings) -> crate::error::Result<FrameStats> {
        let mock = Arc::clone(&self.mock);
        let mut guard = mock.lock().unwrap();
        let mut frame = FrameContext::new(
            &mut *guard,
            &self.mesh,
            &self.camera,
            &self.instances,
            &mut self.pool,
            &settings,
        );
        technique.render(&mut frame)
    }

    fn commands(&self) -> Vec<MockCommand> {
        self.mock.lock().unwrap().commands().to_vec()
    }

    fn tags(&self) -> Vec<&'static str> {
        self.commands().iter().map(tag).collect()
    }
}

fn tag(command: &MockCommand) -> &'static str {
    match command {
        MockCommand::SetWriteMask(mask) if mask.is_empty() => "mask_off",
        MockCommand::SetWriteMask(_) => "mask_on",
        MockCommand::SetPolygonMode(PolygonMode::Line) => "line",
        MockCommand::SetPolygonMode(PolygonMode::Fill) => "fill",
        MockCommand::BindShading(_) => "shade",
        MockCommand::PushConstants(_) => "push",
        MockCommand::DrawMesh(_) => "mesh",
        MockCommand::DrawUnitCube => "cube",
        MockCommand::BeginQuery(_) => "begin",
        MockCommand::EndQuery(_) => "end",
        MockCommand::ReadQuery(_) => "read",
    }
}

/// Camera at the origin looking down -Z, far plane at 10, square viewport
fn origin_camera() -> Camera {
    let config = CameraConfig {
        position: Vec3::ZERO,
        z_far: 10.0,
        ..CameraConfig::default()
    };
    Camera::new(config, 1, 1).unwrap()
}

fn occlusion(flags: RenderFlags, sync: QuerySync) -> FrameSettings {
    FrameSettings::new(RenderTechniqueKind::OcclusionCulling, flags).with_query_sync(sync)
}

const PROXY: [&str; 6] = ["push", "mask_off", "begin", "cube", "end", "mask_on"];
const MESH: [&str; 3] = ["shade", "push", "mesh"];

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_technique_for_each_kind() {
    assert_eq!(technique_for(RenderTechniqueKind::Default).name(), "Default");
    assert_eq!(technique_for(RenderTechniqueKind::OcclusionCulling).name(), "OcclusionCulling");
    assert_eq!(technique_for(RenderTechniqueKind::AabbOnly).name(), "AabbOnly");

    assert!(DefaultTechnique.resets_rendered_models());
    assert!(OcclusionTechnique.resets_rendered_models());
    assert!(!AabbOnlyTechnique.resets_rendered_models());
}

// ============================================================================
// Default
// ============================================================================

#[test]
fn test_default_draws_mesh_with_instance_constants() {
    let mut fixture = Fixture::new(MockGraphicsDevice::new(), &[Vec3::new(1.0, 0.0, -4.0)]);
    let settings = FrameSettings::default().with_shading(ShadingModel::Gouraud);

    let stats = fixture.run(&DefaultTechnique, settings).unwrap();
    assert_eq!(stats.rendered_models, 1);

    let commands = fixture.commands();
    assert_eq!(commands[0], MockCommand::BindShading(ShadingModel::Gouraud));
    match &commands[1] {
        MockCommand::PushConstants(Some(c)) => {
            assert_eq!(c.model.w_axis.truncate(), Vec3::new(1.0, 0.0, -4.0));
            assert_eq!(c.color, Vec4::ONE);
            let expected = fixture.camera.view_projection_matrix() * c.model;
            assert!(c.model_view_projection.abs_diff_eq(expected, 1e-5));
        }
        other => panic!("expected instance constants, got {other:?}"),
    }
    assert_eq!(commands[2], MockCommand::DrawMesh(MeshId(1)));
}

#[test]
fn test_default_draws_aabb_before_mesh() {
    let mut fixture = Fixture::new(MockGraphicsDevice::new(), &[Vec3::new(0.0, 0.0, -5.0)]);
    let settings = FrameSettings::new(RenderTechniqueKind::Default, RenderFlags::DRAW_AABBS);

    fixture.run(&DefaultTechnique, settings).unwrap();

    assert_eq!(fixture.tags(), ["line", "push", "cube", "fill", "shade", "push", "mesh"]);
    match &fixture.commands()[1] {
        MockCommand::PushConstants(Some(c)) => assert_eq!(c.color, VISIBLE_AABB_COLOR),
        other => panic!("expected box constants, got {other:?}"),
    }
}

#[test]
fn test_default_counter_matches_independent_frustum_test() {
    let instances = InstanceSet::random(64, &SpawnVolume::default(), 3).unwrap();
    let mut fixture = Fixture::with_pool_size(MockGraphicsDevice::new(), 64, instances);
    fixture.camera.set_position(Vec3::new(0.0, 1.0, 9.0));

    let bounds = fixture.mesh.bounding_box();
    let expected = (0..fixture.instances.len())
        .filter(|&i| {
            let aabb = fixture.instances.world_aabb(i, &bounds).unwrap();
            fixture.camera.frustum().intersects_aabb(&aabb)
        })
        .count();

    let settings = FrameSettings::new(RenderTechniqueKind::Default, RenderFlags::FRUSTUM_CULLING);
    let stats = fixture.run(&DefaultTechnique, settings).unwrap();

    assert_eq!(stats.rendered_models, expected);
    assert_eq!(stats.frustum_culled, 64 - expected);
}

// ============================================================================
// AABB only
// ============================================================================

#[test]
fn test_aabb_only_never_draws_mesh() {
    let positions = [Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 1.0, -3.0)];
    let mut fixture = Fixture::new(MockGraphicsDevice::new(), &positions);
    let settings = FrameSettings::new(
        RenderTechniqueKind::AabbOnly,
        RenderFlags::FRUSTUM_CULLING | RenderFlags::DRAW_OCCLUDED_AABBS,
    );

    let stats = fixture.run(&AabbOnlyTechnique, settings).unwrap();

    assert_eq!(stats.rendered_models, 0);
    assert_eq!(stats.frustum_culled, 1);
    let mock = fixture.mock.lock().unwrap();
    assert_eq!(mock.mesh_draw_count(), 0);
    assert_eq!(mock.unit_cube_draw_count(), 2);
    assert_eq!(mock.begun_query_count(), 0);
}

// ============================================================================
// Occlusion: stop-and-wait
// ============================================================================

#[test]
fn test_stop_and_wait_blocks_before_next_query() {
    let positions = [Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, -6.0)];
    let mut fixture = Fixture::new(MockGraphicsDevice::new(), &positions);

    let stats = fixture.run(&OcclusionTechnique, occlusion(RenderFlags::empty(), QuerySync::StopAndWait)).unwrap();
    assert_eq!(stats.queries_issued, 2);
    assert_eq!(stats.rendered_models, 2);

    let mut expected = Vec::new();
    for _ in 0..2 {
        expected.extend(PROXY);
        expected.push("read");
        expected.extend(MESH);
    }
    assert_eq!(fixture.tags(), expected);
}

#[test]
fn test_stop_and_wait_proxy_masks_writes() {
    let mut fixture = Fixture::new(MockGraphicsDevice::new(), &[Vec3::new(0.0, 0.0, -3.0)]);
    fixture.run(&OcclusionTechnique, occlusion(RenderFlags::empty(), QuerySync::StopAndWait)).unwrap();

    let commands = fixture.commands();
    assert_eq!(commands[1], MockCommand::SetWriteMask(WriteMask::empty()));
    assert_eq!(commands[5], MockCommand::SetWriteMask(WriteMask::COLOR | WriteMask::DEPTH));
    // Proxy is drawn filled
    assert!(!commands.contains(&MockCommand::SetPolygonMode(PolygonMode::Line)));
}

#[test]
fn test_occluded_instance_draws_marker() {
    let mut fixture = Fixture::new(
        MockGraphicsDevice::new().with_oracle(|_| false),
        &[Vec3::new(0.0, 0.0, -4.0)],
    );
    let settings = occlusion(
        RenderFlags::DRAW_AABBS | RenderFlags::DRAW_OCCLUDED_AABBS,
        QuerySync::StopAndWait,
    );

    let stats = fixture.run(&OcclusionTechnique, settings).unwrap();
    assert_eq!(stats.occluded, 1);
    assert_eq!(stats.rendered_models, 0);

    let mut expected = PROXY.to_vec();
    expected.extend(["read", "line", "push", "cube", "fill"]);
    assert_eq!(fixture.tags(), expected);

    match &fixture.commands()[8] {
        MockCommand::PushConstants(Some(c)) => {
            assert_eq!(c.color, OCCLUDED_AABB_COLOR);
            assert_eq!(c.model.y_axis.y, OCCLUDED_AABB_Y_STRETCH);
            assert_eq!(c.model.x_axis.x, 1.0);
            assert_eq!(c.model.w_axis.truncate(), Vec3::new(0.0, 0.0, -4.0));
        }
        other => panic!("expected marker constants, got {other:?}"),
    }
}

#[test]
fn test_occluded_marker_needs_flag() {
    let mut fixture = Fixture::new(
        MockGraphicsDevice::new().with_oracle(|_| false),
        &[Vec3::new(0.0, 0.0, -4.0)],
    );
    fixture.run(&OcclusionTechnique, occlusion(RenderFlags::DRAW_AABBS, QuerySync::StopAndWait)).unwrap();

    let mut expected = PROXY.to_vec();
    expected.push("read");
    assert_eq!(fixture.tags(), expected);
}

#[test]
fn test_frustum_rejects_never_reach_query_stage() {
    let positions = [
        Vec3::new(0.0, 0.0, -5.0),
        Vec3::new(0.0, 0.0, 5.0),
        Vec3::new(100.0, 0.0, -5.0),
        Vec3::new(0.0, 0.0, -50.0),
    ];
    let mut fixture = Fixture::new(MockGraphicsDevice::new(), &positions);

    let stats = fixture.run(&OcclusionTechnique, occlusion(RenderFlags::FRUSTUM_CULLING, QuerySync::StopAndWait)).unwrap();

    assert_eq!(stats.frustum_culled, 3);
    assert_eq!(stats.queries_issued, 1);
    assert_eq!(fixture.mock.lock().unwrap().begun_query_count(), 1);
}

#[test]
fn test_query_count_bounded_by_frustum_survivors() {
    let instances = InstanceSet::random(128, &SpawnVolume::default(), 11).unwrap();
    let mut fixture = Fixture::with_pool_size(MockGraphicsDevice::new(), 128, instances);

    for (yaw, z) in [(0.0, 9.0), (35.0, 12.0), (-60.0, 4.0), (180.0, 20.0)] {
        fixture.camera.rotate(yaw);
        fixture.camera.set_position(Vec3::new(0.0, 0.5, z));

        for sync in [QuerySync::StopAndWait, QuerySync::Pipelined] {
            let settings = occlusion(RenderFlags::FRUSTUM_CULLING, sync);
            let stats = fixture.run(&OcclusionTechnique, settings).unwrap();
            let survivors = 128 - stats.frustum_culled;
            assert!(stats.queries_issued <= survivors);
        }
    }
}

#[test]
fn test_camera_inside_box_skips_query_when_flagged() {
    let mut fixture = Fixture::new(
        MockGraphicsDevice::new().with_oracle(|_| false),
        &[Vec3::ZERO],
    );
    let flags = RenderFlags::FRUSTUM_CULLING | RenderFlags::SKIP_QUERY_INSIDE_AABB;

    let stats = fixture.run(&OcclusionTechnique, occlusion(flags, QuerySync::StopAndWait)).unwrap();

    assert_eq!(stats.queries_issued, 0);
    assert_eq!(stats.rendered_models, 1);
    assert_eq!(fixture.tags(), MESH);
}

#[test]
fn test_camera_inside_box_still_queried_by_default() {
    let mut fixture = Fixture::new(
        MockGraphicsDevice::new().with_oracle(|_| false),
        &[Vec3::ZERO],
    );

    for sync in [QuerySync::StopAndWait, QuerySync::Pipelined] {
        let stats = fixture.run(&OcclusionTechnique, occlusion(RenderFlags::FRUSTUM_CULLING, sync)).unwrap();

        assert_eq!(stats.queries_issued, 1);
        assert_eq!(stats.occluded, 1);
        assert_eq!(stats.rendered_models, 0);
        assert_eq!(fixture.mock.lock().unwrap().mesh_draw_count(), 0);
    }
}

#[test]
fn test_failed_proxy_draw_ends_query_and_restores_mask() {
    let mut fixture = Fixture::new(
        MockGraphicsDevice::new().with_failing_unit_cube_draws(1),
        &[Vec3::new(0.0, 0.0, -3.0)],
    );
    let settings = occlusion(RenderFlags::FRUSTUM_CULLING, QuerySync::StopAndWait);

    let failed = fixture.run(&OcclusionTechnique, settings);
    assert!(matches!(failed, Err(Error::BackendError(_))));
    assert_eq!(fixture.tags(), ["push", "mask_off", "begin", "end", "mask_on"]);

    // The next frame starts from a clean device state
    for _ in 0..2 {
        let stats = fixture.run(&OcclusionTechnique, settings).unwrap();
        assert_eq!(stats.queries_issued, 1);
        assert_eq!(stats.rendered_models, 1);
    }
}

#[test]
fn test_draw_instance_out_of_range_is_error() {
    let mut fixture = Fixture::new(MockGraphicsDevice::new(), &[Vec3::new(0.0, 0.0, -3.0)]);
    let settings = FrameSettings::default();
    let mock = Arc::clone(&fixture.mock);
    let mut guard = mock.lock().unwrap();
    let mut frame = FrameContext::new(
        &mut *guard,
        &fixture.mesh,
        &fixture.camera,
        &fixture.instances,
        &mut fixture.pool,
        &settings,
    );

    assert!(matches!(frame.draw_instance(1), Err(Error::InvalidArgument(_))));
    assert!(frame.draw_instance(0).is_ok());
    drop(frame);
    assert_eq!(guard.mesh_draw_count(), 1);
}

#[test]
fn test_pool_smaller_than_survivors_is_error() {
    let instances = InstanceSet::from_positions(&[Vec3::new(0.0, 0.0, -3.0); 4]);
    let mut fixture = Fixture::with_pool_size(MockGraphicsDevice::new(), 2, instances);

    let result = fixture.run(&OcclusionTechnique, occlusion(RenderFlags::empty(), QuerySync::StopAndWait));
    assert_eq!(result, Err(Error::QueryPoolExhausted { capacity: 2 }));
}

#[test]
fn test_occlusion_rewinds_pool_each_frame() {
    let mut fixture = Fixture::new(MockGraphicsDevice::new(), &[Vec3::new(0.0, 0.0, -3.0)]);

    for _ in 0..3 {
        let stats = fixture.run(&OcclusionTechnique, occlusion(RenderFlags::empty(), QuerySync::StopAndWait)).unwrap();
        assert_eq!(stats.queries_issued, 1);
    }
    assert_eq!(fixture.pool.issued(), 1);
}

// ============================================================================
// Occlusion: pipelined
// ============================================================================

#[test]
fn test_pipelined_issues_all_queries_first() {
    let positions = [Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, -6.0), Vec3::new(1.0, 0.0, -8.0)];
    let mut fixture = Fixture::new(MockGraphicsDevice::new(), &positions);

    let stats = fixture.run(&OcclusionTechnique, occlusion(RenderFlags::empty(), QuerySync::Pipelined)).unwrap();
    assert_eq!(stats.queries_issued, 3);
    assert_eq!(stats.rendered_models, 3);
    assert_eq!(stats.stalled_reads, 0);

    let mut expected = Vec::new();
    for _ in 0..3 {
        expected.extend(PROXY);
    }
    for _ in 0..3 {
        expected.push("read");
        expected.extend(MESH);
    }
    assert_eq!(fixture.tags(), expected);
}

#[test]
fn test_pipelined_resolves_in_issue_order() {
    let positions = [Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, -6.0)];
    let mut fixture = Fixture::new(MockGraphicsDevice::new(), &positions);
    fixture.run(&OcclusionTechnique, occlusion(RenderFlags::empty(), QuerySync::Pipelined)).unwrap();

    let commands = fixture.commands();
    let begun: Vec<_> = commands.iter()
        .filter_map(|c| if let MockCommand::BeginQuery(h) = c { Some(*h) } else { None })
        .collect();
    let read: Vec<_> = commands.iter()
        .filter_map(|c| if let MockCommand::ReadQuery(h) = c { Some(*h) } else { None })
        .collect();
    assert_eq!(begun, read);
    assert_ne!(begun[0], begun[1]);
}

#[test]
fn test_pipelined_counts_stalled_reads() {
    let positions = [Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, -6.0)];
    let mut fixture = Fixture::new(MockGraphicsDevice::new().with_result_latency(1), &positions);

    let stats = fixture.run(&OcclusionTechnique, occlusion(RenderFlags::empty(), QuerySync::Pipelined)).unwrap();

    assert_eq!(stats.stalled_reads, 2);
    assert_eq!(stats.rendered_models, 2);
}

#[test]
fn test_pipelined_matches_stop_and_wait_decisions() {
    let instances = InstanceSet::random(48, &SpawnVolume::default(), 5).unwrap();
    let oracle = |p: Vec3| (p.x * 3.0 + p.z).sin() > 0.0;

    let mut stop_and_wait = Fixture::with_pool_size(MockGraphicsDevice::new().with_oracle(oracle), 48, instances.clone());
    let mut pipelined = Fixture::with_pool_size(MockGraphicsDevice::new().with_oracle(oracle), 48, instances);
    stop_and_wait.camera.set_position(Vec3::new(0.0, 1.0, 10.0));
    pipelined.camera.set_position(Vec3::new(0.0, 1.0, 10.0));

    let a = stop_and_wait.run(&OcclusionTechnique, occlusion(RenderFlags::FRUSTUM_CULLING, QuerySync::StopAndWait)).unwrap();
    let b = pipelined.run(&OcclusionTechnique, occlusion(RenderFlags::FRUSTUM_CULLING, QuerySync::Pipelined)).unwrap();

    assert_eq!(a, b);
}
