//! Application Scaffold Tests
//!
//! Tests for:
//! - Hook order of the headless frame driver
//! - Frame context values
//! - Viewer camera and projection
//! - Viewer loading and drawing a skinned mesh

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::{Mat4, Vec3, Vec4};

use sinew::app::{
    FrameContext, Scaffold, SkinnedMeshViewer, orbit_camera, run_frames, viewer_projection,
};
use sinew::assets::{AssetReaderVariant, MemoryAssetReader};
use sinew::import::PrebuiltImporter;
use sinew::render::{CpuRenderBackend, SkinnedVertex};
use sinew::settings::LoaderSettings;

use common::{animated_scene, approx, approx_vec3, counting_cache, init_logger};

// ============================================================================
// Frame driver
// ============================================================================

#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
    frames: Vec<FrameContext>,
}

impl Scaffold for Recorder {
    fn setup(&mut self) {
        self.calls.push("setup".into());
    }

    fn cleanup(&mut self) {
        self.calls.push("cleanup".into());
    }

    fn draw(&mut self, frame: &FrameContext) {
        self.calls.push("draw".into());
        self.frames.push(*frame);
    }

    fn imgui(&mut self) -> i32 {
        self.calls.push("imgui".into());
        0
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.calls.push(format!("resize {width}x{height}"));
    }
}

#[test]
fn hooks_run_in_host_order() {
    let mut app = Recorder::default();
    run_frames(&mut app, 800, 600, 2, Duration::from_millis(500));

    assert_eq!(
        app.calls,
        vec!["setup", "resize 800x600", "imgui", "draw", "imgui", "draw", "cleanup"]
    );
}

#[test]
fn frame_context_accumulates_fixed_steps() {
    let mut app = Recorder::default();
    run_frames(&mut app, 800, 600, 3, Duration::from_millis(250));

    let times: Vec<f64> = app.frames.iter().map(|f| f.time).collect();
    assert_eq!(times, vec![0.25, 0.5, 0.75]);
    assert!(app.frames.iter().all(|f| (f.delta - 0.25).abs() < 1e-9));
    assert_eq!(app.frames.last().unwrap().frame, 3);
}

#[test]
fn default_title() {
    assert_eq!(Recorder::default().title(), "Application");
}

#[test]
fn aspect_guards_zero_sizes() {
    let mut frame = FrameContext {
        width: 800,
        height: 400,
        time: 0.0,
        delta: 0.0,
        frame: 0,
    };
    assert!(approx(frame.aspect(), 2.0));

    frame.height = 0;
    assert!(approx(frame.aspect(), 1.0));
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn orbit_camera_starts_behind_and_above() {
    let eye = orbit_camera(0.0).transform_point3(Vec3::ZERO);
    let pitch = (-15.0_f32).to_radians();
    let expected = Vec3::new(0.0, 2.0 - 5.0 * pitch.sin(), 5.0 * pitch.cos());
    assert!(approx_vec3(eye, expected));
}

#[test]
fn orbit_camera_yaws_over_time() {
    let start = orbit_camera(0.0).transform_point3(Vec3::ZERO);
    // Half a turn takes 2π seconds at 0.5 rad/s
    let half = orbit_camera(std::f32::consts::TAU).transform_point3(Vec3::ZERO);
    assert!(approx_vec3(half, Vec3::new(-start.x, start.y, -start.z)));
}

#[test]
fn projection_maps_near_and_far_planes() {
    let projection = viewer_projection(1.0);
    let near = projection * Vec4::new(0.0, 0.0, -1.0, 1.0);
    let far = projection * Vec4::new(0.0, 0.0, -10.0, 1.0);
    assert!(approx(near.z / near.w, -1.0));
    assert!(approx(far.z / far.w, 1.0));
}

// ============================================================================
// Viewer
// ============================================================================

fn viewer() -> (SkinnedMeshViewer<CpuRenderBackend>, common::TextureLog) {
    init_logger();
    let reader = MemoryAssetReader::new().with_file("hero/hero.bin", vec![0_u8]);
    let (textures, log) = counting_cache();
    let viewer = SkinnedMeshViewer::new(
        "hero/hero.bin",
        AssetReaderVariant::from(reader),
        Arc::new(PrebuiltImporter::new(animated_scene())),
        LoaderSettings::default().with_default_animation("Wave"),
        textures,
        CpuRenderBackend::new(),
    );
    (viewer, log)
}

#[test]
fn viewer_title_names_the_path() {
    let (viewer, _) = viewer();
    assert_eq!(viewer.title(), "Skinned Mesh - hero/hero.bin");
}

#[test]
fn viewer_loads_then_draws_every_frame() {
    let (mut viewer, _log) = viewer();
    assert!(viewer.mesh().is_none());

    viewer.setup();
    viewer.on_resize(640, 480);
    assert_eq!(viewer.size(), (640, 480));

    let mut frame = FrameContext {
        width: 640,
        height: 480,
        time: 0.0,
        delta: 0.0,
        frame: 0,
    };
    let deadline = Instant::now() + Duration::from_secs(5);
    while !viewer.mesh().unwrap().is_loaded() {
        assert!(Instant::now() < deadline, "load did not complete in time");
        std::thread::sleep(Duration::from_millis(5));
        viewer.draw(&frame);
    }
    let loaded_at = viewer.backend().draw_count();
    assert!(loaded_at >= 1);

    frame.time = 0.5;
    frame.frame = 1;
    viewer.draw(&frame);
    assert_eq!(viewer.backend().draw_count(), loaded_at + 1);

    let mesh = viewer.mesh().unwrap();
    assert_eq!(mesh.current_animation(), Some("Wave"));
    let hips = mesh.bone("Hips").unwrap().relative_matrix;
    assert!(!hips.abs_diff_eq(Mat4::IDENTITY, 1e-6));

    // The CPU backend keeps the interleaved buffer as uploaded
    let handle = mesh.mesh_records()[0].geometry;
    let geometry = viewer.backend().geometry(handle).unwrap();
    assert_eq!(geometry.label, "body");
    assert_eq!(geometry.indices, vec![0, 1, 2]);
    assert_eq!(viewer.backend().vertices(handle).unwrap().len(), 3);
    assert_eq!(geometry.vertex_bytes().len(), 3 * std::mem::size_of::<SkinnedVertex>());
}

#[test]
fn viewer_cleanup_releases_textures() {
    let (mut viewer, log) = viewer();
    viewer.setup();
    assert!(viewer.mesh_mut().is_some());

    let frame = FrameContext {
        width: 1,
        height: 1,
        time: 0.0,
        delta: 0.0,
        frame: 0,
    };
    let deadline = Instant::now() + Duration::from_secs(5);
    while !viewer.mesh().unwrap().is_loaded() {
        assert!(Instant::now() < deadline, "load did not complete in time");
        std::thread::sleep(Duration::from_millis(5));
        viewer.draw(&frame);
    }
    assert!(!viewer.textures().is_empty());

    viewer.cleanup();
    assert!(viewer.textures().is_empty());
    assert_eq!(log.released.borrow().len(), log.created.borrow().len());
}
