//! Application Scaffold
//!
//! Lifecycle hooks a windowed host calls into, plus a reference viewer that
//! orbits a camera around one skinned mesh.
//!
//! The window and event loop stay with the host. [`run_frames`] drives the
//! hooks headlessly, in the order a host calls them:
//!
//! ```text
//! setup → on_resize → (imgui → draw)* → cleanup
//! ```

use std::sync::Arc;
use std::time::Duration;

use glam::{Mat4, Vec3};

use crate::assets::AssetReaderVariant;
use crate::import::SceneImporter;
use crate::mesh::SkinnedMesh;
use crate::render::RenderBackend;
use crate::settings::LoaderSettings;
use crate::texture::TextureCache;
use crate::utils::time::Timer;

/// Per-frame state handed to [`Scaffold::draw`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Framebuffer size in pixels.
    pub width: u32,
    pub height: u32,
    /// Seconds since the first frame.
    pub time: f64,
    /// Seconds since the previous frame.
    pub delta: f64,
    pub frame: u64,
}

impl FrameContext {
    /// Width over height, or 1 when either is zero.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Hooks into the window lifecycle. Every hook defaults to a no-op.
pub trait Scaffold {
    fn title(&self) -> String {
        "Application".to_string()
    }

    /// Once, after the graphics context is ready.
    fn setup(&mut self) {}

    /// Once, before the graphics context goes away.
    fn cleanup(&mut self) {}

    /// Every frame, after the framebuffer is cleared.
    fn draw(&mut self, _frame: &FrameContext) {}

    /// Every frame, before the UI is rendered.
    fn imgui(&mut self) -> i32 {
        0
    }

    /// Whenever the framebuffer size changes, and once before the first frame.
    fn on_resize(&mut self, _width: u32, _height: u32) {}
}

/// Runs `frames` frames of `app` with a fixed time step and no window.
pub fn run_frames(app: &mut dyn Scaffold, width: u32, height: u32, frames: u64, dt: Duration) {
    log::debug!("Running '{}' headless for {frames} frames", app.title());
    app.setup();
    app.on_resize(width, height);

    let mut timer = Timer::new();
    for _ in 0..frames {
        timer.advance(dt);
        app.imgui();
        app.draw(&FrameContext {
            width,
            height,
            time: timer.elapsed_seconds(),
            delta: timer.delta.as_secs_f64(),
            frame: timer.frame_count,
        });
    }

    app.cleanup();
}

/// Uniform scale applied to the viewed model.
pub const VIEWER_MODEL_SCALE: f32 = 0.02;

/// Orbit camera: raised 2 units, yawing at 0.5 rad/s, pitched down 15° and
/// pulled back 5 units.
#[must_use]
pub fn orbit_camera(time: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0))
        * Mat4::from_rotation_y(0.5 * time)
        * Mat4::from_rotation_x((-15.0_f32).to_radians())
        * Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0))
}

/// 90° vertical field of view, near 1, far 10.
#[must_use]
pub fn viewer_projection(aspect: f32) -> Mat4 {
    Mat4::perspective_rh_gl(90.0_f32.to_radians(), aspect, 1.0, 10.0)
}

/// Loads one skinned mesh in `setup` and draws it every frame.
pub struct SkinnedMeshViewer<B: RenderBackend> {
    path: String,
    reader: AssetReaderVariant,
    importer: Arc<dyn SceneImporter>,
    settings: LoaderSettings,
    textures: TextureCache,
    backend: B,
    mesh: Option<SkinnedMesh>,
    size: (u32, u32),
}

impl<B: RenderBackend> SkinnedMeshViewer<B> {
    pub fn new(
        path: impl Into<String>,
        reader: AssetReaderVariant,
        importer: Arc<dyn SceneImporter>,
        settings: LoaderSettings,
        textures: TextureCache,
        backend: B,
    ) -> Self {
        Self {
            path: path.into(),
            reader,
            importer,
            settings,
            textures,
            backend,
            mesh: None,
            size: (0, 0),
        }
    }

    #[must_use]
    pub fn mesh(&self) -> Option<&SkinnedMesh> {
        self.mesh.as_ref()
    }

    pub fn mesh_mut(&mut self) -> Option<&mut SkinnedMesh> {
        self.mesh.as_mut()
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    /// Last size passed to `on_resize`.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

impl<B: RenderBackend> Scaffold for SkinnedMeshViewer<B> {
    fn title(&self) -> String {
        format!("Skinned Mesh - {}", self.path)
    }

    fn setup(&mut self) {
        self.mesh = Some(SkinnedMesh::load(
            self.path.clone(),
            self.reader.clone(),
            Arc::clone(&self.importer),
            self.settings.clone(),
        ));
    }

    fn cleanup(&mut self) {
        self.textures.unload_textures();
    }

    fn draw(&mut self, frame: &FrameContext) {
        let Some(mesh) = self.mesh.as_mut() else {
            return;
        };
        mesh.update(&mut self.textures, &mut self.backend);

        let projection = viewer_projection(frame.aspect());
        let camera = orbit_camera(frame.time as f32);
        let model = Mat4::from_scale(Vec3::splat(VIEWER_MODEL_SCALE));

        mesh.animate(frame.time);
        mesh.draw(projection, camera.inverse(), model, &mut self.textures, &mut self.backend);
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }
}
