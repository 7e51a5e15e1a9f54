//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Quat, Vec2, Vec3};
use slotmap::SlotMap;

use sinew::import::{
    ImportedScene, Key, NodeChannel, SceneAnimation, SceneBone, SceneMaterial, SceneMesh, VertexWeight,
};
use sinew::render::{DrawCall, FrameUniforms, GeometryHandle, RenderBackend, SkinnedVertex};
use sinew::texture::{TextureBackend, TextureCache, TextureHandle};

pub const EPSILON: f32 = 1e-5;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Recording backends
// ============================================================================

#[derive(Debug, Clone)]
pub struct Upload {
    pub handle: GeometryHandle,
    pub label: String,
    pub vertices: Vec<SkinnedVertex>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct RecordedDraw {
    pub uniforms: FrameUniforms,
    pub bone_matrices: Vec<Mat4>,
    pub geometry: GeometryHandle,
    pub index_count: u32,
    pub diffuse: Option<TextureHandle>,
    pub specular: Option<TextureHandle>,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    handles: SlotMap<GeometryHandle, ()>,
    pub uploads: Vec<Upload>,
    pub draws: Vec<RecordedDraw>,
}

impl RenderBackend for RecordingBackend {
    fn upload_geometry(&mut self, label: &str, vertices: &[SkinnedVertex], indices: &[u32]) -> GeometryHandle {
        let handle = self.handles.insert(());
        self.uploads.push(Upload {
            handle,
            label: label.to_string(),
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        });
        handle
    }

    fn draw_skinned(&mut self, call: &DrawCall<'_>) {
        self.draws.push(RecordedDraw {
            uniforms: call.uniforms,
            bone_matrices: call.bone_matrices.to_vec(),
            geometry: call.geometry,
            index_count: call.index_count,
            diffuse: call.diffuse,
            specular: call.specular,
        });
    }
}

#[derive(Debug, Default, Clone)]
pub struct TextureLog {
    pub created: Rc<RefCell<Vec<String>>>,
    pub released: Rc<RefCell<Vec<TextureHandle>>>,
}

struct CountingTextures(TextureLog);

impl TextureBackend for CountingTextures {
    fn create_texture(&mut self, _handle: TextureHandle, path: &str) {
        self.0.created.borrow_mut().push(path.to_string());
    }

    fn release_texture(&mut self, handle: TextureHandle) {
        self.0.released.borrow_mut().push(handle);
    }
}

pub fn counting_cache() -> (TextureCache, TextureLog) {
    let log = TextureLog::default();
    (TextureCache::new(CountingTextures(log.clone())), log)
}

// ============================================================================
// Scenes
// ============================================================================

fn weights(entries: &[(u32, f32)]) -> Vec<VertexWeight> {
    entries
        .iter()
        .map(|&(vertex, weight)| VertexWeight { vertex, weight })
        .collect()
}

/// ```text
/// Scene
/// ├─ Armature
/// │  └─ Hips            (bound)
/// │     ├─ Spine        (not bound)
/// │     │  └─ Head      (bound)
/// │     └─ Leg          (bound)
/// └─ Body
/// ```
///
/// One mesh `body` with three vertices, bones listed as Head, Hips, Leg.
/// Material 0 lists two diffuse textures and one specular texture.
pub fn skinned_scene() -> ImportedScene {
    let mut scene = ImportedScene::new();
    let root = scene.create_node("Scene", Mat4::IDENTITY);
    scene.set_root(root);
    let armature = scene.create_child(root, "Armature", Mat4::IDENTITY);
    let hips = scene.create_child(armature, "Hips", Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)));
    let spine = scene.create_child(hips, "Spine", Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0)));
    let head = scene.create_child(spine, "Head", Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0)));
    let leg = scene.create_child(hips, "Leg", Mat4::from_translation(Vec3::new(0.2, -0.5, 0.0)));
    scene.create_child(root, "Body", Mat4::IDENTITY);

    scene.materials.push(SceneMaterial {
        name: "skin".into(),
        diffuse_textures: vec!["unused.png".into(), "skin.png".into()],
        specular_textures: vec!["spec.png".into()],
    });

    scene.meshes.push(SceneMesh {
        name: "body".into(),
        positions: vec![Vec3::ZERO, Vec3::Y, Vec3::X],
        normals: vec![Vec3::Z; 3],
        uvs: vec![Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0)],
        indices: vec![0, 1, 2],
        material: Some(0),
        bones: vec![
            SceneBone {
                node: head,
                armature,
                offset_matrix: Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0)),
                weights: weights(&[(0, 0.7)]),
            },
            SceneBone {
                node: hips,
                armature,
                offset_matrix: Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)),
                weights: weights(&[(0, 0.3), (1, 1.0)]),
            },
            SceneBone {
                node: leg,
                armature,
                offset_matrix: Mat4::from_translation(Vec3::new(-0.2, -0.5, 0.0)),
                weights: weights(&[(2, 1.0)]),
            },
        ],
    });

    scene
}

/// Two-second animation `Wave` at 25 ticks per second moving `Hips` from
/// y = 0 to y = 2, plus a channel for an unknown node.
pub fn wave_animation() -> SceneAnimation {
    SceneAnimation {
        name: "Wave".into(),
        ticks_per_second: 25.0,
        duration_ticks: 50.0,
        channels: vec![
            NodeChannel {
                node_name: "Hips".into(),
                position_keys: vec![Key::new(0.0, Vec3::ZERO), Key::new(50.0, Vec3::new(0.0, 2.0, 0.0))],
                scale_keys: vec![Key::new(0.0, Vec3::ONE)],
                rotation_keys: vec![Key::new(0.0, Quat::IDENTITY)],
            },
            NodeChannel {
                node_name: "NotABone".into(),
                position_keys: vec![Key::new(0.0, Vec3::ONE)],
                scale_keys: vec![Key::new(0.0, Vec3::ONE)],
                rotation_keys: vec![Key::new(0.0, Quat::IDENTITY)],
            },
        ],
    }
}

pub fn animated_scene() -> ImportedScene {
    let mut scene = skinned_scene();
    scene.animations.push(wave_animation());
    scene
}

/// A scene whose only mesh has no bones.
pub fn static_scene() -> ImportedScene {
    let mut scene = ImportedScene::new();
    let root = scene.create_node("Scene", Mat4::IDENTITY);
    scene.set_root(root);
    scene.meshes.push(SceneMesh {
        name: "rock".into(),
        positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        normals: vec![Vec3::Z; 3],
        uvs: vec![Vec2::ZERO; 3],
        indices: vec![0, 1, 2],
        material: None,
        bones: Vec::new(),
    });
    scene
}
