//! Skinned Mesh
//!
//! The public face of the crate: loads a scene in the background, rebuilds
//! its skeleton, uploads skinned geometry once, and then animates and draws
//! it every frame.
//!
//! # Frame Order
//!
//! ```rust,ignore
//! mesh.update(&mut textures, &mut backend); // finishes a pending load
//! mesh.animate(elapsed_seconds);
//! mesh.draw(projection, view_inverse, model, &mut textures, &mut backend);
//! ```
//!
//! Until a load completes, or after it failed, the mesh is empty and every
//! per-frame call does nothing.

use std::sync::Arc;

use glam::Mat4;

use crate::animation::{AnimationSet, SkeletonAnimation, evaluate};
use crate::assets::io::join_path;
use crate::assets::{AssetReaderVariant, FetchedScene, PendingLoad, fetch_scene};
use crate::errors::{Result, SinewError};
use crate::import::{ImportedScene, SceneImporter, SceneMesh};
use crate::render::{DrawCall, FrameUniforms, MeshRecord, RenderBackend, SkinnedVertex};
use crate::settings::LoaderSettings;
use crate::skeleton::{
    Bone, Skeleton, VertexInfluence, build_hierarchy, format_tree, reduce_influences,
};
use crate::texture::TextureCache;

enum LoadState {
    /// Built directly, no fetch involved.
    Idle,
    Pending {
        load: PendingLoad,
        importer: Arc<dyn SceneImporter>,
    },
    Loaded,
    Failed,
}

impl LoadState {
    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending { .. } => "pending",
            Self::Loaded => "loaded",
            Self::Failed => "failed",
        }
    }
}

pub struct SkinnedMesh {
    path: String,
    settings: LoaderSettings,
    state: LoadState,
    skeleton: Skeleton,
    meshes: Vec<MeshRecord>,
    animations: AnimationSet,
    current_animation: Option<String>,
}

impl std::fmt::Debug for SkinnedMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkinnedMesh")
            .field("path", &self.path)
            .field("state", &self.state.label())
            .field("bones", &self.skeleton.len())
            .field("meshes", &self.meshes.len())
            .field("animations", &self.animations.len())
            .field("current_animation", &self.current_animation)
            .finish()
    }
}

impl SkinnedMesh {
    fn empty(path: String, settings: LoaderSettings) -> Self {
        Self {
            path,
            settings,
            state: LoadState::Idle,
            skeleton: Skeleton::default(),
            meshes: Vec::new(),
            animations: AnimationSet::new(),
            current_animation: None,
        }
    }

    /// Starts loading `path` (relative to `reader`) and returns immediately.
    ///
    /// The load finishes inside a later [`update`](Self::update).
    pub fn load(
        path: impl Into<String>,
        reader: AssetReaderVariant,
        importer: Arc<dyn SceneImporter>,
        settings: LoaderSettings,
    ) -> Self {
        let path = path.into();
        log::debug!("Loading skinned mesh '{path}' with the {} importer", importer.name());
        let load = fetch_scene(reader, &path, Arc::clone(&importer));

        let mut mesh = Self::empty(path, settings);
        mesh.state = LoadState::Pending { load, importer };
        mesh
    }

    /// Parses an already-imported scene right away.
    ///
    /// `asset_path` is the directory texture URIs are relative to.
    pub fn from_scene(
        asset_path: &str,
        scene: &ImportedScene,
        textures: &mut TextureCache,
        backend: &mut dyn RenderBackend,
        settings: &LoaderSettings,
    ) -> Self {
        let mut mesh = Self::empty(String::new(), settings.clone());
        mesh.parse(asset_path, scene, textures, backend);
        mesh
    }

    /// Polls a pending load and runs the parse once its bytes arrived.
    ///
    /// Returns `true` on the call that completed the load successfully.
    pub fn update(&mut self, textures: &mut TextureCache, backend: &mut dyn RenderBackend) -> bool {
        let LoadState::Pending { load, .. } = &mut self.state else {
            return false;
        };
        let Some(result) = load.poll() else {
            return false;
        };
        let LoadState::Pending { importer, .. } = std::mem::replace(&mut self.state, LoadState::Failed)
        else {
            return false;
        };
        self.finish_load(result, importer.as_ref(), textures, backend)
    }

    /// Blocks until a pending load arrives, then parses it.
    pub fn wait_for_load(&mut self, textures: &mut TextureCache, backend: &mut dyn RenderBackend) -> bool {
        match std::mem::replace(&mut self.state, LoadState::Failed) {
            LoadState::Pending { load, importer } => {
                let result = load.wait();
                self.finish_load(result, importer.as_ref(), textures, backend)
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    fn finish_load(
        &mut self,
        result: Result<FetchedScene>,
        importer: &dyn SceneImporter,
        textures: &mut TextureCache,
        backend: &mut dyn RenderBackend,
    ) -> bool {
        let imported = result.and_then(|fetched| {
            importer
                .import(&fetched.bytes, &fetched.dependencies, &self.settings)
                .map(|scene| (fetched.asset_path, scene))
        });

        match imported {
            Ok((asset_path, scene)) => {
                self.parse(&asset_path, &scene, textures, backend);
                self.is_loaded()
            }
            Err(err) => {
                log::error!("Couldn't load model file '{}': {err}", self.path);
                false
            }
        }
    }

    fn parse(
        &mut self,
        asset_path: &str,
        scene: &ImportedScene,
        textures: &mut TextureCache,
        backend: &mut dyn RenderBackend,
    ) {
        let hierarchy = match build_hierarchy(scene) {
            Ok(hierarchy) => hierarchy,
            Err(SinewError::MissingArmature) => {
                log::warn!("No armature was found. Object will be empty.");
                self.state = LoadState::Failed;
                return;
            }
            Err(err) => {
                log::error!("Failed to build bone hierarchy: {err}");
                self.state = LoadState::Failed;
                return;
            }
        };

        for &mesh_index in &hierarchy.meshes {
            let Some(mesh) = scene.meshes.get(mesh_index) else {
                continue;
            };
            let influences = reduce_influences(mesh, hierarchy.armature, &hierarchy.matrix_indices);
            if let Some(record) = upload_mesh(asset_path, scene, mesh, &influences, textures, backend) {
                self.meshes.push(record);
            }
        }

        self.skeleton = Skeleton::new(hierarchy.bones, hierarchy.matrix_count);
        if self.settings.log_hierarchy && log::log_enabled!(log::Level::Debug) {
            log::debug!("Bone hierarchy:\n{}", format_tree(self.skeleton.bones()));
        }

        self.animations = AnimationSet::from_scene(scene, self.skeleton.bones());
        if let Some(name) = self.settings.default_animation.clone() {
            self.set_animation(name);
        }

        self.state = LoadState::Loaded;
        log::info!(
            "Skinned mesh loaded: {} bones, {} bone matrices, {} meshes, {} animations",
            self.skeleton.len(),
            self.skeleton.skinning_matrices().len(),
            self.meshes.len(),
            self.animations.len()
        );
    }

    /// Draws every mesh record. Does nothing until a load produced geometry.
    pub fn draw(
        &mut self,
        projection: Mat4,
        view_inverse: Mat4,
        model: Mat4,
        textures: &mut TextureCache,
        backend: &mut dyn RenderBackend,
    ) {
        if self.meshes.is_empty() {
            return;
        }

        self.skeleton.propagate();

        let uniforms = FrameUniforms {
            projection,
            camera_inverse: view_inverse,
            object: model,
        };
        for record in &self.meshes {
            backend.draw_skinned(&DrawCall {
                uniforms,
                bone_matrices: self.skeleton.skinning_matrices(),
                geometry: record.geometry,
                index_count: record.index_count,
                diffuse: textures.get_texture(&record.diffuse_texture),
                specular: textures.get_texture(&record.specular_texture),
            });
        }
    }

    /// Bone by name. Unknown names warn and fall back to the root bone.
    ///
    /// `None` only while the skeleton is empty. Use [`find_bone`](Self::find_bone)
    /// to tell a real match from the fallback.
    #[must_use]
    pub fn bone(&self, name: &str) -> Option<&Bone> {
        let index = self.bone_or_root(name);
        self.skeleton.bones().get(index)
    }

    /// Mutable variant of [`bone`](Self::bone), for driving bones by hand.
    pub fn bone_mut(&mut self, name: &str) -> Option<&mut Bone> {
        let index = self.bone_or_root(name);
        self.skeleton.bones_mut().get_mut(index)
    }

    fn bone_or_root(&self, name: &str) -> usize {
        self.find_bone(name).unwrap_or_else(|| {
            if !self.skeleton.is_empty() {
                log::warn!("Bone \"{name}\" not found!");
            }
            0
        })
    }

    #[must_use]
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.skeleton.find(name)
    }

    /// Selects the animation applied by the next [`animate`](Self::animate).
    pub fn set_animation(&mut self, name: impl Into<String>) {
        self.current_animation = Some(name.into());
    }

    #[must_use]
    pub fn current_animation(&self) -> Option<&str> {
        self.current_animation.as_deref()
    }

    #[must_use]
    pub fn animation_names(&self) -> Vec<&str> {
        self.animations.names()
    }

    #[must_use]
    pub fn animation(&self, name: &str) -> Option<&SkeletonAnimation> {
        self.animations.get(name)
    }

    /// Poses the skeleton at `time` seconds of the current animation, looping.
    ///
    /// Keeps the previous pose when no animation is selected or the name is unknown.
    pub fn animate(&mut self, time: f64) {
        let Some(name) = self.current_animation.as_deref() else {
            return;
        };
        let Some(animation) = self.animations.get(name) else {
            return;
        };
        evaluate(animation, time, self.skeleton.bones_mut());
    }

    /// `true` once a load produced at least one mesh record.
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.meshes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, LoadState::Pending { .. })
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        self.skeleton.bones()
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Matrices from the most recent [`draw`](Self::draw).
    #[inline]
    #[must_use]
    pub fn skinning_matrices(&self) -> &[Mat4] {
        self.skeleton.skinning_matrices()
    }

    #[inline]
    #[must_use]
    pub fn mesh_records(&self) -> &[MeshRecord] {
        &self.meshes
    }

    #[inline]
    #[must_use]
    pub fn animations(&self) -> &AnimationSet {
        &self.animations
    }
}

/// Builds the interleaved vertices of one mesh and uploads them.
fn upload_mesh(
    asset_path: &str,
    scene: &ImportedScene,
    mesh: &SceneMesh,
    influences: &[VertexInfluence],
    textures: &mut TextureCache,
    backend: &mut dyn RenderBackend,
) -> Option<MeshRecord> {
    if mesh.vertex_count() == 0 {
        log::warn!("Mesh '{}' has no vertices, skipping upload", mesh.name);
        return None;
    }

    let material = mesh.material.and_then(|index| scene.materials.get(index));
    let diffuse_texture = material.map_or_else(String::new, |m| {
        warm_textures(asset_path, &m.diffuse_textures, textures)
    });
    let specular_texture = material.map_or_else(String::new, |m| {
        warm_textures(asset_path, &m.specular_textures, textures)
    });

    let vertices: Vec<SkinnedVertex> = mesh
        .positions
        .iter()
        .enumerate()
        .map(|(i, position)| {
            let normal = mesh.normals.get(i).copied().unwrap_or_default();
            let uv = mesh.uvs.get(i).copied().unwrap_or_default();
            let influence = influences.get(i).copied().unwrap_or_default();
            SkinnedVertex::new(position.to_array(), normal.to_array(), uv.to_array(), &influence)
        })
        .collect();

    let geometry = backend.upload_geometry(&mesh.name, &vertices, &mesh.indices);
    Some(MeshRecord {
        name: mesh.name.clone(),
        geometry,
        index_count: mesh.indices.len() as u32,
        diffuse_texture,
        specular_texture,
    })
}

/// Requests every listed texture from the cache and returns the last path,
/// which is the one the mesh record keeps.
fn warm_textures(asset_path: &str, uris: &[String], textures: &mut TextureCache) -> String {
    let mut last = String::new();
    for uri in uris {
        last = join_path(asset_path, uri);
        textures.get_texture(&last);
    }
    last
}
