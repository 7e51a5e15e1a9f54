//! Scene Import
//!
//! Converts raw scene bytes into an [`ImportedScene`]: a generic node
//! hierarchy with meshes, bone bindings, materials and keyframe channels.
//! Everything downstream (hierarchy building, influence reduction, animation)
//! only sees this abstraction, never a file format.
//!
//! Importing is two-phase so that the asynchronous fetch can pull in every
//! file a scene refers to before conversion runs:
//!
//! 1. [`SceneImporter::dependencies`] lists external URIs (relative to the
//!    scene file) that must be fetched.
//! 2. [`SceneImporter::import`] converts the scene bytes plus those fetched
//!    dependencies.

pub mod scene;
#[cfg(feature = "gltf")]
pub mod gltf;

pub use scene::{
    ImportedScene, Key, NodeChannel, NodeKey, SceneAnimation, SceneBone, SceneMaterial,
    SceneMesh, SceneNode, VertexWeight,
};
#[cfg(feature = "gltf")]
pub use self::gltf::GltfImporter;

use rustc_hash::FxHashMap;

use crate::errors::Result;
use crate::settings::LoaderSettings;

/// Fetched external files, keyed by the URI the scene used for them.
pub type Dependencies = FxHashMap<String, Vec<u8>>;

/// A scene-format adapter.
pub trait SceneImporter: Send + Sync {
    /// Human-readable format name, used in log messages.
    fn name(&self) -> &str;

    /// External URIs the scene needs before it can be converted.
    fn dependencies(&self, bytes: &[u8]) -> Result<Vec<String>>;

    /// Converts the scene bytes into a generic scene graph.
    fn import(
        &self,
        bytes: &[u8],
        dependencies: &Dependencies,
        settings: &LoaderSettings,
    ) -> Result<ImportedScene>;
}

/// Imports an already-built scene, ignoring the bytes.
///
/// Useful for procedurally generated skeletons and for tests that want to
/// drive the asynchronous load path without a real file format.
#[derive(Debug, Clone)]
pub struct PrebuiltImporter {
    scene: ImportedScene,
}

impl PrebuiltImporter {
    #[must_use]
    pub fn new(scene: ImportedScene) -> Self {
        Self { scene }
    }
}

impl SceneImporter for PrebuiltImporter {
    fn name(&self) -> &str {
        "prebuilt"
    }

    fn dependencies(&self, _bytes: &[u8]) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn import(
        &self,
        _bytes: &[u8],
        _dependencies: &Dependencies,
        _settings: &LoaderSettings,
    ) -> Result<ImportedScene> {
        Ok(self.scene.clone())
    }
}
