//! # Sinew
//!
//! Skeletal mesh loading and animation.
//!
//! A scene file is fetched in the background and imported into a generic
//! node graph. From it the crate rebuilds a parent-before-child bone array,
//! reduces every vertex to its four heaviest bone influences, and uploads
//! the skinned geometry once. Each frame, keyframed animation poses the
//! bones and a single forward pass turns them into skinning matrices.
//!
//! ## Modules
//!
//! - [`import`]: scene importer seam and the glTF importer
//! - [`assets`]: asynchronous byte fetching
//! - [`skeleton`]: bone hierarchy, vertex influences, matrix propagation
//! - [`animation`]: keyframe tracks and pose evaluation
//! - [`mesh`]: the [`SkinnedMesh`] tying everything together
//! - [`render`] / [`texture`]: interfaces to the graphics backend
//! - [`app`]: lifecycle scaffold and a reference viewer
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sinew::prelude::*;
//!
//! let settings = LoaderSettings::default().with_default_animation("Take 001");
//! let reader = AssetReaderVariant::from_source(&settings.asset_root)?;
//! let mut mesh = SkinnedMesh::load("vampire/vampire.gltf", reader, Arc::new(GltfImporter), settings);
//!
//! // every frame
//! mesh.update(&mut textures, &mut backend);
//! mesh.animate(elapsed);
//! mesh.draw(projection, view_inverse, model, &mut textures, &mut backend);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod app;
pub mod assets;
pub mod errors;
pub mod import;
pub mod mesh;
pub mod render;
pub mod settings;
pub mod skeleton;
pub mod texture;
pub mod utils;

pub use animation::{AnimationSet, SkeletonAnimation};
pub use app::{FrameContext, Scaffold, SkinnedMeshViewer};
pub use assets::{AssetReaderVariant, FileAssetReader, MemoryAssetReader};
pub use errors::{Result, SinewError};
#[cfg(feature = "gltf")]
pub use import::GltfImporter;
pub use import::{ImportedScene, PrebuiltImporter, SceneImporter};
pub use mesh::SkinnedMesh;
pub use render::{CpuRenderBackend, DrawCall, MeshRecord, RenderBackend, SkinnedVertex};
pub use settings::LoaderSettings;
pub use skeleton::{Bone, Skeleton};
pub use texture::{TextureBackend, TextureCache, TextureHandle};

pub mod prelude {
    pub use crate::animation::{AnimationSet, KeyframeTrack, SkeletonAnimation};
    pub use crate::app::{FrameContext, Scaffold, SkinnedMeshViewer};
    pub use crate::assets::{AssetReaderVariant, FileAssetReader, MemoryAssetReader};
    pub use crate::errors::{Result, SinewError};
    #[cfg(feature = "gltf")]
    pub use crate::import::GltfImporter;
    pub use crate::import::{ImportedScene, PrebuiltImporter, SceneImporter};
    pub use crate::mesh::SkinnedMesh;
    pub use crate::render::{CpuRenderBackend, DrawCall, MeshRecord, RenderBackend, SkinnedVertex};
    pub use crate::settings::LoaderSettings;
    pub use crate::skeleton::{Bone, Skeleton};
    pub use crate::texture::{TextureBackend, TextureCache, TextureHandle};
}
