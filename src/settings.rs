//! Loader Settings
//!
//! Configuration consumed by [`SkinnedMesh`](crate::SkinnedMesh) when it
//! fetches and parses a scene.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sinew::LoaderSettings;
//!
//! // Defaults: assets under ./assets, V-flipped UVs, bone tree dumped at debug level
//! let settings = LoaderSettings::default();
//!
//! // Start a clip as soon as the mesh finishes loading
//! let settings = LoaderSettings::default()
//!     .with_asset_root("content/characters")
//!     .with_default_animation("Take 001");
//!
//! // Or read them from a JSON file shipped next to the assets
//! let settings = LoaderSettings::from_json_file("content/loader.json")?;
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Default directory every relative scene path is resolved against.
pub const DEFAULT_ASSET_ROOT: &str = "assets";

/// Settings that control how a skinned mesh is fetched and parsed.
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```json
/// { "asset_root": "content", "default_animation": "Walk" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Directory that relative scene paths are resolved against.
    pub asset_root: PathBuf,

    /// Flip the V texture coordinate (`v' = 1 - v`) while importing.
    pub flip_uvs: bool,

    /// Dump the reconstructed bone tree at `debug` level after a load.
    pub log_hierarchy: bool,

    /// Animation selected automatically once the load completes.
    pub default_animation: Option<String>,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            flip_uvs: true,
            log_hierarchy: true,
            default_animation: None,
        }
    }
}

impl LoaderSettings {
    #[must_use]
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    #[must_use]
    pub fn with_flip_uvs(mut self, flip: bool) -> Self {
        self.flip_uvs = flip;
        self
    }

    #[must_use]
    pub fn with_log_hierarchy(mut self, enabled: bool) -> Self {
        self.log_hierarchy = enabled;
        self
    }

    #[must_use]
    pub fn with_default_animation(mut self, name: impl Into<String>) -> Self {
        self.default_animation = Some(name.into());
        self
    }

    /// Parses settings from a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON settings file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
