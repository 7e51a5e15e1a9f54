//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`SinewError`] covers the failure modes of the load
//! path:
//! - Asset fetching (file I/O, missing assets, unsupported sources)
//! - Scene import (malformed files, rejected documents, bad data URIs)
//! - Skeleton reconstruction (no armature declared by any mesh)
//! - Settings parsing
//!
//! Per-frame operations never return errors. A [`SkinnedMesh`](crate::SkinnedMesh)
//! logs any load failure and stays in its empty state, which `draw` and
//! `animate` treat as "nothing to do".
//!
//! # Usage
//!
//! ```rust,ignore
//! use sinew::errors::{SinewError, Result};
//!
//! fn import() -> Result<()> {
//!     Err(SinewError::SceneLoad("truncated header".into()))
//! }
//! ```

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum SinewError {
    // ========================================================================
    // Asset Fetch Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The asset source scheme cannot be read by this crate.
    #[error("Unsupported asset source: {0}")]
    UnsupportedSource(String),

    /// The fetch task went away before delivering its result.
    #[error("Asset load channel closed before the scene arrived")]
    LoadChannelClosed,

    // ========================================================================
    // Scene Import Errors
    // ========================================================================
    /// The scene file is malformed or the importer rejected it.
    #[error("Scene load failure: {0}")]
    SceneLoad(String),

    /// glTF parsing or loading error.
    #[cfg(feature = "gltf")]
    #[error("glTF error: {0}")]
    Gltf(String),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUri(String),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Skeleton Errors
    // ========================================================================
    /// No mesh in the scene declares bones.
    #[error("No armature was found")]
    MissingArmature,
}

#[cfg(feature = "gltf")]
impl From<gltf::Error> for SinewError {
    fn from(err: gltf::Error) -> Self {
        SinewError::Gltf(err.to_string())
    }
}

/// Alias for `Result<T, SinewError>`.
pub type Result<T> = std::result::Result<T, SinewError>;
