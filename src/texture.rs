//! Texture Cache
//!
//! Path-keyed texture deduplication shared by every mesh of a run.
//! Decoding and GPU upload belong to the [`TextureBackend`]; the cache only
//! hands out stable [`TextureHandle`]s, one per distinct path.

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    pub struct TextureHandle;
}

/// Creates and releases the actual textures behind cache handles.
pub trait TextureBackend {
    /// Called once per distinct path, the first time it is requested.
    fn create_texture(&mut self, handle: TextureHandle, path: &str);

    fn release_texture(&mut self, handle: TextureHandle);
}

/// Backend that keeps no GPU state, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTextureBackend;

impl TextureBackend for NullTextureBackend {
    fn create_texture(&mut self, _handle: TextureHandle, _path: &str) {}

    fn release_texture(&mut self, _handle: TextureHandle) {}
}

pub struct TextureCache {
    backend: Box<dyn TextureBackend>,
    textures: SlotMap<TextureHandle, String>,
    lookup: FxHashMap<String, TextureHandle>,
}

impl TextureCache {
    #[must_use]
    pub fn new(backend: impl TextureBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            textures: SlotMap::with_key(),
            lookup: FxHashMap::default(),
        }
    }

    /// Cache-or-create. An empty path means "no texture" and yields `None`.
    pub fn get_texture(&mut self, path: &str) -> Option<TextureHandle> {
        if path.is_empty() {
            return None;
        }
        if let Some(&handle) = self.lookup.get(path) {
            return Some(handle);
        }

        let handle = self.textures.insert(path.to_string());
        self.backend.create_texture(handle, path);
        self.lookup.insert(path.to_string(), handle);
        log::debug!("Texture created: {path}");
        Some(handle)
    }

    /// Handle of an already-created texture, without creating one.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<TextureHandle> {
        self.lookup.get(path).copied()
    }

    /// Releases every texture. Handles handed out earlier become stale.
    pub fn unload_textures(&mut self) {
        for (handle, _) in self.textures.drain() {
            self.backend.release_texture(handle);
        }
        self.lookup.clear();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new(NullTextureBackend)
    }
}

impl std::fmt::Debug for TextureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureCache")
            .field("textures", &self.textures.len())
            .finish_non_exhaustive()
    }
}
