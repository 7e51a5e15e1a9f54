//! Render Interface
//!
//! What a skinned mesh hands to the graphics backend: an interleaved vertex
//! layout, opaque geometry handles, and one [`DrawCall`] per mesh record
//! carrying the frame uniforms and the full skinning-matrix array.
//!
//! Shader compilation and buffer upload mechanics live behind
//! [`RenderBackend`].

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use slotmap::{SlotMap, new_key_type};

use crate::skeleton::VertexInfluence;
use crate::texture::TextureHandle;

new_key_type! {
    pub struct GeometryHandle;
}

/// Interleaved vertex as consumed by the skinning shader.
///
/// Attribute order: `position`, `normal`, `uv`, `bone` (integer), `influence`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub bone: [i32; 4],
    pub influence: [f32; 4],
}

impl SkinnedVertex {
    #[must_use]
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2], influence: &VertexInfluence) -> Self {
        Self {
            position,
            normal,
            uv,
            bone: influence.bones,
            influence: influence.weights,
        }
    }
}

/// An uploaded mesh and the textures it samples, by full path.
///
/// An empty path means the material has no texture of that kind.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRecord {
    pub name: String,
    pub geometry: GeometryHandle,
    pub index_count: u32,
    pub diffuse_texture: String,
    pub specular_texture: String,
}

/// Per-frame matrices shared by every mesh record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub projection: Mat4,
    pub camera_inverse: Mat4,
    pub object: Mat4,
}

#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub uniforms: FrameUniforms,
    /// Indexed by bone matrix index.
    pub bone_matrices: &'a [Mat4],
    pub geometry: GeometryHandle,
    pub index_count: u32,
    pub diffuse: Option<TextureHandle>,
    pub specular: Option<TextureHandle>,
}

pub trait RenderBackend {
    /// Uploads a triangle list once. Geometry is never re-uploaded.
    fn upload_geometry(&mut self, label: &str, vertices: &[SkinnedVertex], indices: &[u32]) -> GeometryHandle;

    fn draw_skinned(&mut self, call: &DrawCall<'_>);
}

/// Backend that only keeps CPU copies of uploaded geometry.
///
/// Useful for headless tools and as a reference for what a backend
/// receives.
#[derive(Debug, Default)]
pub struct CpuRenderBackend {
    geometries: SlotMap<GeometryHandle, CpuGeometry>,
    draw_count: usize,
}

#[derive(Debug, Clone)]
pub struct CpuGeometry {
    pub label: String,
    pub vertices: Vec<SkinnedVertex>,
    pub indices: Vec<u32>,
}

impl CpuGeometry {
    /// Vertex buffer exactly as a GPU backend would upload it.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl CpuRenderBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn geometry(&self, handle: GeometryHandle) -> Option<&CpuGeometry> {
        self.geometries.get(handle)
    }

    #[must_use]
    pub fn vertices(&self, handle: GeometryHandle) -> Option<&[SkinnedVertex]> {
        self.geometries.get(handle).map(|g| g.vertices.as_slice())
    }

    #[inline]
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.draw_count
    }
}

impl RenderBackend for CpuRenderBackend {
    fn upload_geometry(&mut self, label: &str, vertices: &[SkinnedVertex], indices: &[u32]) -> GeometryHandle {
        self.geometries.insert(CpuGeometry {
            label: label.to_string(),
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        })
    }

    fn draw_skinned(&mut self, call: &DrawCall<'_>) {
        log::trace!(
            "draw {} indices with {} bone matrices",
            call.index_count,
            call.bone_matrices.len()
        );
        self.draw_count += 1;
    }
}
