use glam::Mat4;

/// One joint of a [`Skeleton`](crate::skeleton::Skeleton).
///
/// Bones live in a flat array where every bone's parent has a strictly
/// smaller index. Bone 0 is the armature root and has no parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>,
    /// Slot in the skinning matrix array.
    pub matrix_index: usize,
    /// Transform relative to the parent bone. Rewritten by animation every frame.
    pub relative_matrix: Mat4,
    /// Mesh bind space to bone space. Fixed once parsed.
    pub offset_matrix: Mat4,
}

impl Bone {
    #[must_use]
    pub fn new(name: impl Into<String>, parent: Option<usize>, matrix_index: usize) -> Self {
        Self {
            name: name.into(),
            parent,
            matrix_index,
            relative_matrix: Mat4::IDENTITY,
            offset_matrix: Mat4::IDENTITY,
        }
    }

    #[must_use]
    pub fn with_relative_matrix(mut self, matrix: Mat4) -> Self {
        self.relative_matrix = matrix;
        self
    }

    #[must_use]
    pub fn with_offset_matrix(mut self, matrix: Mat4) -> Self {
        self.offset_matrix = matrix;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
