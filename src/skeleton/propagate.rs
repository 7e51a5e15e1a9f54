use glam::{Mat4, Vec3};

use crate::skeleton::Bone;

/// A bone array plus the matrices derived from it every frame.
///
/// Skinning matrices are indexed by [`Bone::matrix_index`], so their count
/// may differ from the bone count.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    node_matrices: Vec<Mat4>,
    skinning_matrices: Vec<Mat4>,
}

impl Skeleton {
    /// `bones` must be ordered parent-before-child with bone 0 as root.
    #[must_use]
    pub fn new(bones: Vec<Bone>, matrix_count: usize) -> Self {
        let matrix_count = bones
            .iter()
            .map(|b| b.matrix_index + 1)
            .max()
            .unwrap_or(0)
            .max(matrix_count);
        Self {
            node_matrices: vec![Mat4::IDENTITY; bones.len()],
            skinning_matrices: vec![Mat4::IDENTITY; matrix_count],
            bones,
        }
    }

    /// Recomputes world and skinning matrices in one forward pass.
    ///
    /// The root's node matrix is fixed to identity and every skinning matrix
    /// is premultiplied by the inverse of the root's relative matrix.
    pub fn propagate(&mut self) {
        let Some(root) = self.bones.first() else {
            return;
        };
        let global_inverse = root.relative_matrix.inverse();

        self.node_matrices[0] = Mat4::IDENTITY;
        for i in 1..self.bones.len() {
            let bone = &self.bones[i];
            let parent = bone
                .parent
                .and_then(|p| self.node_matrices.get(p))
                .copied()
                .unwrap_or(Mat4::IDENTITY);
            self.node_matrices[i] = parent * bone.relative_matrix;
        }

        for (bone, node_matrix) in self.bones.iter().zip(&self.node_matrices) {
            if let Some(slot) = self.skinning_matrices.get_mut(bone.matrix_index) {
                *slot = global_inverse * *node_matrix * bone.offset_matrix;
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    pub fn bones_mut(&mut self) -> &mut [Bone] {
        &mut self.bones
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Index of the first bone named `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// World matrices from the last [`propagate`](Self::propagate), one per bone.
    #[inline]
    #[must_use]
    pub fn node_matrices(&self) -> &[Mat4] {
        &self.node_matrices
    }

    #[inline]
    #[must_use]
    pub fn skinning_matrices(&self) -> &[Mat4] {
        &self.skinning_matrices
    }

    /// Origin of bone `index` in skeleton space, before offset correction.
    #[must_use]
    pub fn world_position(&self, index: usize) -> Option<Vec3> {
        self.node_matrices
            .get(index)
            .map(|m| m.transform_point3(Vec3::ZERO))
    }
}
