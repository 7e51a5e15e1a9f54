//! Bone Hierarchy Builder
//!
//! Reconstructs a flat, parent-before-child bone array from the imported
//! node graph:
//!
//! 1. The armature is the one bound by the first mesh that declares bones.
//!    Meshes bound to any other armature are left out.
//! 2. Every bound node gets a matrix index in discovery order, then every
//!    ancestor up to the armature is added, since unbound intermediate nodes
//!    still carry transforms.
//! 3. A depth-first pass from the armature emits one [`Bone`] per included
//!    node, in the scene's native child order.

use std::collections::hash_map::Entry;

use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::errors::{Result, SinewError};
use crate::import::{ImportedScene, NodeKey};
use crate::skeleton::Bone;

/// Output of [`build_hierarchy`].
#[derive(Debug, Clone)]
pub struct BoneHierarchy {
    pub armature: NodeKey,
    /// Top-down bone array. Bone 0 is the armature.
    pub bones: Vec<Bone>,
    /// Length of the skinning matrix array.
    pub matrix_count: usize,
    /// Matrix index of every node in the bone set.
    pub matrix_indices: FxHashMap<NodeKey, usize>,
    /// Indices into `ImportedScene::meshes` bound to `armature`, in scene order.
    pub meshes: Vec<usize>,
}

impl BoneHierarchy {
    /// Matrix index of `node`, if it belongs to the bone set.
    #[inline]
    #[must_use]
    pub fn matrix_index(&self, node: NodeKey) -> Option<usize> {
        self.matrix_indices.get(&node).copied()
    }
}

/// Builds the bone array of the first armature found in `scene`.
///
/// Fails with [`SinewError::MissingArmature`] when no mesh declares bones.
pub fn build_hierarchy(scene: &ImportedScene) -> Result<BoneHierarchy> {
    let mut armature: Option<NodeKey> = None;
    let mut meshes = Vec::new();
    let mut matrix_indices: FxHashMap<NodeKey, usize> = FxHashMap::default();
    let mut offsets: FxHashMap<NodeKey, Mat4> = FxHashMap::default();
    let mut bound: Vec<(NodeKey, Mat4)> = Vec::new();

    // Pass 1: bound bones, in mesh then bone order
    for (mesh_index, mesh) in scene.meshes.iter().enumerate() {
        if armature.is_none()
            && let Some(first) = mesh.bones.first()
        {
            armature = Some(first.armature);
        }

        let mut listed = false;
        for bone in mesh.bones.iter().filter(|b| Some(b.armature) == armature) {
            if !listed {
                meshes.push(mesh_index);
                listed = true;
            }
            let next = matrix_indices.len();
            if let Entry::Vacant(entry) = matrix_indices.entry(bone.node) {
                entry.insert(next);
                offsets.insert(bone.node, bone.offset_matrix);
                bound.push((bone.node, bone.offset_matrix));
            }
        }
    }

    let Some(armature) = armature else {
        return Err(SinewError::MissingArmature);
    };

    // Pass 2: ancestors up to the armature. They borrow the offset of the bone that found them.
    for &(node, offset) in &bound {
        for ancestor in scene.ancestors(node) {
            let next = matrix_indices.len();
            if let Entry::Vacant(entry) = matrix_indices.entry(ancestor) {
                entry.insert(next);
                offsets.insert(ancestor, offset);
            }
            if ancestor == armature {
                break;
            }
        }
    }

    // Bones outside the armature's subtree never walk through it
    if !matrix_indices.contains_key(&armature) {
        log::warn!("Armature is not an ancestor of any bound bone");
        let next = matrix_indices.len();
        matrix_indices.insert(armature, next);
    }

    // Pass 3: preorder build. Children are pushed in reverse so they pop in native order.
    let mut bones: Vec<Bone> = Vec::with_capacity(matrix_indices.len());
    let mut stack: Vec<(NodeKey, Option<usize>)> = vec![(armature, None)];
    while let Some((key, parent)) = stack.pop() {
        let (Some(node), Some(&matrix_index)) = (scene.node(key), matrix_indices.get(&key)) else {
            continue;
        };

        let index = bones.len();
        bones.push(
            Bone::new(node.name.clone(), parent, matrix_index)
                .with_relative_matrix(node.transform)
                .with_offset_matrix(offsets.get(&key).copied().unwrap_or(Mat4::IDENTITY)),
        );

        for &child in node.children().iter().rev() {
            if matrix_indices.contains_key(&child) {
                stack.push((child, Some(index)));
            }
        }
    }

    if bones.len() < matrix_indices.len() {
        log::warn!(
            "{} bone nodes lie outside the armature and were not placed in the hierarchy",
            matrix_indices.len() - bones.len()
        );
    }

    Ok(BoneHierarchy {
        armature,
        matrix_count: matrix_indices.len(),
        bones,
        matrix_indices,
        meshes,
    })
}

/// Renders the bone tree one bone per line, as `name -> parent_index`,
/// indented with `|` per level and `L` before every non-root bone.
#[must_use]
pub fn format_tree(bones: &[Bone]) -> String {
    let mut depths: Vec<usize> = Vec::with_capacity(bones.len());
    let mut out = String::new();
    for bone in bones {
        let depth = bone
            .parent
            .and_then(|p| depths.get(p))
            .map_or(0, |d| d + 1);
        depths.push(depth);

        if depth > 0 {
            out.push_str(&"|".repeat(depth - 1));
            out.push('L');
        }
        let parent = bone.parent.map_or(-1, |p| p as i64);
        out.push_str(&format!("{} -> {parent}\n", bone.name));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_tree_indents_by_depth() {
        let bones = vec![
            Bone::new("root", None, 0),
            Bone::new("spine", Some(0), 1),
            Bone::new("head", Some(1), 2),
            Bone::new("leg", Some(0), 3),
        ];
        let tree = format_tree(&bones);
        assert_eq!(tree, "root -> -1\nLspine -> 0\n|Lhead -> 1\nLleg -> 0\n");
    }
}
