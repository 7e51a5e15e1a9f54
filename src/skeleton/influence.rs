//! Vertex Influence Reducer
//!
//! Keeps the four heaviest bone contributions of every vertex with an
//! online top-K scan. A full buffer only accepts a contribution strictly
//! heavier than its current minimum, so ties favour earlier discoveries.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::import::{NodeKey, SceneMesh};

/// Influences a single vertex can carry.
pub const MAX_INFLUENCES: usize = 4;

/// The reduced influences of one vertex. Unused slots are `(bone 0, weight 0.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VertexInfluence {
    pub bones: [i32; MAX_INFLUENCES],
    pub weights: [f32; MAX_INFLUENCES],
}

impl VertexInfluence {
    /// Sum of the kept weights. Not normalized.
    #[must_use]
    pub fn total_weight(&self) -> f32 {
        self.weights.iter().sum()
    }
}

/// Bounded top-4 selector for one vertex.
#[derive(Debug, Clone, Default)]
pub struct InfluenceAccumulator {
    entries: SmallVec<[(f32, i32); MAX_INFLUENCES]>,
}

impl InfluenceAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, weight: f32, bone: i32) {
        if self.entries.len() < MAX_INFLUENCES {
            self.entries.push((weight, bone));
            return;
        }

        let mut min_slot = 0;
        for (slot, entry) in self.entries.iter().enumerate().skip(1) {
            if entry.0 < self.entries[min_slot].0 {
                min_slot = slot;
            }
        }
        if weight > self.entries[min_slot].0 {
            self.entries[min_slot] = (weight, bone);
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn finish(&self) -> VertexInfluence {
        let mut influence = VertexInfluence::default();
        for (slot, &(weight, bone)) in self.entries.iter().enumerate() {
            influence.weights[slot] = weight;
            influence.bones[slot] = bone;
        }
        influence
    }
}

/// Reduces the bone bindings of `mesh` to per-vertex influences.
///
/// Only bones of `armature` contribute, and bone ids are their matrix
/// indices. Weights naming a vertex outside the mesh are dropped.
#[must_use]
pub fn reduce_influences(
    mesh: &SceneMesh,
    armature: NodeKey,
    matrix_indices: &FxHashMap<NodeKey, usize>,
) -> Vec<VertexInfluence> {
    let mut accumulators = vec![InfluenceAccumulator::new(); mesh.vertex_count()];

    for bone in mesh.bones.iter().filter(|b| b.armature == armature) {
        let Some(&matrix_index) = matrix_indices.get(&bone.node) else {
            continue;
        };
        for weight in &bone.weights {
            match accumulators.get_mut(weight.vertex as usize) {
                Some(acc) => acc.push(weight.weight, matrix_index as i32),
                None => log::warn!(
                    "Mesh '{}': weight for vertex {} but only {} vertices",
                    mesh.name,
                    weight.vertex,
                    mesh.vertex_count()
                ),
            }
        }
    }

    accumulators.iter().map(InfluenceAccumulator::finish).collect()
}
