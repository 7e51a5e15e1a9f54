//! Skeleton
//!
//! - [`hierarchy`]: rebuilds a top-down bone array from the scene graph
//! - [`influence`]: reduces per-vertex bone weights to the top four
//! - [`propagate`]: turns relative bone matrices into skinning matrices

pub mod bone;
pub mod hierarchy;
pub mod influence;
pub mod propagate;

pub use bone::Bone;
pub use hierarchy::{BoneHierarchy, build_hierarchy, format_tree};
pub use influence::{InfluenceAccumulator, MAX_INFLUENCES, VertexInfluence, reduce_influences};
pub use propagate::Skeleton;
