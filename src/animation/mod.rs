//! Keyframe Animation
//!
//! Per-bone position, scale and rotation tracks, grouped into named
//! animations, and the evaluator that turns them into bone poses.
//!
//! Time is wrapped into the animation's duration, so every animation loops.

pub mod clip;
pub mod pose;
pub mod tracks;
pub mod values;

pub use clip::{AnimationSet, BoneClip, SkeletonAnimation};
pub use pose::{evaluate, wrap_time};
pub use tracks::KeyframeTrack;
pub use values::Interpolatable;
