//! Pose evaluation: wraps the clock into the animation and rewrites the
//! relative matrix of every bone the animation touches.

use crate::animation::clip::SkeletonAnimation;
use crate::skeleton::Bone;

/// Maps an unbounded time onto `[0, duration)`, looping.
///
/// Negative times wrap from the end. A zero duration yields NaN.
#[inline]
#[must_use]
pub fn wrap_time(time: f64, duration: f64) -> f64 {
    let cycles = time / duration;
    duration * (cycles - cycles.floor())
}

/// Writes the pose of `animation` at `time` seconds into `bones`.
///
/// Bones without a clip keep their current relative matrix.
pub fn evaluate(animation: &SkeletonAnimation, time: f64, bones: &mut [Bone]) {
    let rel_t = wrap_time(time, animation.duration);
    for clip in &animation.clips {
        if let Some(bone) = bones.get_mut(clip.bone_index) {
            bone.relative_matrix = clip.sample(rel_t);
        }
    }
}
