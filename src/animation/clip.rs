use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::tracks::KeyframeTrack;
use crate::import::{ImportedScene, SceneAnimation};
use crate::skeleton::Bone;

/// Keyframes of one bone inside one animation.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneClip {
    pub bone_index: usize,
    pub position: KeyframeTrack<Vec3>,
    pub scale: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
}

impl BoneClip {
    /// Local transform of the bone at `time` seconds, composed as `T * R * S`.
    ///
    /// Empty tracks fall back to the identity component.
    #[must_use]
    pub fn sample(&self, time: f64) -> Mat4 {
        let position = self.position.sample(time).unwrap_or(Vec3::ZERO);
        let scale = self.scale.sample(time).unwrap_or(Vec3::ONE);
        let rotation = self.rotation.sample(time).unwrap_or(Quat::IDENTITY);
        Mat4::from_scale_rotation_translation(scale, rotation, position)
    }
}

/// A named animation resolved against a bone array.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonAnimation {
    pub name: String,
    /// Length in seconds.
    pub duration: f64,
    pub clips: Vec<BoneClip>,
}

impl SkeletonAnimation {
    /// Converts a scene animation, keeping only channels that target a known bone.
    ///
    /// Channels with an empty position, scale or rotation track are dropped.
    #[must_use]
    pub fn from_scene(animation: &SceneAnimation, bone_indices: &FxHashMap<&str, usize>) -> Self {
        let ticks_per_second = if animation.ticks_per_second > 0.0 {
            animation.ticks_per_second
        } else {
            log::warn!(
                "Animation '{}' has no tick rate, assuming 1 tick per second",
                animation.name
            );
            1.0
        };
        let time_scale = 1.0 / ticks_per_second;
        let duration = animation.duration_ticks * time_scale;
        if duration <= 0.0 {
            log::warn!("Animation '{}' has a non-positive duration ({duration})", animation.name);
        }

        let mut clips = Vec::with_capacity(animation.channels.len());
        for channel in &animation.channels {
            let Some(&bone_index) = bone_indices.get(channel.node_name.as_str()) else {
                continue;
            };
            if channel.position_keys.is_empty()
                || channel.scale_keys.is_empty()
                || channel.rotation_keys.is_empty()
            {
                log::warn!(
                    "Animation '{}': channel '{}' is missing keys, bone excluded from the clip",
                    animation.name,
                    channel.node_name
                );
                continue;
            }

            clips.push(BoneClip {
                bone_index,
                position: KeyframeTrack::from_keys(&channel.position_keys, time_scale),
                scale: KeyframeTrack::from_keys(&channel.scale_keys, time_scale),
                rotation: KeyframeTrack::from_keys(&channel.rotation_keys, time_scale),
            });
        }

        Self {
            name: animation.name.clone(),
            duration,
            clips,
        }
    }
}

/// Every animation of a mesh, keyed by name. Built once after the hierarchy.
#[derive(Debug, Clone, Default)]
pub struct AnimationSet {
    animations: FxHashMap<String, SkeletonAnimation>,
}

impl AnimationSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every scene animation against `bones` by bone name.
    ///
    /// A later animation with an already-used name replaces the earlier one.
    #[must_use]
    pub fn from_scene(scene: &ImportedScene, bones: &[Bone]) -> Self {
        let bone_indices: FxHashMap<&str, usize> = bones
            .iter()
            .enumerate()
            .map(|(index, bone)| (bone.name.as_str(), index))
            .collect();

        let mut set = Self::new();
        for animation in &scene.animations {
            set.insert(SkeletonAnimation::from_scene(animation, &bone_indices));
            log::info!("Animation name: {}", animation.name);
        }
        set
    }

    pub fn insert(&mut self, animation: SkeletonAnimation) {
        self.animations.insert(animation.name.clone(), animation);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SkeletonAnimation> {
        self.animations.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    /// Animation names in lexicographic order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.animations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkeletonAnimation> {
        self.animations.values()
    }
}
