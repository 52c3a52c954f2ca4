use rustc_hash::FxHashMap;

use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::binder::Binder;
use crate::animation::binding::TargetPath;
use crate::animation::clip::ClipId;
use crate::scene::SceneAsset;

/// Drives the node transforms of one asset from its clips.
///
/// Actions are created lazily per clip and cached, so focusing the same clip
/// twice reuses its action.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: FxHashMap<ClipId, AnimationAction>,
    time: f32,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached action for `clip`, creating and binding it on first
    /// use. `None` when the clip is not in the asset's registry.
    pub fn clip_action(
        &mut self,
        asset: &SceneAsset,
        clip: ClipId,
    ) -> Option<&mut AnimationAction> {
        let data = asset.clips.get(clip)?;
        Some(self.actions.entry(clip).or_insert_with(|| {
            AnimationAction::new(clip, data.tracks.len(), Binder::bind(asset, data))
        }))
    }

    #[must_use]
    pub fn action(&self, clip: ClipId) -> Option<&AnimationAction> {
        self.actions.get(&clip)
    }

    pub fn action_mut(&mut self, clip: ClipId) -> Option<&mut AnimationAction> {
        self.actions.get_mut(&clip)
    }

    /// Drops the cached action of `clip`.
    pub fn uncache_clip(&mut self, clip: ClipId) -> Option<AnimationAction> {
        self.actions.remove(&clip)
    }

    /// Global mixer time in seconds.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Jumps every running action to `time` seconds from its start and
    /// applies the resulting pose.
    pub fn set_time(&mut self, time: f32, asset: &mut SceneAsset) {
        self.time = 0.0;
        for action in self.actions.values_mut() {
            action.reset_time();
        }
        self.update(time, asset);
    }

    /// Advances every running action by `dt` and applies the resulting pose.
    pub fn update(&mut self, dt: f32, asset: &mut SceneAsset) {
        self.time += dt;

        let (nodes, clips, meshes) = asset.split_for_animation();

        for action in self.actions.values_mut() {
            let Some(clip) = clips.get(action.clip_id()) else {
                continue;
            };
            if !action.is_running() {
                continue;
            }
            action.update(dt, clip.duration);
            if action.weight <= 0.0 {
                continue;
            }

            for i in 0..action.bindings.len() {
                let binding = action.bindings[i].clone();
                let Some(value) = action.sample_track(clip, binding.track_index) else {
                    continue;
                };
                let Some(node) = nodes.get_mut(binding.node) else {
                    continue;
                };

                match (value, binding.target) {
                    (TrackValue::Vector3(v), TargetPath::Translation) => {
                        node.transform.position = v;
                    }
                    (TrackValue::Vector3(v), TargetPath::Scale) => node.transform.scale = v,
                    (TrackValue::Quaternion(q), TargetPath::Rotation) => {
                        node.transform.rotation = q.normalize();
                    }
                    (TrackValue::MorphWeights(w), TargetPath::Weights) => {
                        let target_count = node
                            .mesh
                            .and_then(|key| meshes.get(key))
                            .map_or(w.len(), |mesh| mesh.morph_target_count());
                        node.set_morph_weights(&w, target_count);
                    }
                    _ => {}
                }
            }
        }
    }
}
