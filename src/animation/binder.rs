use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::SceneAsset;

pub struct Binder;

impl Binder {
    /// Resolves each track of `clip` to a node of `asset` by name.
    ///
    /// Tracks whose node does not exist in the asset get no binding and are
    /// silently skipped during playback.
    #[must_use]
    pub fn bind(asset: &SceneAsset, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());

        for (track_index, track) in clip.tracks.iter().enumerate() {
            if let Some(node) = asset.find_node_by_name(&track.meta.node_name) {
                bindings.push(PropertyBinding {
                    track_index,
                    node,
                    target: track.meta.target,
                });
            } else {
                log::debug!(
                    "Clip '{}': no node named '{}' for {} track",
                    clip.name,
                    track.meta.node_name,
                    track.meta.target.as_str()
                );
            }
        }

        bindings
    }
}
