use glam::{Quat, Vec3};
use slotmap::new_key_type;

use crate::animation::binding::TargetPath;
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::animation::values::MorphWeightData;

new_key_type! {
    pub(crate) struct ClipKey;
}

/// Stable identity of a clip inside a [`ClipRegistry`](crate::animation::ClipRegistry).
///
/// An id resolves only in the registry that issued it. Slot keys are
/// generational, so once a clip is removed its id never resolves again, even
/// if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId {
    pub(crate) registry: u64,
    pub(crate) key: ClipKey,
}

pub type MorphWeightsTrack = KeyframeTrack<MorphWeightData>;

#[derive(Debug, Clone)]
pub struct TrackMeta {
    /// Name of the animated node. Tracks are bound to nodes by name so that
    /// clips decoded from another file can drive the live asset.
    pub node_name: String,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
    MorphWeights(MorphWeightsTrack),
}

impl TrackData {
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            TrackData::Vector3(t) => t.end_time(),
            TrackData::Quaternion(t) => t.end_time(),
            TrackData::MorphWeights(t) => t.end_time(),
        }
    }

    #[must_use]
    pub fn times(&self) -> &[f32] {
        match self {
            TrackData::Vector3(t) => &t.times,
            TrackData::Quaternion(t) => &t.times,
            TrackData::MorphWeights(t) => &t.times,
        }
    }

    #[must_use]
    pub fn interpolation(&self) -> InterpolationMode {
        match self {
            TrackData::Vector3(t) => t.interpolation,
            TrackData::Quaternion(t) => t.interpolation,
            TrackData::MorphWeights(t) => t.interpolation,
        }
    }
}

/// A track: which node property it drives plus its keyframes.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

/// A named animation sequence.
///
/// Clips are value-like once decoded; only `name` is edited in place.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Builds a clip whose duration is the latest keyframe across all tracks.
    #[must_use]
    pub fn new(name: String, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);

        Self {
            name,
            duration,
            tracks,
        }
    }

    /// Names of the nodes this clip animates, in track order, deduplicated.
    #[must_use]
    pub fn target_node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.tracks.len());
        for track in &self.tracks {
            let name = track.meta.node_name.as_str();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}
