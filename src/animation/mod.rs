//! Animation clips, their registry and preview playback.

pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod mixer;
pub mod playback;
pub mod registry;
pub mod tracks;
mod values;

pub use action::{AnimationAction, LoopMode, TrackValue};
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath};
pub use clip::{AnimationClip, ClipId, MorphWeightsTrack, Track, TrackData, TrackMeta};
pub use mixer::AnimationMixer;
pub use playback::PlaybackController;
pub use registry::ClipRegistry;
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::{Interpolatable, MorphWeightData};
