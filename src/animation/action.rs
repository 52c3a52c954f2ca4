use glam::{Quat, Vec3};

use crate::animation::{
    MorphWeightData,
    binding::PropertyBinding,
    clip::{AnimationClip, ClipId, TrackData},
    tracks::KeyframeCursor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    Once,
    #[default]
    Loop,
    PingPong,
}

/// Playback state of one clip inside an [`AnimationMixer`](crate::animation::AnimationMixer).
///
/// The action does not own its clip. It stores the [`ClipId`] and receives the
/// clip from the registry whenever it is sampled, so a renamed clip keeps
/// playing and a removed clip can no longer be sampled.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: ClipId,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    running: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: ClipId, track_count: usize, bindings: Vec<PropertyBinding>) -> Self {
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            running: false,
            enabled: true,
            bindings,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[inline]
    #[must_use]
    pub fn clip_id(&self) -> ClipId {
        self.clip
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running && self.enabled
    }

    pub fn play(&mut self) -> &mut Self {
        self.running = true;
        self.enabled = true;
        self
    }

    /// Stops playback and rewinds to the start.
    pub fn stop(&mut self) -> &mut Self {
        self.running = false;
        self.reset_time();
        self
    }

    pub fn reset_time(&mut self) {
        self.time = 0.0;
        for cursor in &mut self.track_cursors {
            cursor.last_index = 0;
        }
    }

    /// Advances time by `dt` (scaled by `time_scale`), wrapping according to
    /// the loop mode of a clip lasting `duration` seconds.
    pub fn update(&mut self, dt: f32, duration: f32) {
        if !self.is_running() {
            return;
        }

        if duration <= 0.0 {
            self.time = 0.0;
            return;
        }

        self.time += dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                // Holds the last pose once the end is reached.
                self.time = self.time.clamp(0.0, duration);
            }
            LoopMode::Loop => {
                self.time = self.time.rem_euclid(duration);
            }
            LoopMode::PingPong => {
                let double_duration = duration * 2.0;
                let mut t = self.time.rem_euclid(double_duration);
                if t > duration {
                    t = double_duration - t;
                }
                self.time = t;
            }
        }
    }

    /// Samples track `track_index` of `clip` at the current time.
    pub fn sample_track(&mut self, clip: &AnimationClip, track_index: usize) -> Option<TrackValue> {
        let track = clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;

        Some(match &track.data {
            TrackData::Vector3(t) => TrackValue::Vector3(t.sample_with_cursor(self.time, cursor)?),
            TrackData::Quaternion(t) => {
                TrackValue::Quaternion(t.sample_with_cursor(self.time, cursor)?)
            }
            TrackData::MorphWeights(t) => {
                TrackValue::MorphWeights(t.sample_with_cursor(self.time, cursor)?)
            }
        })
    }
}

#[derive(Debug, Clone)]
pub enum TrackValue {
    Vector3(Vec3),
    Quaternion(Quat),
    MorphWeights(MorphWeightData),
}
