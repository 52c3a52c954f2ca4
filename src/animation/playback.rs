use crate::animation::action::LoopMode;
use crate::animation::clip::ClipId;
use crate::animation::mixer::AnimationMixer;
use crate::scene::SceneAsset;
use crate::utils::time::Clock;

/// Preview playback of at most one active clip.
///
/// `focus` and `blur` are independent: focusing a clip does not
/// stop the clip focused before it, and `blur` stops whichever clip is
/// active at that moment. Callers issue `blur` before the next `focus`.
///
/// Time comes from the render loop through [`Self::tick`].
#[derive(Debug, Default)]
pub struct PlaybackController {
    mixer: AnimationMixer,
    active: Option<ClipId>,
    loop_mode: LoopMode,
}

impl PlaybackController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_loop_mode(loop_mode: LoopMode) -> Self {
        Self {
            loop_mode,
            ..Self::default()
        }
    }

    /// Makes `clip` the active clip and starts its playback.
    ///
    /// Returns `false`, leaving the state untouched, when the clip is not in
    /// the asset's registry.
    pub fn focus(&mut self, asset: &SceneAsset, clip: ClipId) -> bool {
        let Some(action) = self.mixer.clip_action(asset, clip) else {
            return false;
        };
        action.loop_mode = self.loop_mode;
        action.play();
        self.active = Some(clip);
        log::debug!("Playback focus: {clip:?}");
        true
    }

    /// Stops the active clip, if any, and clears it.
    pub fn blur(&mut self) -> Option<ClipId> {
        let clip = self.active.take()?;
        if let Some(action) = self.mixer.action_mut(clip) {
            action.stop();
        }
        log::debug!("Playback blur: {clip:?}");
        Some(clip)
    }

    #[inline]
    #[must_use]
    pub fn active(&self) -> Option<ClipId> {
        self.active
    }

    /// Whether `clip` currently has a running action. A clip can keep running
    /// after losing focus to another one.
    #[must_use]
    pub fn is_playing(&self, clip: ClipId) -> bool {
        self.mixer.action(clip).is_some_and(|a| a.is_running())
    }

    /// Poses the asset at `elapsed` seconds of the shared clock.
    pub fn tick(&mut self, elapsed: f32, asset: &mut SceneAsset) {
        self.mixer.set_time(elapsed, asset);
    }

    /// Reads the clock and poses the asset.
    pub fn tick_clock(&mut self, clock: &dyn Clock, asset: &mut SceneAsset) {
        self.tick(clock.elapsed_seconds(), asset);
    }

    /// Drops all playback state of a removed clip, clearing the active clip
    /// if it pointed there.
    pub fn forget(&mut self, clip: ClipId) {
        if self.active == Some(clip) {
            self.active = None;
        }
        self.mixer.uncache_clip(clip);
    }

    /// Discards every action. Used when the asset is replaced.
    pub fn reset(&mut self) {
        self.mixer = AnimationMixer::new();
        self.active = None;
    }

    #[inline]
    #[must_use]
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    #[must_use]
    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }
}
