//! Animation System Tests
//!
//! Tests for:
//! - KeyframeTrack linear/step/cubic interpolation
//! - KeyframeCursor scan and binary search fallback
//! - AnimationAction loop modes (Once, Loop, PingPong)
//! - AnimationClip duration auto-computation
//! - ClipRegistry ordering and identity
//! - AnimationMixer / PlaybackController posing a SceneAsset

mod common;

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};

use clip_studio::animation::{
    AnimationAction, AnimationClip, ClipRegistry, InterpolationMode, Interpolatable,
    KeyframeCursor, KeyframeTrack, LoopMode, MorphWeightData, PlaybackController, TargetPath,
    Track, TrackData, TrackMeta,
};
use clip_studio::utils::{Clock, ManualClock};

use common::{approx, approx_vec3, character, walk_clip};

// ============================================================================
// KeyframeTrack: Linear Interpolation (f32)
// ============================================================================

#[test]
fn track_linear_f32_midpoint() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![0.0_f32, 10.0],
        InterpolationMode::Linear,
    );

    let mut cursor = KeyframeCursor::default();
    let val = track.sample_with_cursor(0.5, &mut cursor).unwrap();
    assert!(approx(val, 5.0), "Expected 5.0, got {val}");
}

#[test]
fn track_linear_f32_clamps_outside_range() {
    let track = KeyframeTrack::new(
        vec![1.0, 2.0],
        vec![10.0_f32, 20.0],
        InterpolationMode::Linear,
    );

    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(0.5, &mut cursor).unwrap(), 10.0));
    assert!(approx(track.sample_with_cursor(5.0, &mut cursor).unwrap(), 20.0));
}

#[test]
fn track_empty_samples_none() {
    let track: KeyframeTrack<f32> = KeyframeTrack::new(vec![], vec![], InterpolationMode::Linear);
    assert!(track.is_empty());
    assert!(track.sample(0.0).is_none());
    assert!(approx(track.end_time(), 0.0));
}

// ============================================================================
// KeyframeTrack: Step Interpolation
// ============================================================================

#[test]
fn track_step_holds_value() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![0.0_f32, 100.0, 200.0],
        InterpolationMode::Step,
    );

    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(0.5, &mut cursor).unwrap(), 0.0));
    assert!(approx(track.sample_with_cursor(0.99, &mut cursor).unwrap(), 0.0));
    assert!(approx(track.sample_with_cursor(1.0, &mut cursor).unwrap(), 100.0));
    assert!(approx(track.sample_with_cursor(1.5, &mut cursor).unwrap(), 100.0));
}

// ============================================================================
// KeyframeTrack: Vec3 / Quat
// ============================================================================

#[test]
fn track_linear_vec3() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Vec3::ZERO, Vec3::new(10.0, 20.0, 30.0)],
        InterpolationMode::Linear,
    );

    let val = track.sample(0.5).unwrap();
    assert!(approx_vec3(val, Vec3::new(5.0, 10.0, 15.0)));
}

#[test]
fn track_linear_quat_slerp() {
    let q0 = Quat::IDENTITY;
    let q1 = Quat::from_rotation_y(PI);

    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![q0, q1], InterpolationMode::Linear);

    let val = track.sample(0.5).unwrap();
    let angle = val.angle_between(q0.slerp(q1, 0.5));
    assert!(angle < 0.01, "Quaternion slerp mismatch: angle={angle}");
}

// ============================================================================
// KeyframeTrack: Cubic Spline Interpolation
// ============================================================================

#[test]
fn track_cubic_f32_endpoints() {
    // values = [in_tangent0, value0, out_tangent0, in_tangent1, value1, out_tangent1]
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![0.0_f32, 0.0, 1.0, 1.0, 10.0, 0.0],
        InterpolationMode::CubicSpline,
    );

    let mut cursor = KeyframeCursor::default();
    let v0 = track.sample_with_cursor(0.0, &mut cursor).unwrap();
    assert!(approx(v0, 0.0), "got {v0}");
    let v1 = track.sample_with_cursor(1.0, &mut cursor).unwrap();
    assert!(approx(v1, 10.0), "got {v1}");
}

#[test]
fn track_cubic_zero_tangents_midpoint() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![0.0_f32, 0.0, 0.0, 0.0, 10.0, 0.0],
        InterpolationMode::CubicSpline,
    );

    // Zero tangents give a symmetric ease; the midpoint is exact.
    let val = track.sample(0.5).unwrap();
    assert!(approx(val, 5.0), "got {val}");
}

#[test]
fn morph_weights_interpolate_per_target() {
    let a = MorphWeightData::from_slice(&[0.0, 1.0]);
    let b = MorphWeightData::from_slice(&[1.0, 0.0]);
    let mid = MorphWeightData::interpolate_linear(&a, &b, 0.25);
    assert!(approx(mid.weights[0], 0.25));
    assert!(approx(mid.weights[1], 0.75));
}

// ============================================================================
// KeyframeCursor
// ============================================================================

#[test]
fn cursor_matches_stateless_sampling_after_jumps() {
    let times: Vec<f32> = (0..20).map(|i| i as f32 * 0.1).collect();
    let values: Vec<f32> = (0..20).map(|i| i as f32).collect();
    let track = KeyframeTrack::new(times, values, InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    // Forward, big jump forward, jump back (loop wrap), small step back.
    for t in [0.05, 0.15, 1.55, 0.02, 0.01, 1.9, 1.85] {
        let with_cursor = track.sample_with_cursor(t, &mut cursor).unwrap();
        let stateless = track.sample(t).unwrap();
        assert!(approx(with_cursor, stateless), "t={t}: {with_cursor} vs {stateless}");
    }
}

// ============================================================================
// AnimationClip
// ============================================================================

#[test]
fn clip_duration_is_latest_keyframe() {
    let clip = walk_clip("walk");
    assert!(approx(clip.duration, 2.0));
    assert_eq!(clip.target_node_names(), vec!["Hips", "Spine"]);
}

#[test]
fn clip_without_tracks_has_zero_duration() {
    let clip = AnimationClip::new("empty".into(), Vec::new());
    assert!(approx(clip.duration, 0.0));
}

// ============================================================================
// AnimationAction: Loop Modes
// ============================================================================

fn running_action(loop_mode: LoopMode) -> AnimationAction {
    let mut registry = ClipRegistry::new();
    let id = registry.push(walk_clip("walk"));
    let mut action = AnimationAction::new(id, 2, Vec::new());
    action.loop_mode = loop_mode;
    action.play();
    action
}

#[test]
fn action_loop_wraps() {
    let mut action = running_action(LoopMode::Loop);
    action.update(2.5, 2.0);
    assert!(approx(action.time, 0.5), "got {}", action.time);
}

#[test]
fn action_once_holds_last_pose() {
    let mut action = running_action(LoopMode::Once);
    action.update(3.0, 2.0);
    assert!(approx(action.time, 2.0));
}

#[test]
fn action_ping_pong_reflects() {
    let mut action = running_action(LoopMode::PingPong);
    action.update(2.5, 2.0);
    assert!(approx(action.time, 1.5), "got {}", action.time);
}

#[test]
fn stopped_action_does_not_advance() {
    let mut action = running_action(LoopMode::Loop);
    action.update(0.5, 2.0);
    action.stop();
    assert!(!action.is_running());
    assert!(approx(action.time, 0.0));
    action.update(0.5, 2.0);
    assert!(approx(action.time, 0.0));
}

// ============================================================================
// PlaybackController
// ============================================================================

#[test]
fn focus_then_tick_poses_nodes() {
    let mut asset = character(&["walk"]);
    let id = asset.clips().ids()[0];
    let mut playback = PlaybackController::new();

    assert!(playback.focus(&asset, id));
    playback.tick(0.5, &mut asset);

    let hips = asset.find_node_by_name("Hips").unwrap();
    let spine = asset.find_node_by_name("Spine").unwrap();
    assert!(approx_vec3(asset.node(hips).unwrap().transform.position, Vec3::new(0.0, 2.0, 0.0)));
    let expected = Quat::from_rotation_y(FRAC_PI_2 * 0.25);
    assert!(asset.node(spine).unwrap().transform.rotation.angle_between(expected) < 1e-3);
}

#[test]
fn tick_uses_absolute_clock_time() {
    let mut asset = character(&["walk"]);
    let id = asset.clips().ids()[0];
    let mut playback = PlaybackController::new();
    playback.focus(&asset, id);

    let mut clock = ManualClock::new();
    clock.advance(0.25);
    playback.tick_clock(&clock, &mut asset);
    clock.advance(0.25);
    playback.tick_clock(&clock, &mut asset);
    assert!(approx(clock.elapsed_seconds(), 0.5));

    let hips = asset.find_node_by_name("Hips").unwrap();
    assert!(approx(asset.node(hips).unwrap().transform.position.y, 2.0));
}

#[test]
fn focus_b_then_blur_stops_b_only() {
    let asset = character(&["a", "b"]);
    let (a, b) = (asset.clips().ids()[0], asset.clips().ids()[1]);
    let mut playback = PlaybackController::new();

    playback.focus(&asset, a);
    playback.focus(&asset, b);
    assert_eq!(playback.active(), Some(b));

    assert_eq!(playback.blur(), Some(b));
    assert_eq!(playback.active(), None);
    assert!(!playback.is_playing(b));
    assert!(playback.is_playing(a), "A was never blurred and keeps running");
}

#[test]
fn blur_without_active_clip_is_noop() {
    let mut playback = PlaybackController::new();
    assert_eq!(playback.blur(), None);
}

#[test]
fn focus_unknown_clip_is_rejected() {
    let mut asset = character(&["walk"]);
    let id = asset.clips().ids()[0];
    asset.clips_mut().remove(id);

    let mut playback = PlaybackController::new();
    assert!(!playback.focus(&asset, id));
    assert_eq!(playback.active(), None);
}

#[test]
fn forget_clears_active_clip() {
    let asset = character(&["walk"]);
    let id = asset.clips().ids()[0];
    let mut playback = PlaybackController::new();
    playback.focus(&asset, id);

    playback.forget(id);
    assert_eq!(playback.active(), None);
    assert!(playback.mixer().action(id).is_none());
}

#[test]
fn tracks_for_missing_nodes_are_skipped() {
    let mut asset = character(&[]);
    let clip = AnimationClip::new(
        "ghost".into(),
        vec![Track {
            meta: TrackMeta {
                node_name: "NoSuchBone".into(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, 1.0],
                vec![Vec3::ZERO, Vec3::ONE],
                InterpolationMode::Linear,
            )),
        }],
    );
    let id = asset.clips_mut().push(clip);

    let mut playback = PlaybackController::new();
    assert!(playback.focus(&asset, id));
    assert!(playback.mixer().action(id).unwrap().bindings.is_empty());
    playback.tick(0.5, &mut asset);
}
