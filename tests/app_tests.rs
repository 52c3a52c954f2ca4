//! Application Controller Tests
//!
//! Tests for:
//! - Asset selection (load, replace, failed load)
//! - Clip file selection (merge, redirect-to-load, partial failure)
//! - Clip ids across asset replacement
//! - Merge tickets against replaced assets
//! - Clip editing interplay with playback
//! - Export requests and the async file boundary

mod common;

use glam::Vec3;

use clip_studio::{
    AppController, ClipSource, EditorSettings, MemoryAssetReader, MergeOutcome, StudioError,
    TransformMode,
};

use common::{NODE_COUNT, approx, approx_vec3, character_glb, walk_clip};

fn clip_names(app: &AppController) -> Vec<String> {
    app.clips().into_iter().map(|c| c.name).collect()
}

fn loaded_app(clips: &[&str]) -> AppController {
    let mut app = AppController::new(EditorSettings::default());
    app.handle_asset_file_selected("character.glb", &character_glb(clips)).unwrap();
    app
}

// ============================================================================
// Asset selection
// ============================================================================

#[test]
fn asset_selection_loads_model() {
    common::init_logging();
    let app = loaded_app(&["idle"]);

    let asset = app.asset().unwrap();
    assert_eq!(asset.name, "character");
    assert_eq!(asset.node_count(), NODE_COUNT);
    assert_eq!(clip_names(&app), vec!["idle"]);
}

#[test]
fn asset_selection_replaces_previous_asset() {
    let mut app = loaded_app(&["idle"]);
    let first = app.asset().unwrap().id();

    let second = app.handle_asset_selected(&character_glb(&["a", "b"])).unwrap();
    assert_ne!(first, second);
    assert_eq!(app.asset().unwrap().id(), second);
    assert_eq!(clip_names(&app), vec!["a", "b"]);
}

#[test]
fn failed_load_keeps_current_asset() {
    let mut app = loaded_app(&["idle"]);
    let id = app.asset().unwrap().id();
    let clip = app.clips()[0].id;
    assert!(app.focus_clip(clip));

    let result = app.handle_asset_selected(b"not a model");
    assert!(matches!(result, Err(StudioError::Decode(_))));
    assert_eq!(app.asset().unwrap().id(), id);
    assert_eq!(app.playback().active(), Some(clip));
}

#[test]
fn new_asset_resets_playback() {
    let mut app = loaded_app(&["idle"]);
    let clip = app.clips()[0].id;
    app.focus_clip(clip);

    app.handle_asset_selected(&character_glb(&["idle"])).unwrap();
    assert_eq!(app.playback().active(), None);
    assert!(app.clips().iter().all(|c| !c.active));
}

// ============================================================================
// Clip merging
// ============================================================================

#[test]
fn merged_clips_are_appended_in_file_order() {
    let mut app = loaded_app(&["original"]);

    let report = app
        .handle_clip_files_selected(vec![
            ClipSource::new("walk.fbx", character_glb(&["mixamo.com"])),
            ClipSource::new("run.fbx", character_glb(&["Take 001"])),
        ])
        .unwrap();

    assert!(report.loaded.is_none());
    assert!(report.failed.is_empty());
    assert_eq!(report.appended.len(), 2);
    assert_eq!(clip_names(&app), vec!["original", "walk", "run"]);
}

#[test]
fn merge_of_multi_clip_file_repeats_base_name() {
    let mut app = loaded_app(&[]);
    app.handle_clip_files_selected(vec![ClipSource::new(
        "dances/salsa.v2.glb",
        character_glb(&["a", "b"]),
    )])
    .unwrap();
    assert_eq!(clip_names(&app), vec!["salsa", "salsa"]);
}

#[test]
fn merge_without_asset_loads_first_file() {
    let mut app = AppController::new(EditorSettings::default());

    let report = app
        .handle_clip_files_selected(vec![
            ClipSource::new("hero.glb", character_glb(&["idle"])),
            ClipSource::new("walk.glb", character_glb(&["x"])),
        ])
        .unwrap();

    assert!(report.loaded.is_some());
    assert_eq!(app.asset().unwrap().name, "hero");
    // The first file keeps its own clip names.
    assert_eq!(clip_names(&app), vec!["idle", "walk"]);
}

#[test]
fn merge_without_asset_skips_undecodable_first_file() {
    let mut app = AppController::new(EditorSettings::default());

    let report = app
        .handle_clip_files_selected(vec![
            ClipSource::new("broken.glb", b"garbage".to_vec()),
            ClipSource::new("hero.glb", character_glb(&["idle"])),
            ClipSource::new("walk.glb", character_glb(&["x"])),
        ])
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "broken.glb");
    assert!(matches!(report.failed[0].1, StudioError::Decode(_)));
    assert_eq!(report.loaded, Some(app.asset().unwrap().id()));
    assert_eq!(app.asset().unwrap().name, "hero");
    assert_eq!(clip_names(&app), vec!["idle", "walk"]);
}

#[test]
fn merge_without_asset_and_only_broken_files_loads_nothing() {
    let mut app = AppController::new(EditorSettings::default());

    let report = app
        .handle_clip_files_selected(vec![
            ClipSource::new("a.glb", b"garbage".to_vec()),
            ClipSource::new("b.glb", Vec::new()),
        ])
        .unwrap();

    assert!(report.loaded.is_none());
    assert_eq!(report.failed.len(), 2);
    assert!(app.asset().is_none());
}

#[test]
fn merge_with_no_files_and_no_asset_is_noop() {
    let mut app = AppController::new(EditorSettings::default());
    let report = app.handle_clip_files_selected(Vec::new()).unwrap();
    assert!(report.loaded.is_none());
    assert!(app.asset().is_none());
}

#[test]
fn failed_merge_file_is_reported_and_skipped() {
    let mut app = loaded_app(&["original"]);

    let report = app
        .handle_clip_files_selected(vec![
            ClipSource::new("broken.glb", b"garbage".to_vec()),
            ClipSource::new("run.glb", character_glb(&["r"])),
        ])
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "broken.glb");
    assert!(matches!(report.failed[0].1, StudioError::Decode(_)));
    assert_eq!(clip_names(&app), vec!["original", "run"]);
}

#[test]
fn stale_merge_ticket_is_discarded() {
    let mut app = loaded_app(&["original"]);
    let ticket = app.begin_clip_merge().unwrap();

    app.handle_asset_selected(&character_glb(&["fresh"])).unwrap();
    let outcome = app.complete_clip_merge(ticket, vec![walk_clip("late")]);

    assert_eq!(outcome, MergeOutcome::Discarded);
    assert_eq!(clip_names(&app), vec!["fresh"]);
}

#[test]
fn live_merge_ticket_is_applied() {
    let mut app = loaded_app(&[]);
    let ticket = app.begin_clip_merge().unwrap();
    assert_eq!(ticket.asset(), app.asset().unwrap().id());

    let MergeOutcome::Applied(ids) = app.complete_clip_merge(ticket, vec![walk_clip("w")]) else {
        panic!("merge should apply");
    };
    assert_eq!(ids.len(), 1);
    assert_eq!(app.clips()[0].id, ids[0]);
}

#[test]
fn begin_merge_without_asset_is_none() {
    let app = AppController::new(EditorSettings::default());
    assert!(app.begin_clip_merge().is_none());
}

// ============================================================================
// Clip editing & playback
// ============================================================================

#[test]
fn rename_and_remove_by_id() {
    let mut app = loaded_app(&["a", "b", "c"]);
    let ids: Vec<_> = app.clips().iter().map(|c| c.id).collect();

    assert!(app.rename_clip(ids[0], ""));
    assert!(app.remove_clip(ids[1]));
    assert_eq!(clip_names(&app), vec!["", "c"]);

    // Stale ids are no-ops.
    assert!(!app.rename_clip(ids[1], "ghost"));
    assert!(!app.remove_clip(ids[1]));
    assert!(!app.focus_clip(ids[1]));
}

#[test]
fn clip_ids_of_replaced_asset_are_stale() {
    let mut app = AppController::new(EditorSettings::default());
    app.handle_asset_file_selected("a.glb", &character_glb(&["old_idle"])).unwrap();
    let stale = app.clips()[0].id;

    app.handle_asset_file_selected("b.glb", &character_glb(&["new_run"])).unwrap();
    let fresh = app.clips()[0].id;
    assert_ne!(stale, fresh);

    assert!(!app.rename_clip(stale, "hijacked"));
    assert!(!app.remove_clip(stale));
    assert!(!app.focus_clip(stale));
    assert_eq!(clip_names(&app), vec!["new_run"]);
}

#[test]
fn removing_active_clip_stops_playback() {
    let mut app = loaded_app(&["a", "b"]);
    let a = app.clips()[0].id;

    assert!(app.focus_clip(a));
    assert!(app.clips()[0].active);

    assert!(app.remove_clip(a));
    assert_eq!(app.playback().active(), None);
    assert_eq!(app.blur_clip(), None);
    app.tick(1.0);
}

#[test]
fn tick_poses_focused_clip() {
    let mut app = loaded_app(&["walk"]);
    let walk = app.clips()[0].id;
    app.focus_clip(walk);
    app.tick(0.5);

    let asset = app.asset().unwrap();
    let hips = asset.find_node_by_name("Hips").unwrap();
    assert!(approx(asset.node(hips).unwrap().transform.position.y, 2.0));

    assert_eq!(app.blur_clip(), Some(walk));
    assert!(!app.playback().is_playing(walk));
}

// ============================================================================
// Transform gizmo
// ============================================================================

#[test]
fn gizmo_delta_follows_mode() {
    let mut app = loaded_app(&[]);
    assert_eq!(app.transform_mode(), TransformMode::Translate);

    assert!(app.apply_gizmo_delta(Vec3::new(1.0, 0.0, 0.0)));
    assert!(approx_vec3(
        app.asset().unwrap().root_transform().position,
        Vec3::new(1.0, 0.0, 0.0)
    ));

    app.handle_transform_mode_advance();
    app.handle_transform_mode_advance();
    assert_eq!(app.transform_mode(), TransformMode::Scale);
    app.apply_gizmo_delta(Vec3::splat(1.0));
    assert!(approx_vec3(app.asset().unwrap().root_transform().scale, Vec3::splat(0.02)));
}

#[test]
fn gizmo_without_asset_is_noop() {
    let mut app = AppController::new(EditorSettings::default());
    assert!(!app.apply_gizmo_delta(Vec3::ONE));
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn export_without_asset_fails() {
    let app = AppController::new(EditorSettings::default());
    assert!(matches!(
        app.handle_export_requested(true),
        Err(StudioError::NoAssetLoaded)
    ));
}

#[test]
fn export_uses_settings_file_names() {
    let settings = EditorSettings {
        binary_file_name: "out.glb".into(),
        ..EditorSettings::default()
    };
    let mut app = AppController::new(settings);
    app.handle_asset_selected(&character_glb(&["idle"])).unwrap();

    let artifact = app.handle_export_requested(true).unwrap();
    assert_eq!(artifact.file_name, "out.glb");

    let json = app.handle_export_requested(false).unwrap();
    assert_eq!(json.file_name, "scene.gltf");
}

#[test]
fn edited_clip_list_survives_export_and_reload() {
    let mut app = loaded_app(&["idle"]);
    app.handle_clip_files_selected(vec![ClipSource::new("walk.glb", character_glb(&["w"]))])
        .unwrap();
    let idle = app.clips()[0].id;
    app.rename_clip(idle, "rest");

    let artifact = app.handle_export_requested(true).unwrap();
    let mut reloaded = AppController::new(EditorSettings::default());
    reloaded.handle_asset_selected(artifact.as_bytes()).unwrap();

    assert_eq!(clip_names(&reloaded), vec!["rest", "walk"]);
    assert_eq!(reloaded.asset().unwrap().node_count(), NODE_COUNT);
}

// ============================================================================
// Async file boundary
// ============================================================================

#[tokio::test]
async fn open_asset_and_clip_files_through_reader() {
    let reader = MemoryAssetReader::new()
        .with_file("models/hero.glb", character_glb(&["idle"]))
        .with_file("clips/jump.glb", character_glb(&["j"]));
    let mut app = AppController::new(EditorSettings::default());

    app.open_asset(&reader, "models/hero.glb").await.unwrap();
    assert_eq!(app.asset().unwrap().name, "hero");

    let report = app
        .open_clip_files(&reader, &["missing.glb", "clips/jump.glb"])
        .await
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].1, StudioError::Io(_)));
    assert_eq!(clip_names(&app), vec!["idle", "jump"]);
}

#[tokio::test]
async fn open_missing_asset_is_io_error() {
    let reader = MemoryAssetReader::new();
    let mut app = AppController::new(EditorSettings::default());

    let result = app.open_asset(&reader, "nope.glb").await;
    assert!(matches!(result, Err(StudioError::Io(_))));
    assert!(app.asset().is_none());
}

#[tokio::test]
async fn save_export_writes_default_file_name() {
    let app = loaded_app(&["idle"]);
    let dir = std::env::temp_dir().join(format!("clip_studio_export_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let path = app.save_export(false, &dir).await.unwrap();
    assert_eq!(path.file_name().unwrap(), "scene.gltf");

    let text = std::fs::read_to_string(&path).unwrap();
    let reloaded = clip_studio::AssetLoader::default().load(text.as_bytes()).unwrap();
    assert_eq!(reloaded.clips().names(), vec!["idle"]);

    std::fs::remove_dir_all(&dir).unwrap();
}
