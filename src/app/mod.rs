//! Application controller.
//!
//! [`AppController`] owns the single live [`SceneAsset`] and routes the UI
//! events (file selected, clip edited, export requested, gizmo mode
//! toggled) to the loader, the clip registry, playback and the exporter.
//!
//! Every operation that can fail is all-or-nothing: a failed load, merge or
//! export leaves the live asset and its clips exactly as they were.

pub mod settings;
pub mod transform_mode;

pub use settings::EditorSettings;
pub use transform_mode::{TransformMode, TransformModeController};

use std::path::{Path, PathBuf};

use glam::{EulerRot, Quat, Vec3};

use crate::animation::{AnimationClip, ClipId, PlaybackController};
use crate::assets::{
    AssetLoader, AssetReader, ClipSource, ExportArtifact, ExportOptions, ExportSerializer,
    file_base_name, write_artifact,
};
use crate::errors::{Result, StudioError};
use crate::scene::{AssetId, SceneAsset};

/// Proof that a merge was started against a particular asset.
///
/// A merge completed with a ticket for an asset that has since been
/// replaced is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeTicket {
    asset: AssetId,
}

impl MergeTicket {
    #[must_use]
    pub fn asset(&self) -> AssetId {
        self.asset
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Clips were appended; ids in append order.
    Applied(Vec<ClipId>),
    /// The target asset is no longer live; nothing changed.
    Discarded,
}

/// Result of one clip-file selection.
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Set when no asset was live and the first file was loaded instead.
    pub loaded: Option<AssetId>,
    /// Appended clips in order.
    pub appended: Vec<ClipId>,
    /// Files that could not be read or decoded.
    pub failed: Vec<(String, StudioError)>,
}

/// One row of the clip list.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipEntry {
    pub id: ClipId,
    pub name: String,
    pub duration: f32,
    pub active: bool,
}

#[derive(Debug, Default)]
pub struct AppController {
    settings: EditorSettings,
    loader: AssetLoader,
    exporter: ExportSerializer,

    asset: Option<SceneAsset>,
    playback: PlaybackController,
    transform_mode: TransformModeController,
}

impl AppController {
    #[must_use]
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            loader: AssetLoader::from_settings(&settings),
            exporter: ExportSerializer::from_settings(&settings),
            playback: PlaybackController::with_loop_mode(settings.default_loop_mode),
            transform_mode: TransformModeController::new(),
            asset: None,
            settings,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    #[must_use]
    pub fn asset(&self) -> Option<&SceneAsset> {
        self.asset.as_ref()
    }

    #[must_use]
    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    #[must_use]
    pub fn transform_mode(&self) -> TransformMode {
        self.transform_mode.mode()
    }

    // ========================================================================
    // Asset loading
    // ========================================================================

    /// Loads `bytes` as the new live asset, replacing the previous one and
    /// all of its playback state.
    pub fn handle_asset_selected(&mut self, bytes: &[u8]) -> Result<AssetId> {
        self.load_asset(bytes, crate::assets::loaders::DEFAULT_ASSET_NAME)
    }

    /// Like [`Self::handle_asset_selected`], naming the asset after the file.
    pub fn handle_asset_file_selected(
        &mut self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<AssetId> {
        self.load_asset(bytes, file_base_name(file_name))
    }

    fn load_asset(&mut self, bytes: &[u8], name: &str) -> Result<AssetId> {
        let asset = self.loader.load_named(bytes, name).inspect_err(|e| {
            log::error!("Failed to load '{name}': {e}");
        })?;

        let id = asset.id();
        if let Some(previous) = self.asset.replace(asset) {
            log::debug!("Replaced {} with {id}", previous.id());
        }
        self.playback.reset();
        Ok(id)
    }

    // ========================================================================
    // Clip merging
    // ========================================================================

    /// Merges the clips of every file into the live asset, in the given
    /// order.
    ///
    /// With no asset loaded the first file is loaded as the asset instead
    /// and the remaining files are merged into it. A file that fails to
    /// decode is reported in [`MergeReport::failed`] and skipped; when that
    /// file was the load candidate, the next file takes its place.
    pub fn handle_clip_files_selected(&mut self, files: Vec<ClipSource>) -> Result<MergeReport> {
        self.merge_sources(
            files
                .into_iter()
                .map(|source| (source.file_name, Ok(source.bytes)))
                .collect(),
        )
    }

    fn merge_sources(&mut self, sources: Vec<(String, Result<Vec<u8>>)>) -> Result<MergeReport> {
        let mut report = MergeReport::default();
        let mut sources = sources.into_iter();

        // Without a live asset, the first file that loads becomes the asset.
        while self.asset.is_none() {
            let Some((file_name, bytes)) = sources.next() else {
                return Ok(report);
            };
            log::info!("No asset loaded, loading '{file_name}' instead of merging");
            match bytes.and_then(|bytes| self.handle_asset_file_selected(&file_name, &bytes)) {
                Ok(id) => report.loaded = Some(id),
                Err(e) => report.failed.push((file_name, e)),
            }
        }

        for (file_name, bytes) in sources {
            let bytes = match bytes {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::error!("Failed to read clip file '{file_name}': {e}");
                    report.failed.push((file_name, e));
                    continue;
                }
            };

            let ticket = self.begin_clip_merge().ok_or(StudioError::NoAssetLoaded)?;
            match self.loader.merge_clips_from(&bytes, file_base_name(&file_name)) {
                Ok(clips) => {
                    if let MergeOutcome::Applied(ids) = self.complete_clip_merge(ticket, clips) {
                        report.appended.extend(ids);
                    }
                }
                Err(e) => {
                    log::error!("Failed to merge clips from '{file_name}': {e}");
                    report.failed.push((file_name, e));
                }
            }
        }

        Ok(report)
    }

    /// Starts a merge against the live asset. `None` when no asset is live.
    #[must_use]
    pub fn begin_clip_merge(&self) -> Option<MergeTicket> {
        self.asset.as_ref().map(|asset| MergeTicket { asset: asset.id() })
    }

    /// Appends decoded clips if the ticket's asset is still the live one.
    pub fn complete_clip_merge(
        &mut self,
        ticket: MergeTicket,
        clips: Vec<AnimationClip>,
    ) -> MergeOutcome {
        match self.asset.as_mut() {
            Some(asset) if asset.id() == ticket.asset => {
                let ids = asset.clips.append(clips);
                log::info!("Merged {} clip(s) into {}", ids.len(), ticket.asset);
                MergeOutcome::Applied(ids)
            }
            _ => {
                log::warn!("Discarding merge for {}, asset is no longer loaded", ticket.asset);
                MergeOutcome::Discarded
            }
        }
    }

    // ========================================================================
    // Clip editing
    // ========================================================================

    /// Clip list in display order. Empty without an asset.
    #[must_use]
    pub fn clips(&self) -> Vec<ClipEntry> {
        let Some(asset) = &self.asset else {
            return Vec::new();
        };
        let active = self.playback.active();
        asset
            .clips
            .iter()
            .map(|(id, clip)| ClipEntry {
                id,
                name: clip.name.clone(),
                duration: clip.duration,
                active: active == Some(id),
            })
            .collect()
    }

    /// Renames a clip. A stale id is a no-op returning `false`.
    pub fn rename_clip(&mut self, id: ClipId, name: &str) -> bool {
        self.asset
            .as_mut()
            .is_some_and(|asset| asset.clips.rename(id, name))
    }

    /// Removes a clip and, in the same step, drops its playback state.
    pub fn remove_clip(&mut self, id: ClipId) -> bool {
        let Some(asset) = self.asset.as_mut() else {
            return false;
        };
        if asset.clips.remove(id).is_none() {
            return false;
        }
        self.playback.forget(id);
        true
    }

    // ========================================================================
    // Playback
    // ========================================================================

    pub fn focus_clip(&mut self, id: ClipId) -> bool {
        match &self.asset {
            Some(asset) => self.playback.focus(asset, id),
            None => false,
        }
    }

    pub fn blur_clip(&mut self) -> Option<ClipId> {
        self.playback.blur()
    }

    /// Poses the live asset at `elapsed` seconds of the render clock.
    pub fn tick(&mut self, elapsed: f32) {
        if let Some(asset) = self.asset.as_mut() {
            self.playback.tick(elapsed, asset);
        }
    }

    // ========================================================================
    // Transform gizmo
    // ========================================================================

    pub fn handle_transform_mode_advance(&mut self) -> TransformMode {
        self.transform_mode.advance()
    }

    /// Applies a gizmo drag to the asset root according to the current mode.
    ///
    /// `delta` is a translation offset, Euler angles in radians, or a
    /// relative scale change (`0.1` grows by 10%).
    pub fn apply_gizmo_delta(&mut self, delta: Vec3) -> bool {
        let mode = self.transform_mode.mode();
        let Some(asset) = self.asset.as_mut() else {
            return false;
        };
        let transform = asset.root_transform_mut();
        match mode {
            TransformMode::Translate => transform.position += delta,
            TransformMode::Rotate => {
                let rotation = Quat::from_euler(EulerRot::XYZ, delta.x, delta.y, delta.z);
                transform.rotation = (rotation * transform.rotation).normalize();
            }
            TransformMode::Scale => transform.scale *= Vec3::ONE + delta,
        }
        true
    }

    // ========================================================================
    // Export
    // ========================================================================

    pub fn handle_export_requested(&self, binary: bool) -> Result<ExportArtifact> {
        let asset = self.asset.as_ref().ok_or(StudioError::NoAssetLoaded)?;
        self.exporter
            .export(asset, ExportOptions { binary })
            .inspect_err(|e| log::error!("Export failed: {e}"))
    }

    /// Exports and writes the artifact into `dir` under its default file name.
    pub async fn save_export(&self, binary: bool, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let artifact = self.handle_export_requested(binary)?;
        write_artifact(&artifact, dir).await
    }

    // ========================================================================
    // Async file boundary
    // ========================================================================

    pub async fn open_asset<R: AssetReader>(&mut self, reader: &R, uri: &str) -> Result<AssetId> {
        let bytes = reader.read_bytes(uri).await?;
        self.handle_asset_file_selected(uri, &bytes)
    }

    /// Reads every file, then merges them in the order given.
    pub async fn open_clip_files<R: AssetReader>(
        &mut self,
        reader: &R,
        uris: &[&str],
    ) -> Result<MergeReport> {
        let mut sources = Vec::with_capacity(uris.len());
        for &uri in uris {
            sources.push((uri.to_string(), reader.read_bytes(uri).await));
        }
        self.merge_sources(sources)
    }
}
