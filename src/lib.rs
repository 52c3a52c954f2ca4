#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Clip Studio
//!
//! Loads a glTF model, lets the user edit its list of animation clips
//! (merge clips from other files, rename, remove), previews a clip on the
//! model, and exports the result as GLB or glTF JSON.
//!
//! ```rust,ignore
//! use clip_studio::{AppController, ClipSource, EditorSettings};
//!
//! let mut app = AppController::new(EditorSettings::default());
//! app.handle_asset_file_selected("character.glb", &model_bytes)?;
//! app.handle_clip_files_selected(vec![ClipSource::new("walk.glb", walk_bytes)])?;
//! let artifact = app.handle_export_requested(true)?;
//! ```

pub mod animation;
pub mod app;
pub mod assets;
pub mod errors;
pub mod scene;
pub mod utils;

pub use animation::{
    AnimationAction, AnimationClip, AnimationMixer, Binder, ClipId, ClipRegistry, LoopMode,
    PlaybackController,
};
pub use app::{
    AppController, ClipEntry, EditorSettings, MergeOutcome, MergeReport, MergeTicket,
    TransformMode, TransformModeController,
};
pub use assets::{
    AssetLoader, AssetReader, ClipSource, ExportArtifact, ExportFormat, ExportOptions,
    ExportPayload, ExportSerializer, FileAssetReader, MemoryAssetReader,
};
pub use errors::{Result, StudioError};
pub use scene::{AssetId, Node, SceneAsset, Transform};
