//! Editor Settings
//!
//! Tunables shared by the loader, the exporter and playback.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use clip_studio::app::EditorSettings;
//!
//! // Defaults: 0.01 display scale, no frustum culling, scene.glb / scene.gltf
//! let settings = EditorSettings::default();
//!
//! // From a JSON file; missing keys fall back to the defaults
//! let settings = EditorSettings::load("studio.json").await?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::LoopMode;
use crate::errors::{Result, StudioError};

/// Scale applied to loaded models. Source assets authored in centimeters
/// display at a sensible size in a meter-based viewport.
pub const DEFAULT_DISPLAY_SCALE: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Uniform scale of the asset root after loading.
    pub display_scale: f32,
    /// Mark every loaded node as not frustum-culled.
    pub disable_frustum_culling: bool,
    /// Default file name of binary exports.
    pub binary_file_name: String,
    /// Default file name of JSON exports.
    pub json_file_name: String,
    /// `asset.generator` written into exported documents.
    pub generator: String,
    /// Loop mode of newly focused clips.
    pub default_loop_mode: LoopMode,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            display_scale: DEFAULT_DISPLAY_SCALE,
            disable_frustum_culling: true,
            binary_file_name: "scene.glb".to_string(),
            json_file_name: "scene.gltf".to_string(),
            generator: format!("clip-studio {}", env!("CARGO_PKG_VERSION")),
            default_loop_mode: LoopMode::Loop,
        }
    }
}

impl EditorSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads and validates a JSON settings file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        let settings = Self::from_json(&text)?;
        log::debug!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.display_scale.is_finite() || self.display_scale <= 0.0 {
            return Err(StudioError::Settings(format!(
                "display_scale must be a positive number, got {}",
                self.display_scale
            )));
        }
        if self.binary_file_name.is_empty() || self.json_file_name.is_empty() {
            return Err(StudioError::Settings("export file names must not be empty".into()));
        }
        Ok(())
    }
}
