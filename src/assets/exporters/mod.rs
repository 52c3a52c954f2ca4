//! Export of the live asset to GLB or glTF JSON.

mod gltf;

use crate::animation::AnimationClip;
use crate::app::settings::EditorSettings;
use crate::errors::Result;
use crate::scene::SceneAsset;

use self::gltf::ExportContext;

pub const MIME_BINARY: &str = "application/octet-stream";
pub const MIME_JSON: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Single self-contained GLB blob.
    Binary,
    /// Pretty-printed glTF JSON with embedded buffers.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportOptions {
    pub binary: bool,
}

impl ExportOptions {
    #[must_use]
    pub fn binary() -> Self {
        Self { binary: true }
    }

    #[must_use]
    pub fn json() -> Self {
        Self { binary: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportPayload {
    Bytes(Vec<u8>),
    Text(String),
}

/// The output of an export, ready to be written or downloaded.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub payload: ExportPayload,
    pub file_name: String,
}

impl ExportArtifact {
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self.format {
            ExportFormat::Binary => MIME_BINARY,
            ExportFormat::Json => MIME_JSON,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.payload {
            ExportPayload::Bytes(bytes) => bytes,
            ExportPayload::Text(text) => text.as_bytes(),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            ExportPayload::Text(text) => Some(text),
            ExportPayload::Bytes(_) => None,
        }
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self.payload {
            ExportPayload::Bytes(bytes) => bytes,
            ExportPayload::Text(text) => text.into_bytes(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Converts a [`SceneAsset`] and a clip list into an [`ExportArtifact`].
///
/// Export only reads the asset; a failure leaves it untouched.
#[derive(Debug, Clone)]
pub struct ExportSerializer {
    pub generator: String,
    pub binary_file_name: String,
    pub json_file_name: String,
}

impl Default for ExportSerializer {
    fn default() -> Self {
        Self::from_settings(&EditorSettings::default())
    }
}

impl ExportSerializer {
    #[must_use]
    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self {
            generator: settings.generator.clone(),
            binary_file_name: settings.binary_file_name.clone(),
            json_file_name: settings.json_file_name.clone(),
        }
    }

    /// Exports the asset with the clips currently in its registry.
    pub fn export(&self, asset: &SceneAsset, options: ExportOptions) -> Result<ExportArtifact> {
        self.export_clips(asset, asset.clips.iter().map(|(_, clip)| clip), options)
    }

    /// Exports the hierarchy below the asset root together with `clips`.
    pub fn export_clips<'c>(
        &self,
        asset: &SceneAsset,
        clips: impl IntoIterator<Item = &'c AnimationClip>,
        options: ExportOptions,
    ) -> Result<ExportArtifact> {
        let mut ctx = ExportContext::new(&self.generator);
        ctx.build_meshes(asset);
        let top_level = ctx.build_nodes(asset);
        ctx.build_skins(asset);
        ctx.build_animations(asset, clips);
        ctx.build_scene(&asset.name, top_level);

        let artifact = if options.binary {
            ExportArtifact {
                format: ExportFormat::Binary,
                payload: ExportPayload::Bytes(ctx.to_glb()?),
                file_name: self.binary_file_name.clone(),
            }
        } else {
            ExportArtifact {
                format: ExportFormat::Json,
                payload: ExportPayload::Text(ctx.to_gltf_json()?),
                file_name: self.json_file_name.clone(),
            }
        };

        log::info!(
            "Exported '{}' as {} ({} bytes)",
            asset.name,
            artifact.file_name,
            artifact.len()
        );
        Ok(artifact)
    }
}
