//! Asset decoding.
//!
//! [`AssetLoader`] turns the bytes of a selected file into a live
//! [`SceneAsset`], or into a list of clips to merge into one.

mod gltf;

use crate::animation::AnimationClip;
use crate::app::settings::EditorSettings;
use crate::errors::Result;
use crate::scene::SceneAsset;

use self::gltf::{DecodedGltf, GltfLoader, load_animations};

/// Name given to an asset loaded without a file name.
pub const DEFAULT_ASSET_NAME: &str = "Scene";

/// Decodes binary glTF (GLB) and self-contained `.gltf` files.
///
/// Loading never touches any existing asset: it either returns a complete
/// new [`SceneAsset`] or an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetLoader {
    pub display_scale: f32,
    pub disable_frustum_culling: bool,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::from_settings(&EditorSettings::default())
    }
}

impl AssetLoader {
    #[must_use]
    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self {
            display_scale: settings.display_scale,
            disable_frustum_culling: settings.disable_frustum_culling,
        }
    }

    /// Decodes `bytes` into a new asset carrying every clip of the file.
    pub fn load(&self, bytes: &[u8]) -> Result<SceneAsset> {
        self.load_named(bytes, DEFAULT_ASSET_NAME)
    }

    pub fn load_named(&self, bytes: &[u8], name: &str) -> Result<SceneAsset> {
        let decoded = DecodedGltf::parse(bytes)?;
        let mut asset = GltfLoader::load(&decoded, name, self.display_scale)?;

        if self.disable_frustum_culling {
            asset.set_frustum_culled_recursive(false);
        }

        Ok(asset)
    }

    /// Decodes `bytes` as an independent asset and returns all of its clips,
    /// each renamed to `base_name`.
    ///
    /// Several clips from one file all end up with the same name.
    pub fn merge_clips_from(&self, bytes: &[u8], base_name: &str) -> Result<Vec<AnimationClip>> {
        let decoded = DecodedGltf::parse(bytes)?;
        let mut clips = load_animations(&decoded);

        for clip in &mut clips {
            clip.name = base_name.to_string();
        }

        log::info!("Decoded {} clip(s) from '{base_name}'", clips.len());
        Ok(clips)
    }
}
