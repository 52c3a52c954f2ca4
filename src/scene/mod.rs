//! Scene graph of a loaded asset.
//!
//! - [`SceneAsset`]: the live model (node hierarchy, meshes, skins, clips)
//! - [`Node`]: a named node with a [`Transform`]
//! - [`Mesh`] / [`Skin`]: geometry and skinning data carried through to export

pub mod asset;
pub mod mesh;
pub mod node;
pub mod skeleton;
pub mod transform;

pub use asset::{AssetId, SceneAsset};
pub use mesh::{BoundingBox, Mesh, MorphTarget, Primitive};
pub use node::Node;
pub use skeleton::Skin;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct SkinKey;
}
