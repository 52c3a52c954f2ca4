use smallvec::SmallVec;

use crate::animation::MorphWeightData;
use crate::scene::transform::Transform;
use crate::scene::{MeshKey, NodeHandle, SkinKey};

/// A node of the asset hierarchy.
///
/// # Hierarchy
///
/// Nodes form a tree through parent-child relationships:
/// - `parent`: handle to the parent node (`None` only for the asset root)
/// - `children`: child handles in file order
///
/// Animation tracks address nodes by `name`, so names are kept exactly as
/// decoded. They are not required to be unique.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    // === Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,

    // === Components ===
    pub mesh: Option<MeshKey>,
    pub skin: Option<SkinKey>,
    /// Current morph target weights, driven by `weights` tracks.
    pub morph_weights: SmallVec<[f32; 8]>,

    // === State ===
    /// When `false` the node is drawn even if its rest bounds leave the view
    /// frustum. Skinned and animated meshes move outside their rest bounds.
    pub frustum_culled: bool,
    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            mesh: None,
            skin: None,
            morph_weights: SmallVec::new(),
            frustum_culled: true,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Copies sampled weights into the node, truncated or zero-padded to
    /// `target_count`.
    pub fn set_morph_weights(&mut self, data: &MorphWeightData, target_count: usize) {
        self.morph_weights.clear();
        self.morph_weights
            .extend((0..target_count).map(|i| data.weights.get(i).copied().unwrap_or(0.0)));
    }
}
