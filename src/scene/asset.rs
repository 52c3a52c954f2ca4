use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Affine3A, Vec3};
use slotmap::SlotMap;

use crate::animation::ClipRegistry;
use crate::scene::mesh::{BoundingBox, Mesh};
use crate::scene::node::Node;
use crate::scene::skeleton::Skin;
use crate::scene::transform::Transform;
use crate::scene::{MeshKey, NodeHandle, SkinKey};

static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one successful load. A fresh id is minted per load, so two
/// loads of the same file never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(u64);

impl AssetId {
    fn next() -> Self {
        Self(NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

/// A loaded model: node hierarchy, geometry and its clip list.
///
/// Every asset has a synthetic root node carrying the display scale. The
/// decoded scene's top-level nodes are children of that root. The root is
/// what the transform gizmo manipulates and is not part of the exported
/// hierarchy.
#[derive(Debug)]
pub struct SceneAsset {
    id: AssetId,
    pub name: String,

    root: NodeHandle,
    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    pub meshes: SlotMap<MeshKey, Mesh>,
    pub skins: SlotMap<SkinKey, Skin>,

    pub(crate) clips: ClipRegistry,

    display_scale: f32,
}

impl SceneAsset {
    #[must_use]
    pub fn new(name: impl Into<String>, display_scale: f32) -> Self {
        let name = name.into();
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(
            Node::new(name.clone()).with_transform(Transform::from_scale(display_scale)),
        );

        Self {
            id: AssetId::next(),
            name,
            root,
            nodes,
            meshes: SlotMap::with_key(),
            skins: SlotMap::with_key(),
            clips: ClipRegistry::new(),
            display_scale,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> AssetId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn display_scale(&self) -> f32 {
        self.display_scale
    }

    #[inline]
    #[must_use]
    pub fn clips(&self) -> &ClipRegistry {
        &self.clips
    }

    /// Direct clip editing for an asset that is not under an
    /// [`AppController`](crate::app::AppController). The controller edits
    /// clips itself so playback state follows removals.
    #[inline]
    pub fn clips_mut(&mut self) -> &mut ClipRegistry {
        &mut self.clips
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Inserts a detached node. Use [`Self::attach`] to place it.
    pub fn create_node(&mut self, node: Node) -> NodeHandle {
        self.nodes.insert(node)
    }

    /// Inserts a node directly under the asset root.
    pub fn add_top_level(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.attach(handle, self.root);
        handle
    }

    /// Makes `child` the last child of `parent`, detaching it from its
    /// previous parent.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself");
            return;
        }
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            return;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Refusing to attach node under its own descendant");
            return;
        }

        if let Some(old_parent) = self.nodes[child].parent
            && let Some(p) = self.nodes.get_mut(old_parent)
        {
            p.children.retain(|&c| c != child);
        }

        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
    }

    fn is_ancestor(&self, ancestor: NodeHandle, handle: NodeHandle) -> bool {
        let mut current = self.nodes.get(handle).and_then(|n| n.parent);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    #[inline]
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Direct children of the synthetic root, in file order.
    #[must_use]
    pub fn top_level_nodes(&self) -> &[NodeHandle] {
        &self.nodes[self.root].children
    }

    /// Pre-order traversal of the subtree below `start`, `start` excluded.
    #[must_use]
    pub fn descendants(&self, start: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let Some(node) = self.nodes.get(start) else {
            return out;
        };
        let mut stack: Vec<NodeHandle> = node.children.iter().rev().copied().collect();
        while let Some(handle) = stack.pop() {
            out.push(handle);
            if let Some(n) = self.nodes.get(handle) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    /// Number of nodes in the decoded hierarchy (the synthetic root excluded).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// First node named `name` in pre-order below the root.
    #[must_use]
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.descendants(self.root)
            .into_iter()
            .find(|&h| self.nodes[h].name == name)
    }

    /// Sets `frustum_culled` on the root and every descendant.
    pub fn set_frustum_culled_recursive(&mut self, culled: bool) {
        let mut handles = self.descendants(self.root);
        handles.push(self.root);
        for handle in handles {
            if let Some(node) = self.nodes.get_mut(handle) {
                node.frustum_culled = culled;
            }
        }
    }

    // ========================================================================
    // Root transform
    // ========================================================================

    #[must_use]
    pub fn root_transform(&self) -> &Transform {
        &self.nodes[self.root].transform
    }

    /// Mutable access for the transform gizmo.
    pub fn root_transform_mut(&mut self) -> &mut Transform {
        &mut self.nodes[self.root].transform
    }

    /// The user's edit of the root transform with the display scale divided
    /// out. Identity for a freshly loaded asset.
    #[must_use]
    pub fn root_edit_matrix(&self) -> Affine3A {
        let scale = if self.display_scale.abs() > f32::EPSILON {
            self.display_scale
        } else {
            1.0
        };
        self.root_transform().local_matrix() * Affine3A::from_scale(Vec3::splat(1.0 / scale))
    }

    /// Whether the user has moved, rotated or scaled the root.
    #[must_use]
    pub fn has_root_edit(&self) -> bool {
        let mut edit = Transform::new();
        edit.apply_local_matrix(self.root_edit_matrix());
        !edit.is_identity(1e-5)
    }

    /// Model-space bounds over every mesh, ignoring node transforms.
    #[must_use]
    pub fn mesh_bounds(&self) -> Option<BoundingBox> {
        self.meshes
            .values()
            .filter_map(Mesh::bounds)
            .reduce(|a, b| a.union(&b))
    }

    // ========================================================================
    // Split borrows
    // ========================================================================

    /// Borrows the node storage mutably alongside the clip registry and the
    /// meshes, for the animation mixer.
    pub(crate) fn split_for_animation(
        &mut self,
    ) -> (&mut SlotMap<NodeHandle, Node>, &ClipRegistry, &SlotMap<MeshKey, Mesh>) {
        (&mut self.nodes, &self.clips, &self.meshes)
    }
}
