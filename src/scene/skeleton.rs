use glam::Mat4;

use crate::scene::NodeHandle;

/// Skin binding a skinned mesh to its joint nodes.
///
/// `joints[i]` corresponds to joint index `i` in the vertex `JOINTS_0` data.
#[derive(Debug, Clone)]
pub struct Skin {
    pub name: Option<String>,
    pub joints: Vec<NodeHandle>,
    /// One matrix per joint; empty means identity for every joint.
    pub inverse_bind_matrices: Vec<Mat4>,
    pub skeleton: Option<NodeHandle>,
}

impl Skin {
    #[must_use]
    pub fn new(joints: Vec<NodeHandle>, inverse_bind_matrices: Vec<Mat4>) -> Self {
        Self {
            name: None,
            joints,
            inverse_bind_matrices,
            skeleton: None,
        }
    }
}
