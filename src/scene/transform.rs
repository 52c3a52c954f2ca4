use glam::{Affine3A, Quat, Vec3};

/// Transform component
///
/// Local position, rotation and scale (TRS) of a node relative to its parent.
/// The gizmo writes into it directly and the animation mixer overwrites the
/// animated channels every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new() -> Self {
        Self::IDENTITY
    }

    #[must_use]
    pub fn from_scale(scale: f32) -> Self {
        Self {
            scale: Vec3::splat(scale),
            ..Self::IDENTITY
        }
    }

    /// Local matrix (Affine3A) built from the TRS components.
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Sets the TRS components from a matrix.
    ///
    /// Shear cannot be represented and is lost in the decomposition.
    pub fn apply_local_matrix(&mut self, mat: Affine3A) {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = rotation.normalize();
        self.position = translation;
    }

    /// True when the transform is the identity within `epsilon`.
    #[must_use]
    pub fn is_identity(&self, epsilon: f32) -> bool {
        self.position.abs_diff_eq(Vec3::ZERO, epsilon)
            && self.scale.abs_diff_eq(Vec3::ONE, epsilon)
            && (self.rotation.abs_diff_eq(Quat::IDENTITY, epsilon)
                || self.rotation.abs_diff_eq(-Quat::IDENTITY, epsilon))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
