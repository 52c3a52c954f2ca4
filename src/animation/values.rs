use glam::{Quat, Vec3, Vec4};
use smallvec::SmallVec;

/// Values that a [`KeyframeTrack`](crate::animation::KeyframeTrack) can blend between.
pub trait Interpolatable: Clone {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self;

    /// Hermite interpolation with glTF cubic-spline tangents, scaled by the
    /// keyframe interval `dt`.
    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self;
}

/// Hermite basis weights `(s0, s1, s2, s3)` for position/tangent blending.
#[inline]
fn hermite_basis(t: f32) -> (f32, f32, f32, f32) {
    let t2 = t * t;
    let t3 = t2 * t;
    let s2 = -2.0 * t3 + 3.0 * t2;
    let s3 = t3 - t2;
    let s0 = 1.0 - s2;
    let s1 = s3 - t2 + t;
    (s0, s1, s2, s3)
}

/// Per-keyframe morph target weights.
///
/// The number of weights equals the morph target count of the animated mesh;
/// most meshes have only a handful, so they stay inline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MorphWeightData {
    pub weights: SmallVec<[f32; 8]>,
}

impl MorphWeightData {
    /// Creates zeroed weights for `count` morph targets.
    #[must_use]
    pub fn allocate(count: usize) -> Self {
        Self {
            weights: SmallVec::from_elem(0.0, count),
        }
    }

    #[must_use]
    pub fn from_slice(weights: &[f32]) -> Self {
        Self {
            weights: SmallVec::from_slice(weights),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl Interpolatable for MorphWeightData {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        let weights = start
            .weights
            .iter()
            .zip(&end.weights)
            .map(|(a, b)| a + (b - a) * t)
            .collect();
        Self { weights }
    }

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        let weights = (0..v0.len().min(v1.len()))
            .map(|i| {
                let m0 = out_tangent0.weights.get(i).copied().unwrap_or(0.0) * dt;
                let m1 = in_tangent1.weights.get(i).copied().unwrap_or(0.0) * dt;
                s0 * v0.weights[i] + s1 * m0 + s2 * v1.weights[i] + s3 * m1
            })
            .collect();
        Self { weights }
    }
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start + (end - start) * t
    }

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        s0 * v0 + s1 * out_tangent0 * dt + s2 * v1 + s3 * in_tangent1 * dt
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start.lerp(*end, t)
    }

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        *v0 * s0 + *out_tangent0 * (dt * s1) + *v1 * s2 + *in_tangent1 * (dt * s3)
    }
}

impl Interpolatable for Quat {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start.slerp(*end, t)
    }

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        let blended = Vec4::from(*v0) * s0
            + Vec4::from(*out_tangent0) * (dt * s1)
            + Vec4::from(*v1) * s2
            + Vec4::from(*in_tangent1) * (dt * s3);
        // Hermite output is not unit length.
        Quat::from_vec4(blended).normalize()
    }
}
