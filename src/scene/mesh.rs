use glam::{Vec2, Vec3, Vec4};
use gltf::mesh::Mode;

/// Axis-aligned bounds of a vertex set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Per-target vertex displacements.
#[derive(Debug, Clone, Default)]
pub struct MorphTarget {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
}

/// One draw call worth of geometry.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub mode: Mode,
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub uvs: Option<Vec<Vec2>>,
    pub joints: Option<Vec<[u16; 4]>>,
    pub weights: Option<Vec<Vec4>>,
    pub indices: Option<Vec<u32>>,
    pub morph_targets: Vec<MorphTarget>,
}

impl Primitive {
    #[must_use]
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self {
            mode: Mode::Triangles,
            positions,
            normals: None,
            uvs: None,
            joints: None,
            weights: None,
            indices: None,
            morph_targets: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.positions)
    }

    #[inline]
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.joints.is_some() && self.weights.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
    /// Rest morph weights, one per morph target.
    pub default_weights: Vec<f32>,
}

impl Mesh {
    /// Number of morph targets; the maximum across primitives.
    #[must_use]
    pub fn morph_target_count(&self) -> usize {
        self.primitives
            .iter()
            .map(|p| p.morph_targets.len())
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.primitives
            .iter()
            .filter_map(Primitive::bounds)
            .reduce(|a, b| a.union(&b))
    }
}
