//! Shared fixtures: a small skinned character built in code and exported to
//! GLB, so tests run against real loader input without binary files in the
//! repository.

#![allow(dead_code)]

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use clip_studio::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use clip_studio::app::settings::DEFAULT_DISPLAY_SCALE;
use clip_studio::assets::{ExportOptions, ExportSerializer};
use clip_studio::scene::{Mesh, MorphTarget, Node, Primitive, SceneAsset, Skin, Transform};

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Hierarchy:
///
/// ```text
/// Armature
/// └── Hips (0, 1, 0)
///     └── Spine
/// Body (skinned triangle with one morph target)
/// ```
pub const NODE_COUNT: usize = 4;

pub fn character(clip_names: &[&str]) -> SceneAsset {
    let mut asset = SceneAsset::new("character", DEFAULT_DISPLAY_SCALE);

    let armature = asset.add_top_level(Node::new("Armature"));
    let mut hips_transform = Transform::new();
    hips_transform.position = Vec3::new(0.0, 1.0, 0.0);
    let hips = asset.create_node(Node::new("Hips").with_transform(hips_transform));
    asset.attach(hips, armature);
    let spine = asset.create_node(Node::new("Spine"));
    asset.attach(spine, hips);

    let mut primitive = Primitive::new(vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ]);
    primitive.normals = Some(vec![Vec3::Z; 3]);
    primitive.uvs = Some(vec![Vec2::ZERO, Vec2::X, Vec2::Y]);
    primitive.indices = Some(vec![0, 1, 2]);
    primitive.joints = Some(vec![[0, 1, 0, 0]; 3]);
    primitive.weights = Some(vec![Vec4::new(0.5, 0.5, 0.0, 0.0); 3]);
    primitive.morph_targets = vec![MorphTarget {
        positions: vec![Vec3::ZERO, Vec3::ZERO, Vec3::new(0.0, 0.5, 0.0)],
        normals: None,
    }];

    let mesh = asset.meshes.insert(Mesh {
        name: Some("BodyMesh".into()),
        primitives: vec![primitive],
        default_weights: vec![0.0],
    });
    let skin = asset
        .skins
        .insert(Skin::new(vec![hips, spine], vec![Mat4::IDENTITY; 2]));

    let body = asset.add_top_level(Node::new("Body"));
    if let Some(node) = asset.node_mut(body) {
        node.mesh = Some(mesh);
        node.skin = Some(skin);
        node.morph_weights.push(0.0);
    }

    asset.clips_mut().append(clip_names.iter().map(|name| walk_clip(name)));
    asset
}

/// Hips translate from y=1 to y=3 over one second; Spine turns 90° about Y
/// over two seconds. Duration is 2s.
pub fn walk_clip(name: &str) -> AnimationClip {
    AnimationClip::new(
        name.to_string(),
        vec![
            Track {
                meta: TrackMeta {
                    node_name: "Hips".into(),
                    target: TargetPath::Translation,
                },
                data: TrackData::Vector3(KeyframeTrack::new(
                    vec![0.0, 1.0],
                    vec![Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 3.0, 0.0)],
                    InterpolationMode::Linear,
                )),
            },
            Track {
                meta: TrackMeta {
                    node_name: "Spine".into(),
                    target: TargetPath::Rotation,
                },
                data: TrackData::Quaternion(KeyframeTrack::new(
                    vec![0.0, 2.0],
                    vec![Quat::IDENTITY, Quat::from_rotation_y(FRAC_PI_2)],
                    InterpolationMode::Linear,
                )),
            },
        ],
    )
}

pub fn to_glb(asset: &SceneAsset) -> Vec<u8> {
    ExportSerializer::default()
        .export(asset, ExportOptions::binary())
        .expect("fixture export")
        .into_bytes()
}

pub fn to_gltf_json(asset: &SceneAsset) -> String {
    ExportSerializer::default()
        .export(asset, ExportOptions::json())
        .expect("fixture export")
        .as_text()
        .expect("json export is text")
        .to_string()
}

/// GLB of the character carrying the given clips.
pub fn character_glb(clip_names: &[&str]) -> Vec<u8> {
    to_glb(&character(clip_names))
}
